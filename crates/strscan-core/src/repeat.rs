//! 重复字节抑制：过滤 "AAAAAAAA" / 填充字节之类的退化串

/// 判定缓冲区内是否存在长度 ≥ `limit` 的同值连续字节
/// - `limit <= 0` 或缓冲区为空：恒为 false（关闭）
/// - `limit == 1`：恒为 true（任何单字节都构成长度 1 的连续段）
pub fn has_degenerate_repeat(buf: &[u8], limit: i32) -> bool {
    if limit <= 0 || buf.is_empty() {
        return false;
    }
    if limit == 1 {
        return true;
    }
    let limit = limit as usize;
    let mut run = 1usize;
    let mut prev = buf[0];
    for &cur in &buf[1..] {
        if cur == prev {
            run += 1;
            if run >= limit {
                return true;
            }
        } else {
            prev = cur;
            run = 1;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::has_degenerate_repeat;

    #[test]
    fn disabled_when_limit_not_positive() {
        assert!(!has_degenerate_repeat(b"AAAAAAAAAAAA", 0));
        assert!(!has_degenerate_repeat(b"AAAAAAAAAAAA", -3));
    }

    #[test]
    fn empty_buffer_never_degenerate() {
        assert!(!has_degenerate_repeat(b"", 1));
        assert!(!has_degenerate_repeat(b"", 8));
    }

    #[test]
    fn limit_one_rejects_everything() {
        assert!(has_degenerate_repeat(b"a", 1));
        assert!(has_degenerate_repeat(b"abcdef", 1));
    }

    #[test]
    fn detects_run_reaching_limit() {
        assert!(has_degenerate_repeat(b"xxAAAAAAAAyy", 8));
        assert!(!has_degenerate_repeat(b"xxAAAAAAAyy", 8));
        // 中断后重新计数
        assert!(!has_degenerate_repeat(b"AAAABAAAA", 5));
        assert!(has_degenerate_repeat(b"AAAABAAAAA", 5));
    }

    #[test]
    fn run_at_buffer_start_counts() {
        assert!(has_degenerate_repeat(b"zz", 2));
        assert!(!has_degenerate_repeat(b"zy", 2));
    }
}
