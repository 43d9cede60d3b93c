//! 命中排序

use crate::types::Hit;

/// 按 `Hit::sort_key` 稳定排序
pub fn sort_hits_stable(hits: &mut [Hit]) {
    hits.sort_by_key(Hit::sort_key);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HitKind;

    fn hit(kind: HitKind, offset: u64, text: &[u8]) -> Hit {
        Hit { kind, offset, text: text.to_vec() }
    }

    #[test]
    fn orders_by_offset_then_kind_and_keeps_ties_stable() {
        let mut hits = vec![
            hit(HitKind::Utf16Le, 4, b"wide"),
            hit(HitKind::Ascii, 9, b"second"),
            hit(HitKind::Ascii, 4, b"narrow"),
            hit(HitKind::Ascii, 9, b"first?"),
        ];
        sort_hits_stable(&mut hits);
        let got: Vec<_> = hits.iter().map(|h| (h.offset, h.kind, h.text.clone())).collect();
        assert_eq!(
            got,
            vec![
                (4, HitKind::Ascii, b"narrow".to_vec()),
                (4, HitKind::Utf16Le, b"wide".to_vec()),
                (9, HitKind::Ascii, b"second".to_vec()),
                (9, HitKind::Ascii, b"first?".to_vec()),
            ]
        );
    }
}
