//! 结果输出：样例行、计数摘要、参数头、JSON
use std::io::{self, Write};

use strscan_core::{CountResult, Hit, Preset, ScanConfig};

/// 预览最多显示的字符数
pub const PREVIEW_MAX_CHARS: usize = 120;

/// 转义 CR/LF/TAB，超过 120 个字符截断并追加 "..."
pub fn format_preview(text: &[u8]) -> String {
    let mut preview = String::with_capacity(text.len().min(PREVIEW_MAX_CHARS + 8));
    for &b in text {
        match b {
            b'\r' => preview.push_str("\\r"),
            b'\n' => preview.push_str("\\n"),
            b'\t' => preview.push_str("\\t"),
            _ => preview.push(b as char),
        }
    }
    if preview.chars().count() > PREVIEW_MAX_CHARS {
        let mut cut: String = preview.chars().take(PREVIEW_MAX_CHARS).collect();
        cut.push_str("...");
        return cut;
    }
    preview
}

/// 单条样例行：`0x0000ABCD<TAB>ascii<TAB>len=N<TAB>preview`
pub fn format_hit_line(hit: &Hit) -> String {
    format!("0x{:08X}\t{}\tlen={}\t{}", hit.offset, hit.kind, hit.len(), format_preview(&hit.text))
}

/// 按 (offset, kind) 排序后逐行输出
pub fn print_samples(out: &mut dyn Write, hits: &[&Hit]) -> io::Result<()> {
    let mut sorted: Vec<&Hit> = hits.to_vec();
    sorted.sort_by_key(|h| h.sort_key());
    for h in sorted {
        writeln!(out, "{}", format_hit_line(h))?;
    }
    Ok(())
}

/// 计数摘要：`total=N, ascii=A, utf16le=U, maxHits=M, truncated=yes|no`
pub fn summarize_counts(counts: &CountResult, max_hits: u32) -> String {
    let mut parts = vec![format!("total={}", counts.total())];
    if counts.ascii_count > 0 {
        parts.push(format!("ascii={}", counts.ascii_count));
    }
    if counts.utf16le_count > 0 {
        parts.push(format!("utf16le={}", counts.utf16le_count));
    }
    if max_hits > 0 {
        parts.push(format!("maxHits={max_hits}"));
    }
    parts.push(format!("truncated={}", if counts.truncated { "yes" } else { "no" }));
    parts.join(", ")
}

/// 普通模式的参数头
pub fn describe_config(cfg: &ScanConfig) -> String {
    format!(
        "minLen={}, maxLen={}, maxHits={}, asciiCharset={}, repeatRun={}, mode={}",
        cfg.min_len,
        cfg.max_len,
        cfg.max_hits,
        cfg.ascii_charset,
        cfg.repeat_run_limit,
        cfg.mode_name()
    )
}

/// 预置模式的参数头
pub fn describe_preset(preset: Preset, cfg: &ScanConfig) -> String {
    format!(
        "[{}] minLen={}, asciiCharset={}, repeatRun={}, maxLen={}, maxHits={}",
        preset, cfg.min_len, cfg.ascii_charset, cfg.repeat_run_limit, cfg.max_len, cfg.max_hits
    )
}

/// old 与 aligned 的总数对比
pub fn describe_diff(old_total: u64, aligned_total: u64) -> String {
    let delta = aligned_total as i128 - old_total as i128;
    format!("[diff] old-total={old_total}, aligned-total={aligned_total}, delta={delta}")
}

/// 以 JSON 数组流式写出命中
pub fn write_hits_json(out: &mut dyn Write, hits: &[&Hit]) -> anyhow::Result<()> {
    write!(out, "[")?;
    for (i, h) in hits.iter().enumerate() {
        if i > 0 {
            write!(out, ",")?;
        }
        serde_json::to_writer(&mut *out, h)?;
    }
    writeln!(out, "]")?;
    Ok(())
}
