//! 命中过滤（类型/最短长度/关键字或正则/去重）
//!
//! - 普通模式：查询按空白切分为多个关键字，全部出现（忽略 ASCII 大小写）才算命中，
//!   使用 Aho-Corasick 一次扫描完成多关键字匹配。
//! - 正则模式：忽略大小写的字节正则；空查询匹配全部。
use std::collections::HashSet;
use std::str::FromStr;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder};
use regex::bytes::{Regex, RegexBuilder};

use crate::error::{Result, ScanError};
use crate::types::{Hit, HitKind};

/// 按类型过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindFilter {
    #[default]
    All,
    Ascii,
    Utf16Le,
}

impl KindFilter {
    fn admits(&self, kind: HitKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Ascii => kind == HitKind::Ascii,
            KindFilter::Utf16Le => kind == HitKind::Utf16Le,
        }
    }
}

impl FromStr for KindFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(KindFilter::All),
            "ascii" => Ok(KindFilter::Ascii),
            "utf16le" => Ok(KindFilter::Utf16Le),
            other => Err(format!("unknown type filter: {other}")),
        }
    }
}

/// 查询方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    #[default]
    Plain,
    Regex,
}

enum Matcher {
    Any,
    Tokens { ac: AhoCorasick, count: usize },
    Regex(Regex),
}

/// 过滤器
pub struct HitFilter {
    kind: KindFilter,
    min_len: usize,
    unique: bool,
    matcher: Matcher,
}

impl HitFilter {
    /// 构建过滤器；正则非法时返回 `ScanError::InvalidPattern`
    pub fn new(query: &str, mode: SearchMode, kind: KindFilter, min_len: usize, unique: bool) -> Result<Self> {
        let matcher = match mode {
            SearchMode::Regex if query.is_empty() => Matcher::Any,
            SearchMode::Regex => Matcher::Regex(RegexBuilder::new(query).case_insensitive(true).unicode(false).build()?),
            SearchMode::Plain => {
                let mut tokens: Vec<String> = query.split_whitespace().map(|t| t.to_ascii_lowercase()).collect();
                tokens.sort();
                tokens.dedup();
                if tokens.is_empty() {
                    Matcher::Any
                } else {
                    let ac = AhoCorasickBuilder::new()
                        .ascii_case_insensitive(true)
                        .build(&tokens)
                        .map_err(|e| ScanError::InvalidConfig(e.to_string()))?;
                    Matcher::Tokens { ac, count: tokens.len() }
                }
            }
        };
        Ok(Self { kind, min_len, unique, matcher })
    }

    fn matches_text(&self, text: &[u8]) -> bool {
        match &self.matcher {
            Matcher::Any => true,
            Matcher::Regex(re) => re.is_match(text),
            Matcher::Tokens { ac, count } => {
                let mut found = vec![false; *count];
                let mut remaining = *count;
                for m in ac.find_overlapping_iter(text) {
                    let id = m.pattern().as_usize();
                    if !found[id] {
                        found[id] = true;
                        remaining -= 1;
                        if remaining == 0 {
                            return true;
                        }
                    }
                }
                false
            }
        }
    }

    /// 按原顺序返回通过过滤的命中；去重时保留每个文本的第一次出现
    pub fn apply<'a>(&self, hits: &'a [Hit]) -> Vec<&'a Hit> {
        let mut seen: HashSet<&'a [u8]> = HashSet::new();
        let mut out = Vec::new();
        for h in hits {
            if h.text.len() < self.min_len || !self.kind.admits(h.kind) || !self.matches_text(&h.text) {
                continue;
            }
            if self.unique && !seen.insert(h.text.as_slice()) {
                continue;
            }
            out.push(h);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(kind: HitKind, offset: u64, text: &str) -> Hit {
        Hit { kind, offset, text: text.as_bytes().to_vec() }
    }

    fn sample() -> Vec<Hit> {
        vec![
            hit(HitKind::Ascii, 0, "KERNEL32.dll"),
            hit(HitKind::Utf16Le, 20, "Software\\Microsoft\\Windows"),
            hit(HitKind::Ascii, 90, "GetProcAddress"),
            hit(HitKind::Ascii, 120, "kernel32.dll"),
            hit(HitKind::Utf16Le, 200, "KERNEL32.dll"),
        ]
    }

    fn offsets(v: &[&Hit]) -> Vec<u64> {
        v.iter().map(|h| h.offset).collect()
    }

    #[test]
    fn plain_tokens_all_required_case_insensitive() {
        let hits = sample();
        let f = HitFilter::new("kernel32 DLL", SearchMode::Plain, KindFilter::All, 0, false).unwrap();
        assert_eq!(offsets(&f.apply(&hits)), vec![0, 120, 200]);
        let f = HitFilter::new("microsoft windows", SearchMode::Plain, KindFilter::All, 0, false).unwrap();
        assert_eq!(offsets(&f.apply(&hits)), vec![20]);
        let f = HitFilter::new("kernel32 windows", SearchMode::Plain, KindFilter::All, 0, false).unwrap();
        assert!(f.apply(&hits).is_empty());
    }

    #[test]
    fn regex_mode_is_case_insensitive() {
        let hits = sample();
        let f = HitFilter::new(r"^get\w+$", SearchMode::Regex, KindFilter::All, 0, false).unwrap();
        assert_eq!(offsets(&f.apply(&hits)), vec![90]);
    }

    #[test]
    fn invalid_regex_is_reported() {
        let err = HitFilter::new("(unclosed", SearchMode::Regex, KindFilter::All, 0, false).err().unwrap();
        assert!(matches!(err, ScanError::InvalidPattern(_)));
    }

    #[test]
    fn kind_min_len_and_unique() {
        let hits = sample();
        let f = HitFilter::new("", SearchMode::Plain, KindFilter::Utf16Le, 0, false).unwrap();
        assert_eq!(offsets(&f.apply(&hits)), vec![20, 200]);
        let f = HitFilter::new("", SearchMode::Regex, KindFilter::All, 13, false).unwrap();
        assert_eq!(offsets(&f.apply(&hits)), vec![20, 90]);
        let f = HitFilter::new("", SearchMode::Plain, KindFilter::All, 0, true).unwrap();
        // 去重区分大小写：KERNEL32.dll 只保留第一次
        assert_eq!(offsets(&f.apply(&hits)), vec![0, 20, 90, 120]);
    }
}
