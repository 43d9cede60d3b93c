//! 公共类型（对外暴露）
use serde::{Serialize, Serializer};
use std::fmt;

/// 命中类型；派生的 Ord 即报告排序时的次级键（Ascii 在前）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum HitKind {
    #[serde(rename = "ascii")]
    Ascii,
    #[serde(rename = "utf16le")]
    Utf16Le,
}

impl HitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HitKind::Ascii => "ascii",
            HitKind::Utf16Le => "utf16le",
        }
    }
}

impl fmt::Display for HitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单条命中
/// - `offset`：串起始的绝对文件偏移（UTF-16LE 为首个码元低字节的位置）
/// - `text`：每个单元一个字节的原始值（UTF-16LE 已去掉高位 0）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hit {
    pub kind: HitKind,
    pub offset: u64,
    #[serde(serialize_with = "serialize_latin1")]
    pub text: Vec<u8>,
}

impl Hit {
    /// 按“一字节一字符”映射为字符串，不会失败
    pub fn text_latin1(&self) -> String {
        latin1(&self.text)
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// 报告顺序的排序键：起始偏移升序，同偏移时 ASCII 在前
    pub fn sort_key(&self) -> (u64, HitKind) {
        (self.offset, self.kind)
    }
}

pub(crate) fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

#[allow(clippy::ptr_arg)]
fn serialize_latin1<S: Serializer>(bytes: &Vec<u8>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&latin1(bytes))
}

/// 计数模式的结果
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountResult {
    pub ascii_count: u64,
    pub utf16le_count: u64,
    /// 命中预算耗尽；此时所有计数均为下界
    pub truncated: bool,
}

impl CountResult {
    pub fn total(&self) -> u64 {
        self.ascii_count + self.utf16le_count
    }

    /// 由完整命中列表统计出计数（供报告复用同一摘要格式）
    pub fn from_hits(hits: &[Hit], truncated: bool) -> Self {
        let ascii_count = hits.iter().filter(|h| h.kind == HitKind::Ascii).count() as u64;
        Self {
            ascii_count,
            utf16le_count: hits.len() as u64 - ascii_count,
            truncated,
        }
    }
}

/// 完整捕获模式的结果（已按 (offset, kind) 稳定排序）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FullScan {
    pub hits: Vec<Hit>,
    pub truncated: bool,
}

/// 计数模式的结果：计数 + 有界样例（按产出顺序）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CountScan {
    pub counts: CountResult,
    pub samples: Vec<Hit>,
}

/// 两种入口的统一视图
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Full(FullScan),
    Counts(CountScan),
}

impl ScanOutcome {
    pub fn counts(&self) -> CountResult {
        match self {
            ScanOutcome::Full(f) => CountResult::from_hits(&f.hits, f.truncated),
            ScanOutcome::Counts(c) => c.counts,
        }
    }

    pub fn total(&self) -> u64 {
        self.counts().total()
    }

    pub fn truncated(&self) -> bool {
        match self {
            ScanOutcome::Full(f) => f.truncated,
            ScanOutcome::Counts(c) => c.counts.truncated,
        }
    }

    /// 完整模式返回全部命中，计数模式返回样例
    pub fn hits(&self) -> &[Hit] {
        match self {
            ScanOutcome::Full(f) => &f.hits,
            ScanOutcome::Counts(c) => &c.samples,
        }
    }
}
