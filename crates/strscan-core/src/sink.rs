//! 命中去向与命中预算
//!
//! 完整捕获与仅计数是同一状态机的两种投影：检测器只负责判定“哪一段被接受”，
//! 接受后的动作交给 `HitSink`；跨阶段共享的命中计数由 `HitBudget` 显式承载。
use crate::types::{CountResult, Hit, HitKind};

/// 被接受的串的去向
pub trait HitSink {
    /// `text` 已经过长度与重复判定，且长度不超过 max_len
    fn accept(&mut self, kind: HitKind, offset: u64, text: &[u8]);
}

/// 命中预算：ASCII 与 UTF-16LE 两个阶段共用同一个计数器
#[derive(Debug, Clone, Copy, Default)]
pub struct HitBudget {
    /// 0 表示不限
    limit: u64,
    used: u64,
}

impl HitBudget {
    pub fn new(max_hits: u32) -> Self {
        Self { limit: u64::from(max_hits), used: 0 }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    /// 剩余可用命中数；不限时为 None
    pub fn remaining(&self) -> Option<u64> {
        (self.limit > 0).then(|| self.limit.saturating_sub(self.used))
    }

    pub fn exhausted(&self) -> bool {
        self.limit > 0 && self.used >= self.limit
    }

    pub(crate) fn record(&mut self) {
        self.used += 1;
    }
}

/// 完整捕获：保存全部命中
#[derive(Debug, Default)]
pub struct CaptureSink {
    pub hits: Vec<Hit>,
}

impl HitSink for CaptureSink {
    fn accept(&mut self, kind: HitKind, offset: u64, text: &[u8]) {
        self.hits.push(Hit { kind, offset, text: text.to_vec() });
    }
}

/// 仅计数：分类型计数，并保留前 `sample_limit` 条作为样例
#[derive(Debug, Default)]
pub struct CountSink {
    pub counts: CountResult,
    pub samples: Vec<Hit>,
    sample_limit: usize,
}

impl CountSink {
    pub fn new(sample_limit: usize) -> Self {
        Self { counts: CountResult::default(), samples: Vec::new(), sample_limit }
    }
}

impl HitSink for CountSink {
    fn accept(&mut self, kind: HitKind, offset: u64, text: &[u8]) {
        match kind {
            HitKind::Ascii => self.counts.ascii_count += 1,
            HitKind::Utf16Le => self.counts.utf16le_count += 1,
        }
        if self.samples.len() < self.sample_limit {
            self.samples.push(Hit { kind, offset, text: text.to_vec() });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_zero_is_unbounded() {
        let mut b = HitBudget::new(0);
        for _ in 0..1000 {
            b.record();
        }
        assert!(!b.exhausted());
        assert_eq!(b.remaining(), None);
    }

    #[test]
    fn budget_exhausts_at_limit() {
        let mut b = HitBudget::new(2);
        b.record();
        assert!(!b.exhausted());
        assert_eq!(b.remaining(), Some(1));
        b.record();
        assert!(b.exhausted());
        assert_eq!(b.remaining(), Some(0));
    }

    #[test]
    fn count_sink_caps_samples_but_not_counts() {
        let mut s = CountSink::new(1);
        s.accept(HitKind::Ascii, 0, b"abcd");
        s.accept(HitKind::Utf16Le, 10, b"efgh");
        assert_eq!(s.counts.ascii_count, 1);
        assert_eq!(s.counts.utf16le_count, 1);
        assert_eq!(s.samples.len(), 1);
        assert_eq!(s.samples[0].offset, 0);
    }
}
