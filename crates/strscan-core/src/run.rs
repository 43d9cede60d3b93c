//! 可打印段累积器（ASCII/UTF-16LE 检测器共用）
use std::ops::ControlFlow;

use crate::charset::AsciiCharset;
use crate::options::ScanConfig;
use crate::repeat::has_degenerate_repeat;
use crate::sink::{HitBudget, HitSink};
use crate::types::HitKind;

/// 检测器使用的参数（由 ScanConfig 派生）
#[derive(Debug, Clone, Copy)]
pub(crate) struct DetectParams {
    pub(crate) min_len: usize,
    pub(crate) max_len: usize,
    pub(crate) charset: AsciiCharset,
    pub(crate) repeat_run_limit: i32,
}

impl From<&ScanConfig> for DetectParams {
    fn from(cfg: &ScanConfig) -> Self {
        Self {
            min_len: cfg.min_len as usize,
            max_len: cfg.max_len as usize,
            charset: cfg.ascii_charset,
            repeat_run_limit: cfg.repeat_run_limit,
        }
    }
}

/// 当前段的状态：是否在段内、段起点、已累积的单元字节
#[derive(Debug)]
pub(crate) struct RunState {
    kind: HitKind,
    in_run: bool,
    start: u64,
    buf: Vec<u8>,
}

impl RunState {
    pub(crate) fn new(kind: HitKind) -> Self {
        Self { kind, in_run: false, start: 0, buf: Vec::with_capacity(256) }
    }

    /// 追加一个可打印单元；长度到达 max_len 时立即判定并复位。
    /// 返回 Break 表示本次接受使预算耗尽，调用方必须停止。
    pub(crate) fn push(
        &mut self,
        offset: u64,
        unit: u8,
        p: &DetectParams,
        sink: &mut dyn HitSink,
        budget: &mut HitBudget,
    ) -> ControlFlow<()> {
        if !self.in_run {
            self.in_run = true;
            self.start = offset;
            self.buf.clear();
        }
        self.buf.push(unit);
        if self.buf.len() >= p.max_len {
            return self.emit(p, sink, budget);
        }
        ControlFlow::Continue(())
    }

    /// 遇到不可打印单元（或流结束）：若在段内则判定并复位
    pub(crate) fn close(&mut self, p: &DetectParams, sink: &mut dyn HitSink, budget: &mut HitBudget) -> ControlFlow<()> {
        if !self.in_run {
            return ControlFlow::Continue(());
        }
        self.emit(p, sink, budget)
    }

    fn emit(&mut self, p: &DetectParams, sink: &mut dyn HitSink, budget: &mut HitBudget) -> ControlFlow<()> {
        let accepted = self.buf.len() >= p.min_len && !has_degenerate_repeat(&self.buf, p.repeat_run_limit);
        if accepted {
            let end = self.buf.len().min(p.max_len);
            sink.accept(self.kind, self.start, &self.buf[..end]);
            budget.record();
        }
        // 无论接受与否，缓冲都丢弃
        self.in_run = false;
        self.buf.clear();
        if accepted && budget.exhausted() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}
