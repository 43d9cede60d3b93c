//! 检测器接口（ASCII/UTF-16LE）
use std::ops::ControlFlow;

use crate::sink::{HitBudget, HitSink};

/// 流式检测器：按顺序接收任意大小的字节块，结果与分块方式无关
pub(crate) trait Detector {
    /// 喂入从绝对偏移 `base` 开始的一块字节。
    /// 返回 Break 表示预算已耗尽，调用方应立即停止（不再 finish）。
    fn feed(&mut self, base: u64, block: &[u8], sink: &mut dyn HitSink, budget: &mut HitBudget) -> ControlFlow<()>;

    /// 流结束：冲刷仍未结束的段
    fn finish(&mut self, sink: &mut dyn HitSink, budget: &mut HitBudget) -> ControlFlow<()>;
}
