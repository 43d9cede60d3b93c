//! ASCII 可打印段检测器（逐字节）
use std::ops::ControlFlow;

use crate::charset::is_printable;
use crate::detectors::Detector;
use crate::run::{DetectParams, RunState};
use crate::sink::{HitBudget, HitSink};
use crate::types::HitKind;

pub(crate) struct AsciiDetector {
    params: DetectParams,
    run: RunState,
}

impl AsciiDetector {
    pub(crate) fn new(params: DetectParams) -> Self {
        Self { params, run: RunState::new(HitKind::Ascii) }
    }
}

impl Detector for AsciiDetector {
    fn feed(&mut self, base: u64, block: &[u8], sink: &mut dyn HitSink, budget: &mut HitBudget) -> ControlFlow<()> {
        for (i, &b) in block.iter().enumerate() {
            if is_printable(b, self.params.charset) {
                self.run.push(base + i as u64, b, &self.params, sink, budget)?;
            } else {
                self.run.close(&self.params, sink, budget)?;
            }
        }
        ControlFlow::Continue(())
    }

    fn finish(&mut self, sink: &mut dyn HitSink, budget: &mut HitBudget) -> ControlFlow<()> {
        self.run.close(&self.params, sink, budget)
    }
}
