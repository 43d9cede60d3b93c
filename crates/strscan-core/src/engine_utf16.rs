//! UTF-16LE 可打印段检测器（仅 Latin 子集：高字节为 0）
//!
//! 以 (lo, hi) 两字节为一个码元顺序消费字节流，偏移每次前进 2。
//! 块尾若剩下一个未配对字节，保存在 `carry` 中，与下一块的首字节配对后
//! 再从下一块第 2 个字节继续批量配对；流结束时未配对的 carry 直接丢弃。
use std::ops::ControlFlow;

use crate::charset::is_printable;
use crate::detectors::Detector;
use crate::run::{DetectParams, RunState};
use crate::sink::{HitBudget, HitSink};
use crate::types::HitKind;

pub(crate) struct Utf16LeDetector {
    params: DetectParams,
    run: RunState,
    /// 跨块遗留的低字节及其绝对偏移
    carry: Option<(u8, u64)>,
}

impl Utf16LeDetector {
    pub(crate) fn new(params: DetectParams) -> Self {
        Self { params, run: RunState::new(HitKind::Utf16Le), carry: None }
    }

    fn unit(&mut self, offset: u64, lo: u8, hi: u8, sink: &mut dyn HitSink, budget: &mut HitBudget) -> ControlFlow<()> {
        if hi == 0x00 && is_printable(lo, self.params.charset) {
            self.run.push(offset, lo, &self.params, sink, budget)
        } else {
            self.run.close(&self.params, sink, budget)
        }
    }
}

impl Detector for Utf16LeDetector {
    fn feed(&mut self, base: u64, block: &[u8], sink: &mut dyn HitSink, budget: &mut HitBudget) -> ControlFlow<()> {
        if block.is_empty() {
            return ControlFlow::Continue(());
        }
        let mut i = 0usize;
        if let Some((lo, off)) = self.carry.take() {
            self.unit(off, lo, block[0], sink, budget)?;
            i = 1;
        }
        while i + 1 < block.len() {
            self.unit(base + i as u64, block[i], block[i + 1], sink, budget)?;
            i += 2;
        }
        if i < block.len() {
            self.carry = Some((block[i], base + i as u64));
        }
        ControlFlow::Continue(())
    }

    fn finish(&mut self, sink: &mut dyn HitSink, budget: &mut HitBudget) -> ControlFlow<()> {
        // 不完整码元不参与判定
        self.carry = None;
        self.run.close(&self.params, sink, budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::AsciiCharset;
    use crate::sink::CaptureSink;
    use crate::types::Hit;

    fn params(min_len: usize, max_len: usize) -> DetectParams {
        DetectParams { min_len, max_len, charset: AsciiCharset::BinText, repeat_run_limit: 8 }
    }

    fn utf16(s: &str) -> Vec<u8> {
        s.bytes().flat_map(|b| [b, 0]).collect()
    }

    fn run_chunked(data: &[u8], p: DetectParams, chunk: usize) -> Vec<Hit> {
        let mut det = Utf16LeDetector::new(p);
        let mut sink = CaptureSink::default();
        let mut budget = HitBudget::unbounded();
        let mut base = 0u64;
        for block in data.chunks(chunk.max(1)) {
            let _ = det.feed(base, block, &mut sink, &mut budget);
            base += block.len() as u64;
        }
        let _ = det.finish(&mut sink, &mut budget);
        sink.hits
    }

    #[test]
    fn finds_embedded_wide_string() {
        let mut data = vec![0xFFu8; 10];
        data.extend_from_slice(&[0x48, 0x00, 0x69, 0x00]);
        let hits = run_chunked(&data, params(2, 4096), 4096);
        assert_eq!(hits, vec![Hit { kind: HitKind::Utf16Le, offset: 10, text: b"Hi".to_vec() }]);
    }

    #[test]
    fn nonzero_high_byte_breaks_run() {
        let mut data = utf16("abcd");
        data.extend_from_slice(&[b'e', 0x01]);
        data.extend_from_slice(&utf16("fghij"));
        let hits = run_chunked(&data, params(4, 4096), 4096);
        assert_eq!(hits.len(), 2);
        assert_eq!((hits[0].offset, hits[0].text.as_slice()), (0, &b"abcd"[..]));
        assert_eq!((hits[1].offset, hits[1].text.as_slice()), (10, &b"fghij"[..]));
    }

    #[test]
    fn odd_blocks_carry_one_byte_across_boundary() {
        let mut data = vec![0x00u8];
        data.extend_from_slice(&utf16("carry over"));
        // 奇数起点：配对从偏移 0 开始，字符串从偏移 1 开始，不应被识别
        let hits_whole = run_chunked(&data, params(4, 4096), data.len());
        for chunk in [1, 3, 5, 7] {
            assert_eq!(run_chunked(&data, params(4, 4096), chunk), hits_whole, "chunk={chunk}");
        }
    }

    #[test]
    fn chunk_size_does_not_change_result() {
        let mut data = Vec::new();
        for i in 0..500u32 {
            data.extend_from_slice(&utf16(&format!("wide{i}")));
            data.extend_from_slice(&[0x00, 0x00]);
            if i % 5 == 0 {
                data.push(0x41);
            }
        }
        let p = params(4, 7);
        let whole = run_chunked(&data, p, data.len());
        assert!(!whole.is_empty());
        for chunk in [1, 2, 3, 5, 17, 256] {
            assert_eq!(run_chunked(&data, p, chunk), whole, "chunk={chunk}");
        }
    }

    #[test]
    fn dangling_byte_at_eof_is_dropped_but_run_flushed() {
        let mut data = utf16("tail");
        data.push(b'x');
        let hits = run_chunked(&data, params(4, 4096), 3);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, b"tail".to_vec());
    }

    #[test]
    fn long_wide_run_is_chopped() {
        let data = utf16(&"ab".repeat(6));
        let hits = run_chunked(&data, params(2, 5), 4);
        let lens: Vec<_> = hits.iter().map(|h| (h.offset, h.len())).collect();
        assert_eq!(lens, vec![(0, 5), (10, 5), (20, 2)]);
    }
}
