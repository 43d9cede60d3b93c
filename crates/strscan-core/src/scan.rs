//! 扫描主流程：分块顺序读取 + 字节预算 + 命中预算 + ASCII→UTF-16LE 两阶段
//!
//! 阶段顺序是契约：ASCII 先完成（或截断），UTF-16LE 再对同一字节区间扫描并使用剩余预算；
//! 若 ASCII 已截断，UTF-16LE 整体跳过。
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::detectors::Detector;
use crate::engine_ascii::AsciiDetector;
use crate::engine_utf16::Utf16LeDetector;
use crate::error::{Result, ScanError};
use crate::findings::sort_hits_stable;
use crate::options::ScanConfig;
use crate::run::DetectParams;
use crate::sink::{CaptureSink, CountSink, HitBudget, HitSink};
use crate::types::{CountScan, FullScan};

/// 进度回调的最小间隔（字节）
pub const PROGRESS_STEP: u64 = 4 << 20; // 4 MiB

/// 调用方对扫描的控制：取消标志与进度回调（均可选）
#[derive(Default)]
pub struct ScanControl<'a> {
    cancel: Option<&'a AtomicBool>,
    progress: Option<&'a mut dyn FnMut(u64, u64)>,
}

impl<'a> ScanControl<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在每个块开始前检查；置位后扫描以 `ScanError::Cancelled` 结束
    pub fn with_cancel(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// 回调参数为 (已处理字节, 本阶段总字节)
    pub fn with_progress(mut self, cb: &'a mut dyn FnMut(u64, u64)) -> Self {
        self.progress = Some(cb);
        self
    }

    fn check_cancel(&self) -> Result<()> {
        match self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(ScanError::Cancelled),
            _ => Ok(()),
        }
    }

    fn report(&mut self, processed: u64, total: u64) {
        if let Some(cb) = self.progress.as_deref_mut() {
            cb(processed, total);
        }
    }
}

/// 完整捕获：返回全部命中（按 (offset, kind) 稳定排序）与截断标志
pub fn scan_full(path: &Path, cfg: &ScanConfig) -> Result<FullScan> {
    scan_full_with(path, cfg, &mut ScanControl::new())
}

pub fn scan_full_with(path: &Path, cfg: &ScanConfig, control: &mut ScanControl<'_>) -> Result<FullScan> {
    cfg.validate()?;
    let mut reader = BufReader::new(File::open(path)?);
    scan_full_reader(&mut reader, cfg, control)
}

pub fn scan_full_reader<R: Read + Seek>(reader: &mut R, cfg: &ScanConfig, control: &mut ScanControl<'_>) -> Result<FullScan> {
    let mut sink = CaptureSink::default();
    let truncated = drive(reader, cfg, &mut sink, control)?;
    let mut hits = sink.hits;
    sort_hits_stable(&mut hits);
    Ok(FullScan { hits, truncated })
}

/// 仅计数：返回分类型计数、截断标志，以及最多 `sample_count` 条样例（按产出顺序）
pub fn scan_counts(path: &Path, cfg: &ScanConfig, sample_count: usize) -> Result<CountScan> {
    scan_counts_with(path, cfg, sample_count, &mut ScanControl::new())
}

pub fn scan_counts_with(
    path: &Path,
    cfg: &ScanConfig,
    sample_count: usize,
    control: &mut ScanControl<'_>,
) -> Result<CountScan> {
    cfg.validate()?;
    let mut reader = BufReader::new(File::open(path)?);
    scan_counts_reader(&mut reader, cfg, sample_count, control)
}

pub fn scan_counts_reader<R: Read + Seek>(
    reader: &mut R,
    cfg: &ScanConfig,
    sample_count: usize,
    control: &mut ScanControl<'_>,
) -> Result<CountScan> {
    let mut sink = CountSink::new(sample_count);
    let truncated = drive(reader, cfg, &mut sink, control)?;
    let mut counts = sink.counts;
    counts.truncated = truncated;
    Ok(CountScan { counts, samples: sink.samples })
}

/// 两种入口共用的驱动；返回是否截断
fn drive<R: Read + Seek>(
    reader: &mut R,
    cfg: &ScanConfig,
    sink: &mut dyn HitSink,
    control: &mut ScanControl<'_>,
) -> Result<bool> {
    cfg.validate()?;
    if cfg.repeat_run_limit == 1 {
        // 保持兼容：阈值 1 会让所有串都被判为退化串
        warn!("repeat_run_limit = 1 suppresses every string; use 0 to disable the check");
    }
    let file_len = reader.seek(SeekFrom::End(0))?;
    let total = cfg.effective_len(file_len);
    let params = DetectParams::from(cfg);
    let (do_ascii, do_utf16) = cfg.modes();

    // 小文件不必分配整块缓冲
    let cap = usize::try_from(total).unwrap_or(usize::MAX).min(cfg.block_size).max(1);
    let mut buf = vec![0u8; cap];
    let mut budget = HitBudget::new(cfg.max_hits);

    let mut truncated = false;
    if do_ascii {
        truncated = run_phase(reader, total, &mut buf, AsciiDetector::new(params), sink, &mut budget, control)?;
        debug!(hits = budget.used(), truncated, "ascii phase finished");
    }
    if do_utf16 && !truncated {
        let before = budget.used();
        debug!(remaining = ?budget.remaining(), "utf16le phase starting");
        truncated = run_phase(reader, total, &mut buf, Utf16LeDetector::new(params), sink, &mut budget, control)?;
        debug!(hits = budget.used() - before, truncated, "utf16le phase finished");
    }
    Ok(truncated)
}

/// 单个检测阶段：从头顺序读取 `total` 字节并喂给检测器；返回是否截断
fn run_phase<R: Read + Seek, D: Detector>(
    reader: &mut R,
    total: u64,
    buf: &mut [u8],
    mut detector: D,
    sink: &mut dyn HitSink,
    budget: &mut HitBudget,
    control: &mut ScanControl<'_>,
) -> Result<bool> {
    reader.seek(SeekFrom::Start(0))?;
    let mut offset = 0u64;
    let mut last_report = 0u64;

    while offset < total {
        control.check_cancel()?;
        if budget.exhausted() {
            return Ok(true);
        }
        let want = (total - offset).min(buf.len() as u64) as usize;
        let n = read_some(reader, &mut buf[..want])?;
        if n == 0 {
            // 文件在扫描期间变短
            break;
        }
        if detector.feed(offset, &buf[..n], sink, budget).is_break() {
            return Ok(true);
        }
        offset += n as u64;
        if offset - last_report >= PROGRESS_STEP {
            last_report = offset;
            control.report(offset, total);
        }
    }

    if detector.finish(sink, budget).is_break() {
        return Ok(true);
    }
    control.report(total, total);
    Ok(false)
}

fn read_some<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    loop {
        match reader.read(buf) {
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}
