//! 流式字符串提取库
//!
//! 设计要点：
//! - 以固定大小的块顺序读取文件，不整读；检测结果与块边界无关。
//! - ASCII 与 UTF-16LE（仅 Latin 子集）各自一个状态机，共用同一套段累积与判定规则。
//! - 完整捕获与仅计数是同一状态机的两种投影（`HitSink`），总数与截断判定必然一致。
//! - 命中预算跨两个阶段共享，一旦耗尽立即停止（不等到块边界）。

mod batch;
mod charset;
mod config_file;
mod detectors;
mod engine_ascii;
mod engine_utf16;
mod error;
mod filter;
mod findings;
mod options;
mod repeat;
mod run;
mod scan;
mod sink;
mod types;

pub use batch::{scan_dir_and_write, BatchItem, BatchStats};
pub use charset::{is_printable, AsciiCharset};
pub use config_file::{load_scan_config, ConfigFile};
pub use error::{Result, ScanError};
pub use filter::{HitFilter, KindFilter, SearchMode};
pub use findings::sort_hits_stable;
pub use options::{Preset, ScanConfig, DEFAULT_BLOCK_SIZE, DEFAULT_MAX_HITS};
pub use repeat::has_degenerate_repeat;
pub use scan::{
    scan_counts, scan_counts_reader, scan_counts_with, scan_full, scan_full_reader, scan_full_with, ScanControl,
    PROGRESS_STEP,
};
pub use sink::{CaptureSink, CountSink, HitBudget, HitSink};
pub use types::{CountResult, CountScan, FullScan, Hit, HitKind, ScanOutcome};
