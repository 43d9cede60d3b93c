//! 目录批量扫描与并行调度
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::options::ScanConfig;
use crate::scan::scan_counts;
use crate::types::CountResult;

/// 批量扫描统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone)]
pub struct BatchStats {
    pub files_scanned: usize,
    pub files_failed: usize,
    pub strings_total: u64,
}

/// 输出项结构（JSON 数组的单个元素）
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem<'a> {
    pub file: &'a str,
    pub ascii: u64,
    pub utf16le: u64,
    pub total: u64,
    pub truncated: bool,
}

/// 扫描目录下的全部文件（仅第一层），按文件名排序后以 JSON 数组流式写入 `out`
/// - 每个文件走计数模式，不保留命中
/// - 单个文件失败只记日志并计入 `files_failed`
/// - `threads`：None 表示自动（CPU 核数）；Some(1) 走串行
pub fn scan_dir_and_write(input_dir: &Path, out: &mut dyn Write, cfg: &ScanConfig, threads: Option<usize>) -> Result<BatchStats> {
    cfg.validate()?;

    let mut files: Vec<PathBuf> = vec![];
    for entry in WalkDir::new(input_dir).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skip unreadable directory entry");
                continue;
            }
        };
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    // 按文件名排序，确保输出顺序稳定
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let threads = threads.unwrap_or_else(num_cpus::get).max(1);
    let mut stats = BatchStats::default();
    let mut writer = ItemWriter::new(out)?;

    if threads > 1 && files.len() > 1 {
        scan_parallel(&files, cfg, threads, &mut writer, &mut stats)?;
    } else {
        for path in &files {
            let res = scan_counts(path, cfg, 0).map(|c| c.counts);
            writer.write_result(path, res, &mut stats)?;
        }
    }

    writer.close()?;
    Ok(stats)
}

/// 并行调度：
/// - 在后台线程内创建 Rayon 线程池并行扫描
/// - 当前线程作为唯一 Writer，按 idx 重排后流式写 JSON，保证稳定顺序
fn scan_parallel(
    files: &[PathBuf],
    cfg: &ScanConfig,
    threads: usize,
    writer: &mut ItemWriter<'_>,
    stats: &mut BatchStats,
) -> Result<()> {
    use crossbeam_channel as channel;
    use rayon::prelude::*;
    use std::collections::BTreeMap;

    type Msg = (usize /*idx*/, crate::error::Result<CountResult>);
    let (tx, rx) = channel::bounded::<Msg>(256);

    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    let files_vec: Vec<(usize, PathBuf)> = files.iter().cloned().enumerate().collect();
    let cfg_owned = cfg.clone();

    let scan_thread = std::thread::spawn(move || {
        pool.install(|| {
            // Receiver 被丢弃后 send 失败，剩余文件不再扫描
            let _ = files_vec.par_iter().try_for_each_with(tx, |tx, (idx, path)| {
                let res = scan_counts(path, &cfg_owned, 0).map(|c| c.counts);
                tx.send((*idx, res))
            });
        });
        // 结束后 Sender 全部被丢弃，Receiver 将收到关闭信号
    });

    // Writer：维护 next_idx 与缓存，按序输出
    let mut next_idx = 0usize;
    let mut pending: BTreeMap<usize, crate::error::Result<CountResult>> = BTreeMap::new();
    let mut written = Ok(());
    'recv: while let Ok((idx, res)) = rx.recv() {
        pending.insert(idx, res);
        while let Some(res) = pending.remove(&next_idx) {
            if let Err(e) = writer.write_result(&files[next_idx], res, stats) {
                written = Err(e);
                break 'recv;
            }
            next_idx += 1;
        }
    }

    // 先关掉 Receiver 再等待扫描线程，写入失败时也不留下后台线程
    drop(rx);
    let joined = scan_thread.join();
    written?;
    if joined.is_err() {
        anyhow::bail!("scan worker panicked");
    }
    Ok(())
}

/// JSON 数组的流式写入器
struct ItemWriter<'w> {
    out: &'w mut dyn Write,
    first: bool,
}

impl<'w> ItemWriter<'w> {
    fn new(out: &'w mut dyn Write) -> Result<Self> {
        write!(out, "[")?;
        Ok(Self { out, first: true })
    }

    fn write_result(&mut self, path: &Path, res: crate::error::Result<CountResult>, stats: &mut BatchStats) -> Result<()> {
        let counts = match res {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "scan failed, skipped");
                stats.files_failed += 1;
                return Ok(());
            }
        };
        stats.files_scanned += 1;
        stats.strings_total += counts.total();

        let name = path.file_name().map(|s| s.to_string_lossy()).unwrap_or_default();
        let item = BatchItem {
            file: &name,
            ascii: counts.ascii_count,
            utf16le: counts.utf16le_count,
            total: counts.total(),
            truncated: counts.truncated,
        };
        if !self.first {
            write!(self.out, ",")?;
        } else {
            self.first = false;
        }
        serde_json::to_writer(&mut *self.out, &item)?;
        Ok(())
    }

    fn close(self) -> Result<()> {
        write!(self.out, "]")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.bin"), b"\x00\x00second file text\x00").unwrap();
        std::fs::write(dir.path().join("a.bin"), b"alpha string\x00beta string\x00").unwrap();
        std::fs::write(dir.path().join("c.bin"), [0u8; 64]).unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("skip.bin"), b"should not be scanned").unwrap();
        dir
    }

    fn run(threads: usize) -> (serde_json::Value, BatchStats) {
        let dir = make_dir();
        let mut out = Vec::new();
        let cfg = ScanConfig { scan_utf16le: false, ..ScanConfig::default() };
        let stats = scan_dir_and_write(dir.path(), &mut out, &cfg, Some(threads)).unwrap();
        (serde_json::from_slice(&out).unwrap(), stats)
    }

    #[test]
    fn serial_output_sorted_by_file_name() {
        let (v, stats) = run(1);
        let names: Vec<_> = v.as_array().unwrap().iter().map(|i| i["file"].as_str().unwrap().to_string()).collect();
        assert_eq!(names, vec!["a.bin", "b.bin", "c.bin"]);
        assert_eq!(v[0]["ascii"], 2);
        assert_eq!(v[1]["total"], 1);
        assert_eq!(v[2]["total"], 0);
        assert_eq!(stats.files_scanned, 3);
        assert_eq!(stats.strings_total, 3);
    }

    #[test]
    fn parallel_output_matches_serial() {
        let (serial, _) = run(1);
        let (parallel, stats) = run(4);
        assert_eq!(serial, parallel);
        assert_eq!(stats.files_failed, 0);
    }

    /// 只允许写入前 `left` 个字节，之后一律报错
    struct FailingWriter {
        left: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.left == 0 {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
            }
            let n = buf.len().min(self.left);
            self.left -= n;
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_error_stops_parallel_scan() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..64 {
            std::fs::write(dir.path().join(format!("f{i:02}.bin")), b"some printable text\x00more text here").unwrap();
        }
        for threads in [1usize, 4] {
            let mut out = FailingWriter { left: 1 };
            let err = scan_dir_and_write(dir.path(), &mut out, &ScanConfig::default(), Some(threads));
            assert!(err.is_err(), "threads={threads}");
        }
    }

    #[test]
    fn empty_directory_writes_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        let stats = scan_dir_and_write(dir.path(), &mut out, &ScanConfig::default(), Some(2)).unwrap();
        assert_eq!(out, b"[]");
        assert_eq!(stats.files_scanned, 0);
    }
}
