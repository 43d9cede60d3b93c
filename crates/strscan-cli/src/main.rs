use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use strscan_core::{
    load_scan_config, scan_counts_with, scan_dir_and_write, scan_full_with, Hit, HitFilter, KindFilter, Preset,
    ScanConfig, ScanControl, ScanOutcome, SearchMode,
};
use tracing::{debug, info};

mod report;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "strscan", version, about = "从二进制文件中提取 ASCII / UTF-16LE 字符串")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// 扫描参数（scan 与 batch 共用）
#[derive(Args, Debug)]
struct ConfigArgs {
    /// 预置参数：old=旧行为，aligned=对齐行为（覆盖 min-len/ascii-charset/repeat-run）
    #[arg(long, value_parser = ["old", "aligned"])]
    preset: Option<String>,

    /// 配置文件路径（TOML）；命令行参数优先于文件
    #[arg(long)]
    config: Option<PathBuf>,

    /// 最短串长度（默认 5）
    #[arg(long)]
    min_len: Option<u32>,

    /// 最长串长度，更长的段被切分（默认 4096）
    #[arg(long)]
    max_len: Option<u32>,

    /// 命中上限，0 表示不限（默认 3000000）
    #[arg(long)]
    max_hits: Option<u32>,

    /// ASCII 字符集：basic 或 bintext（默认 bintext）
    #[arg(long, value_parser = ["basic", "bintext"])]
    ascii_charset: Option<String>,

    /// 连续重复字符阈值（<=0 表示关闭，默认 8）
    #[arg(long, allow_hyphen_values = true)]
    repeat_run: Option<i32>,

    /// 最多扫描字节数（0 表示全文件）
    #[arg(long)]
    max_bytes: Option<u64>,

    /// 读取块大小（字节，默认 1 MiB）
    #[arg(long)]
    block_size: Option<usize>,

    /// 只扫描 ASCII
    #[arg(long)]
    ascii: bool,

    /// 只扫描 UTF-16LE
    #[arg(long)]
    utf16le: bool,

    /// 两种都扫描（默认）
    #[arg(long)]
    both: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 扫描单个文件并输出统计与样例
    Scan {
        /// 待扫描的文件路径
        file: PathBuf,

        #[command(flatten)]
        cfg: ConfigArgs,

        /// 同时跑 old 与 aligned 并输出对比
        #[arg(long, conflicts_with_all = ["preset", "json"])]
        compare: bool,

        /// 打印前 N 条样例
        #[arg(long, default_value_t = 0)]
        samples: usize,

        /// 只统计数量（低内存），不保存所有命中
        #[arg(long)]
        count_only: bool,

        /// 以 JSON 数组输出命中（计数模式下为样例）
        #[arg(long)]
        json: bool,

        /// 过滤关键字（空白分隔，全部出现才算命中）；配合 --regex 则视为正则
        #[arg(long)]
        grep: Option<String>,

        /// 将 --grep 视为忽略大小写的正则
        #[arg(long, requires = "grep")]
        regex: bool,

        /// 输出类型过滤：all、ascii 或 utf16le
        #[arg(long = "type", default_value = "all", value_parser = ["all", "ascii", "utf16le"])]
        kind: String,

        /// 相同文本只输出一次
        #[arg(long)]
        unique: bool,

        /// 只输出长度不小于 N 的命中（不影响计数）
        #[arg(long, default_value_t = 0)]
        filter_min_len: usize,
    },
    /// 扫描目录下的全部文件，输出每个文件的计数（JSON 数组）
    Batch {
        /// 输入目录
        #[arg(long)]
        input: PathBuf,

        /// 输出文件（JSON 数组）
        #[arg(long, default_value = "./strings.json")]
        output: PathBuf,

        /// 线程数（"auto"=CPU 核心数）
        #[arg(long, default_value = "auto")]
        threads: String,

        #[command(flatten)]
        cfg: ConfigArgs,
    },
}

/// scan 子命令的输出选项
struct OutputOptions {
    samples: usize,
    count_only: bool,
    json: bool,
    filter: Option<HitFilter>,
}

fn main() -> Result<ExitCode> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { file, cfg, compare, samples, count_only, json, grep, regex, kind, unique, filter_min_len } => {
            if !file.is_file() {
                eprintln!("文件不存在: {}", file.display());
                return Ok(ExitCode::from(2));
            }
            let presets: Vec<Preset> = if compare {
                Preset::ALL.to_vec()
            } else {
                cfg.preset()?.into_iter().collect()
            };

            let filter = if grep.is_some() || unique || kind != "all" || filter_min_len > 0 {
                let mode = if regex { SearchMode::Regex } else { SearchMode::Plain };
                let kind: KindFilter = kind.parse().map_err(|e: String| anyhow!(e))?;
                let query = grep.as_deref().unwrap_or("");
                Some(HitFilter::new(query, mode, kind, filter_min_len, unique).context("build search filter")?)
            } else {
                None
            };
            let opts = OutputOptions { samples, count_only, json, filter };

            info!(?file, "starting scan");
            let stdout = io::stdout();
            let mut out = stdout.lock();

            if presets.is_empty() {
                let base = cfg.resolve(None)?;
                if !json {
                    writeln!(out, "{}", report::describe_config(&base))?;
                }
                run_once(&mut out, &file, &base, &opts)?;
            } else {
                let mut totals: Vec<(Preset, u64)> = Vec::new();
                for preset in presets {
                    let scan_cfg = cfg.resolve(Some(preset))?;
                    if !json {
                        writeln!(out, "{}", report::describe_preset(preset, &scan_cfg))?;
                    }
                    let total = run_once(&mut out, &file, &scan_cfg, &opts)?;
                    totals.push((preset, total));
                    if !json {
                        writeln!(out)?;
                    }
                }
                if let [(Preset::Old, old), (Preset::Aligned, aligned)] = totals.as_slice() {
                    writeln!(out, "{}", report::describe_diff(*old, *aligned))?;
                }
            }
            out.flush().ok();
        }
        Commands::Batch { input, output, threads, cfg } => {
            info!(?input, ?output, "starting batch scan");
            let scan_cfg = cfg.resolve(cfg.preset()?)?;

            // 以缓冲方式打开输出文件，按 JSON 数组流式写入
            let mut out = BufWriter::new(File::create(&output).context("create output file")?);
            let stats = scan_dir_and_write(&input, &mut out, &scan_cfg, parse_threads(&threads)).context("batch scan failed")?;
            out.flush().context("flush output file")?;

            info!(
                files_scanned = stats.files_scanned,
                files_failed = stats.files_failed,
                strings_total = stats.strings_total,
                "batch scan finished"
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

impl ConfigArgs {
    /// 默认值 → 配置文件 → 命令行参数（不含预置，也不校验）
    fn build(&self) -> Result<ScanConfig> {
        let mut cfg = match &self.config {
            Some(path) => load_scan_config(path).with_context(|| format!("load config {}", path.display()))?,
            None => ScanConfig::default(),
        };
        if let Some(v) = self.min_len { cfg.min_len = v; }
        if let Some(v) = self.max_len { cfg.max_len = v; }
        if let Some(v) = self.max_hits { cfg.max_hits = v; }
        if let Some(v) = &self.ascii_charset {
            cfg.ascii_charset = v.parse().map_err(|e: String| anyhow!(e))?;
        }
        if let Some(v) = self.repeat_run { cfg.repeat_run_limit = v; }
        if let Some(v) = self.max_bytes { cfg.max_bytes = Some(v); }
        if let Some(v) = self.block_size { cfg.block_size = v; }
        // 指定了任意模式参数才覆盖；都不指定时保持配置（默认两者都扫）
        if self.ascii || self.utf16le || self.both {
            cfg.scan_ascii = self.ascii || self.both;
            cfg.scan_utf16le = self.utf16le || self.both;
        }
        Ok(cfg)
    }

    /// 最终参数：在 `build` 的结果上套用预置，再整体校验
    fn resolve(&self, preset: Option<Preset>) -> Result<ScanConfig> {
        let mut cfg = self.build()?;
        if let Some(p) = preset {
            cfg = p.apply(cfg);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    fn preset(&self) -> Result<Option<Preset>> {
        self.preset
            .as_deref()
            .map(|s| s.parse::<Preset>().map_err(|e| anyhow!(e)))
            .transpose()
    }
}

/// 按给定参数扫描一次并输出；返回命中总数
fn run_once(out: &mut dyn Write, file: &Path, cfg: &ScanConfig, opts: &OutputOptions) -> Result<u64> {
    let mut on_progress = |done: u64, total: u64| debug!(done, total, "scan progress");
    let mut control = ScanControl::new().with_progress(&mut on_progress);

    let outcome = if opts.count_only {
        ScanOutcome::Counts(scan_counts_with(file, cfg, opts.samples, &mut control).context("scan failed")?)
    } else {
        ScanOutcome::Full(scan_full_with(file, cfg, &mut control).context("scan failed")?)
    };

    let selected: Vec<&Hit> = match &opts.filter {
        Some(f) => f.apply(outcome.hits()),
        None => outcome.hits().iter().collect(),
    };
    // 未指定样例数时：JSON 或带过滤条件则输出全部，否则只输出摘要
    let show_all = opts.json || opts.filter.is_some();
    let limit = match opts.samples {
        0 if show_all => selected.len(),
        n => n.min(selected.len()),
    };

    let counts = outcome.counts();
    if opts.json {
        report::write_hits_json(out, &selected[..limit])?;
        info!(summary = %report::summarize_counts(&counts, cfg.max_hits), "scan finished");
    } else {
        if limit > 0 {
            report::print_samples(out, &selected[..limit])?;
        }
        writeln!(out, "{}", report::summarize_counts(&counts, cfg.max_hits))?;
    }
    Ok(counts.total())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 支持通过环境变量 RUST_LOG 控制日志等级，如：RUST_LOG=debug；日志走 stderr，stdout 只留结果
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).with_writer(io::stderr).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 解析线程参数
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") { return None; }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}
