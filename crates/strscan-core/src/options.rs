//! 扫描参数与预置（模块）
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::charset::AsciiCharset;
use crate::error::{Result, ScanError};

/// 默认分块大小（字节）
pub const DEFAULT_BLOCK_SIZE: usize = 1 << 20; // 1 MiB
/// 默认命中上限
pub const DEFAULT_MAX_HITS: u32 = 3_000_000;

/// 扫描参数；一次扫描期间不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// 最短串长度（单元数），必须 > 0
    pub min_len: u32,
    /// 最长串长度；更长的可打印段被切成多个 max_len 片段
    pub max_len: u32,
    /// 命中总上限；0 表示不限
    pub max_hits: u32,
    pub ascii_charset: AsciiCharset,
    /// 连续重复字节阈值；<= 0 表示关闭
    pub repeat_run_limit: i32,
    /// 最多扫描的字节数；None 或 Some(0) 表示整个文件
    pub max_bytes: Option<u64>,
    /// 单次读取的块大小
    pub block_size: usize,
    pub scan_ascii: bool,
    pub scan_utf16le: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_len: 5,
            max_len: 4096,
            max_hits: DEFAULT_MAX_HITS,
            ascii_charset: AsciiCharset::BinText,
            repeat_run_limit: 8,
            max_bytes: None,
            block_size: DEFAULT_BLOCK_SIZE,
            scan_ascii: true,
            scan_utf16le: true,
        }
    }
}

impl ScanConfig {
    /// 以默认参数为底，套用指定预置
    pub fn from_preset(preset: Preset) -> Self {
        preset.apply(Self::default())
    }

    /// 在读取任何字节之前校验参数
    pub fn validate(&self) -> Result<()> {
        if self.min_len == 0 {
            return Err(ScanError::InvalidConfig("min_len must be > 0".into()));
        }
        if self.max_len == 0 {
            return Err(ScanError::InvalidConfig("max_len must be > 0".into()));
        }
        if self.max_len < self.min_len {
            return Err(ScanError::InvalidConfig(format!(
                "max_len ({}) must be >= min_len ({})",
                self.max_len, self.min_len
            )));
        }
        if self.block_size == 0 {
            return Err(ScanError::InvalidConfig("block_size must be > 0".into()));
        }
        Ok(())
    }

    /// 实际启用的扫描模式 (ascii, utf16le)；两者都未开启时视为全部开启
    pub fn modes(&self) -> (bool, bool) {
        if !self.scan_ascii && !self.scan_utf16le {
            (true, true)
        } else {
            (self.scan_ascii, self.scan_utf16le)
        }
    }

    /// 模式名（both/ascii/utf16le），用于报告
    pub fn mode_name(&self) -> &'static str {
        match self.modes() {
            (true, true) => "both",
            (true, false) => "ascii",
            _ => "utf16le",
        }
    }

    /// 实际扫描的字节上限：min(文件长度, max_bytes)
    pub(crate) fn effective_len(&self, file_len: u64) -> u64 {
        match self.max_bytes {
            Some(cap) if cap > 0 && cap < file_len => cap,
            _ => file_len,
        }
    }
}

/// 历史兼容预置；数值属于对外契约（兼容性用例依赖它们）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// 旧行为：minLen=4，basic，关闭重复抑制
    Old,
    /// 对齐行为：minLen=5，bintext，重复阈值 8
    Aligned,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Old, Preset::Aligned];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Old => "old",
            Preset::Aligned => "aligned",
        }
    }

    /// 预置三元组 (min_len, ascii_charset, repeat_run_limit)
    pub fn triple(&self) -> (u32, AsciiCharset, i32) {
        match self {
            Preset::Old => (4, AsciiCharset::Basic, 0),
            Preset::Aligned => (5, AsciiCharset::BinText, 8),
        }
    }

    /// 仅覆盖三元组，其余参数保持不变
    pub fn apply(&self, mut cfg: ScanConfig) -> ScanConfig {
        let (min_len, charset, repeat) = self.triple();
        cfg.min_len = min_len;
        cfg.ascii_charset = charset;
        cfg.repeat_run_limit = repeat;
        cfg
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "old" => Ok(Preset::Old),
            "aligned" => Ok(Preset::Aligned),
            other => Err(format!("unknown preset: {other}")),
        }
    }
}
