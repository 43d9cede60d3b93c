//! 配置文件加载（TOML）
//!
//! 所有字段均可省略；省略的字段保持底层配置不变。示例：
//!
//! ```toml
//! preset = "aligned"
//! max_len = 1024
//! max_hits = 0
//! ascii_charset = "basic"
//! scan_utf16le = false
//! ```
use serde::Deserialize;
use std::path::Path;

use crate::charset::AsciiCharset;
use crate::error::Result;
use crate::options::{Preset, ScanConfig};

/// 配置文件顶层结构
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub preset: Option<Preset>,
    #[serde(default)]
    pub min_len: Option<u32>,
    #[serde(default)]
    pub max_len: Option<u32>,
    #[serde(default)]
    pub max_hits: Option<u32>,
    #[serde(default)]
    pub ascii_charset: Option<AsciiCharset>,
    #[serde(default)]
    pub repeat_run_limit: Option<i32>,
    #[serde(default)]
    pub max_bytes: Option<u64>,
    #[serde(default)]
    pub block_size: Option<usize>,
    #[serde(default)]
    pub scan_ascii: Option<bool>,
    #[serde(default)]
    pub scan_utf16le: Option<bool>,
}

impl ConfigFile {
    pub fn parse(txt: &str) -> Result<Self> {
        Ok(toml::from_str(txt)?)
    }

    /// 将文件中出现的字段覆盖到 `base` 上；若指定了 preset，最后套用预置三元组
    pub fn apply(&self, mut base: ScanConfig) -> ScanConfig {
        if let Some(v) = self.min_len { base.min_len = v; }
        if let Some(v) = self.max_len { base.max_len = v; }
        if let Some(v) = self.max_hits { base.max_hits = v; }
        if let Some(v) = self.ascii_charset { base.ascii_charset = v; }
        if let Some(v) = self.repeat_run_limit { base.repeat_run_limit = v; }
        if let Some(v) = self.max_bytes { base.max_bytes = Some(v); }
        if let Some(v) = self.block_size { base.block_size = v; }
        if let Some(v) = self.scan_ascii { base.scan_ascii = v; }
        if let Some(v) = self.scan_utf16le { base.scan_utf16le = v; }
        match self.preset {
            Some(p) => p.apply(base),
            None => base,
        }
    }
}

/// 读取 TOML 配置文件并叠加到默认配置上
pub fn load_scan_config(path: &Path) -> Result<ScanConfig> {
    let txt = std::fs::read_to_string(path)?;
    let file = ConfigFile::parse(&txt)?;
    Ok(file.apply(ScanConfig::default()))
}
