//! 错误类型
//!
//! 扫描核心只有两类真正的失败：输入无法打开/读取，以及配置非法（在读任何字节之前拒绝）。
//! 截断不是错误，而是结果上的标志位。
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// 打开或读取输入失败，扫描中止
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 配置非法（min_len/max_len/block_size 等）
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// 调用方通过取消标志中止扫描
    #[error("scan cancelled")]
    Cancelled,

    /// TOML 配置文件解析失败
    #[error("config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    /// 过滤用正则编译失败
    #[error("invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
