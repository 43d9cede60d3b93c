//! 可打印字节判定（字符集策略）
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ASCII 可打印字符集
/// - Basic：仅 0x20..=0x7E
/// - BinText：在 Basic 基础上额外接受 TAB/LF/CR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AsciiCharset {
    Basic,
    BinText,
}

impl AsciiCharset {
    pub fn as_str(&self) -> &'static str {
        match self {
            AsciiCharset::Basic => "basic",
            AsciiCharset::BinText => "bintext",
        }
    }
}

impl fmt::Display for AsciiCharset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AsciiCharset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(AsciiCharset::Basic),
            "bintext" => Ok(AsciiCharset::BinText),
            other => Err(format!("unknown ascii charset: {other}")),
        }
    }
}

/// 判定单个字节在指定字符集下是否“可打印”
#[inline]
pub fn is_printable(b: u8, charset: AsciiCharset) -> bool {
    match charset {
        AsciiCharset::Basic => (0x20..=0x7E).contains(&b),
        AsciiCharset::BinText => (0x20..=0x7E).contains(&b) || matches!(b, 0x09 | 0x0A | 0x0D),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_accepts_only_visible_range() {
        assert!(is_printable(b' ', AsciiCharset::Basic));
        assert!(is_printable(b'~', AsciiCharset::Basic));
        assert!(!is_printable(0x1F, AsciiCharset::Basic));
        assert!(!is_printable(0x7F, AsciiCharset::Basic));
        assert!(!is_printable(b'\t', AsciiCharset::Basic));
        assert!(!is_printable(b'\n', AsciiCharset::Basic));
    }

    #[test]
    fn bintext_adds_tab_lf_cr() {
        for b in [b'\t', b'\n', b'\r'] {
            assert!(is_printable(b, AsciiCharset::BinText));
        }
        assert!(!is_printable(0x0B, AsciiCharset::BinText));
        assert!(!is_printable(0x00, AsciiCharset::BinText));
        assert!(!is_printable(0x80, AsciiCharset::BinText));
    }

    #[test]
    fn charset_parses_case_insensitively() {
        assert_eq!("BinText".parse::<AsciiCharset>().unwrap(), AsciiCharset::BinText);
        assert_eq!("basic".parse::<AsciiCharset>().unwrap(), AsciiCharset::Basic);
        assert!("utf8".parse::<AsciiCharset>().is_err());
    }
}
