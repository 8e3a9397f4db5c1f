//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::export::Compression;

/// Graph rendering format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphFormatArg {
    /// Indented text listing
    #[default]
    Text,
    /// Graphviz DOT
    Dot,
}

impl std::fmt::Display for GraphFormatArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Dot => write!(f, "dot"),
        }
    }
}

/// Archive compression for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionArg {
    /// No compression
    Stored,
    /// Deflate
    Deflated,
}

impl std::fmt::Display for CompressionArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stored => write!(f, "stored"),
            Self::Deflated => write!(f, "deflated"),
        }
    }
}

impl From<CompressionArg> for Compression {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::Stored => Compression::Stored,
            CompressionArg::Deflated => Compression::Deflated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_conversion() {
        assert_eq!(Compression::from(CompressionArg::Stored), Compression::Stored);
        assert_eq!(Compression::from(CompressionArg::Deflated), Compression::Deflated);
    }

    #[test]
    fn test_display_matches_value_names() {
        assert_eq!(GraphFormatArg::Dot.to_string(), "dot");
        assert_eq!(CompressionArg::Stored.to_string(), "stored");
    }
}
