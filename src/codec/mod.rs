//! NAF serialization.
//!
//! The codec is split in three layers: [`xml`] turns text into an owned element
//! tree and back, [`reader`] maps that tree onto a [`Document`](crate::Document)
//! and [`writer`] does the inverse. Only the reader and the writer know NAF
//! element and attribute names.

pub mod reader;
pub mod writer;
pub mod xml;

use serde::{Deserialize, Serialize};

/// Output settings for the writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Spaces per nesting level.
    pub indent: usize,
    /// Interleave surface-string comments (`<!--John-->`) with annotations.
    pub emit_comments: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            emit_comments: true,
        }
    }
}

impl CodecConfig {
    /// Compact output: no indentation, no comments.
    pub fn compact() -> Self {
        Self {
            indent: 0,
            emit_comments: false,
        }
    }
}
