//! Word forms: the token layer every other layer ultimately points at.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a word form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WfId(String);

impl WfId {
    /// Wrap an identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WfId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WfId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for WfId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for WfId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A token of the source text.
///
/// Sentence and paragraph numbers feed the document indices, so they are only
/// changed through the owning [`Document`](crate::Document).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wf {
    id: WfId,
    sent: u32,
    para: Option<u32>,
    /// Page number.
    pub page: Option<u32>,
    /// Character offset in the raw text.
    pub offset: Option<u32>,
    /// Length in characters.
    pub length: Option<u32>,
    /// Location in the source markup.
    pub xpath: Option<String>,
    /// Surface text.
    pub form: String,
}

impl Wf {
    pub(crate) fn new(id: WfId, form: impl Into<String>, sent: u32) -> Self {
        Self {
            id,
            sent,
            para: None,
            page: None,
            offset: None,
            length: None,
            xpath: None,
            form: form.into(),
        }
    }

    /// Identifier.
    pub fn id(&self) -> &WfId {
        &self.id
    }

    /// Sentence number.
    pub fn sent(&self) -> u32 {
        self.sent
    }

    /// Paragraph number, if assigned.
    pub fn para(&self) -> Option<u32> {
        self.para
    }

    pub(crate) fn set_para(&mut self, para: u32) {
        self.para = Some(para);
    }

    /// Offset just past the last character, when both offset and length are known.
    pub fn end_offset(&self) -> Option<u32> {
        Some(self.offset? + self.length?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_offset() {
        let mut wf = Wf::new(WfId::new("w1"), "John", 1);
        assert_eq!(wf.end_offset(), None);
        wf.offset = Some(10);
        wf.length = Some(4);
        assert_eq!(wf.end_offset(), Some(14));
    }

    #[test]
    fn test_wf_id_borrows_as_str() {
        let mut map = std::collections::HashMap::new();
        map.insert(WfId::new("w3"), 3);
        assert_eq!(map.get("w3"), Some(&3));
    }
}
