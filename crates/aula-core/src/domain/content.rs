//! Content blocks of a project canvas.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Kind tag of a content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Text,
    Heading,
    Image,
    Video,
    Code,
    Table,
    List,
    Quote,
}

/// A metadata value as produced by the client-side canvas document.
///
/// Untagged so an arbitrary JSON document deserializes directly into it;
/// variant order matters for deserialization (null and bool before the
/// numeric variants, composites last).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Any object, array or otherwise nested shape.
    Composite(serde_json::Value),
}

/// One unit of a project's free-form document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub id: Uuid,
    pub kind: BlockKind,
    /// Raw block content (text body, media URL, code listing, ...).
    pub content: String,
    /// Stable sort key within the canvas.
    pub order: u32,
    /// Open metadata mapping, sanitized before persistence.
    #[serde(default)]
    pub meta: BTreeMap<String, MetaValue>,
}

impl ContentBlock {
    /// Create a block with empty metadata.
    pub fn new(kind: BlockKind, content: impl Into<String>, order: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            content: content.into(),
            order,
            meta: BTreeMap::new(),
        }
    }
}
