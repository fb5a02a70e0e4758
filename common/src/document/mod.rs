//! Flickr API dump documents
//!
//! Dumps are loose about scalar types: numbers may come as JSON numbers or
//! numeric strings, and text as plain strings or `{"_content": "..."}`.

use serde::{Deserialize, Deserializer, de::Error};

pub mod info;
pub mod comments;
pub mod context;

pub use info::{InfoDocument, PhotoRecords};
pub use comments::CommentsDocument;
pub use context::ContextDocument;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInt {
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    Str(String),
    Int(i64),
    Content {
        #[serde(rename = "_content")]
        content: String
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<RawText> for String {
    fn from(value: RawText) -> Self {
        match value {
            RawText::Str(s) | RawText::Content { content: s } => s,
            RawText::Int(i) => i.to_string(),
        }
    }
}

/// Integer encoded as number or numeric string
fn int<'de, D: Deserializer<'de>>(de: D) -> Result<i64, D::Error> {
    match RawInt::deserialize(de)? {
        RawInt::Int(i) => Ok(i),
        RawInt::Float(f) => Ok(f as i64),
        RawInt::Str(s) => match s.trim() {
            // Flickr leaves some counters empty
            "" => Ok(0),
            s => s.parse().map_err(D::Error::custom),
        },
    }
}

/// String, number or `{"_content": ...}` object
fn text<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    RawText::deserialize(de).map(String::from)
}

fn opt_text<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Option::<RawText>::deserialize(de).map(|t| t.map(String::from))
}

/// `0`/`1`, `"0"`/`"1"` or boolean
fn flag<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    match RawFlag::deserialize(de)? {
        RawFlag::Bool(b) => Ok(b),
        RawFlag::Int(i) => Ok(i != 0),
        RawFlag::Str(s) => Ok(!matches!(s.trim(), "" | "0" | "false")),
    }
}
