//! Minimal XML element tree: owned values, an arena document, parser and writer

mod cursor;
pub mod document;
pub mod element;
pub mod parser;
pub mod writer;

pub use document::{Document, ElementId};
pub use element::Element;
pub use parser::Parser;
pub use writer::XmlWriter;

/// Check that `name` is usable as a tag or attribute key
pub fn is_valid_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(first) if is_name_start(first) => bytes.all(is_name_char),
        _ => false,
    }
}

pub(crate) fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':')
}

pub(crate) fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}
