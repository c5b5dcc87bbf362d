//! Configuration for the parser, the writer and the tree model

use crate::error::{Error, ErrorKind, Pos, Result};

pub const DEFAULT_MAX_DEPTH: u16 = 64;
pub const DEFAULT_MAX_SIZE: usize = 10 * 1024 * 1024; // 10MB
pub const DEFAULT_MAX_INSERT_ROWS: usize = 10_000;

/// How an element's attributes, text and children are laid out as rows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Three header rows (`Attributes:`, `Text:`, `Children:`) per element
    #[default]
    Grouped,
    /// Attribute rows, one text row, then child element rows
    Flat,
}

/// Configuration for tree model construction and edits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// Row layout under each element
    pub layout: Layout,
    /// Tag for elements created by add-child and add-parent
    pub new_element_tag: String,
    /// Prefix for placeholder tags created by `insert_rows`
    pub placeholder_prefix: String,
    /// Appended to an attribute key until it no longer collides
    pub duplicate_key_suffix: String,
    /// Key used by the "Add Attribute" context action
    pub new_attribute_key: String,
    /// Largest `count` a single `insert_rows` call accepts
    pub max_insert_rows: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            layout: Layout::Grouped,
            new_element_tag: "NewElement".to_string(),
            placeholder_prefix: "untitled".to_string(),
            duplicate_key_suffix: "_new".to_string(),
            new_attribute_key: "NewAttribute".to_string(),
            max_insert_rows: DEFAULT_MAX_INSERT_ROWS,
        }
    }
}

impl ModelConfig {
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }
}

/// Limits applied while parsing XML
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum element nesting depth
    pub max_depth: u16,
    /// Maximum input size in bytes
    pub max_size: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

impl ParserConfig {
    pub fn validate_size(&self, len: usize) -> Result<()> {
        if len > self.max_size {
            return Err(Error::at(
                ErrorKind::MaxSizeExceeded { max: self.max_size },
                Pos::new(0, 1, 1),
            ));
        }
        Ok(())
    }
}

/// Configuration options for serializing XML
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    /// Put child elements on their own indented lines
    pub pretty: bool,
    /// Number of spaces per indentation level
    pub indent_spaces: usize,
    /// Emit `<?xml version="1.0" encoding="UTF-8"?>` first
    pub declaration: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            indent_spaces: 2,
            declaration: false,
        }
    }
}

impl WriterConfig {
    pub fn compact() -> Self {
        Self {
            pretty: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_config() {
        let config = ModelConfig::default();
        assert_eq!(config.layout, Layout::Grouped);
        assert_eq!(config.new_element_tag, "NewElement");
        assert_eq!(config.placeholder_prefix, "untitled");
        assert_eq!(config.duplicate_key_suffix, "_new");
    }

    #[test]
    fn test_validate_size() {
        let config = ParserConfig {
            max_size: 4,
            ..ParserConfig::default()
        };
        assert!(config.validate_size(4).is_ok());
        let err = config.validate_size(5);
        assert!(matches!(
            err.map_err(|e| e.kind().clone()),
            Err(ErrorKind::MaxSizeExceeded { max: 4 })
        ));
    }
}
