//! Owned XML element values

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::config::WriterConfig;
use crate::error::{Error, Result};
use crate::xml::parser::Parser;
use crate::xml::writer::XmlWriter;

/// XML element with lxml-style text and tail
///
/// `text` is the character data before the first child element, `tail` the
/// character data following this element's closing tag inside its parent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: IndexMap<String, String>,
    pub text: Option<String>,
    pub tail: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Append a new empty child and return it for further building
    ///
    /// # Panics
    ///
    /// Never: the child is pushed before it is borrowed back.
    #[allow(clippy::indexing_slicing)]
    pub fn sub_element(&mut self, tag: impl Into<String>) -> &mut Self {
        self.children.push(Self::new(tag));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Number of elements in this subtree, including `self`
    pub fn element_count(&self) -> usize {
        1 + self.children.iter().map(Self::element_count).sum::<usize>()
    }

    /// Serialize with the given writer configuration
    pub fn to_xml(&self, config: &WriterConfig) -> String {
        XmlWriter.write(self, config)
    }
}

impl FromStr for Element {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Parser::new(s.as_bytes()).parse()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml(&WriterConfig::compact()))
    }
}
