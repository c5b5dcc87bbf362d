//! etreemodel: a tree-view model over an editable XML element tree
//!
//! This crate provides:
//! - A small XML element tree with a parser and a writer
//! - A node hierarchy mirroring that tree as rows for a tree view, grouped
//!   under header rows or laid out flat
//! - A model adapter answering index/parent/row-count queries and wrapping
//!   every structural edit in balanced begin/end notifications
//! - Line-oriented edit scripts and a plain-text outline renderer
//!
//! # Examples
//! ```
//! use etreemodel::{outline, EtreeModel, ModelConfig, Result, Role};
//!
//! fn example() -> Result<()> {
//!     let mut model = EtreeModel::parse("<root><child/></root>", ModelConfig::default())?;
//!     let root = model.root_index();
//!     assert!(model.set_data(&root, "renamed", Role::Edit));
//!     print!("{}", outline(&model));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

use std::path::Path;

use tracing::{debug, error, info, instrument};

pub mod config;
pub mod error;
pub mod hierarchy;
pub mod model;
pub mod outline;
pub mod script;
pub mod xml;

// Re-exports
pub use config::{Layout, ModelConfig, ParserConfig, WriterConfig};
pub use error::{Error, ErrorKind, Result};
pub use hierarchy::{Group, ItemFlags, NodeKind};
pub use model::{Action, EtreeModel, ModelIndex, ModelObserver, Notification, Orientation, Recorder, Role};
pub use outline::outline;
pub use xml::Element;

/// Read and parse an XML file
#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn parse_file(path: impl AsRef<Path>, config: ParserConfig) -> Result<Element> {
    let content = std::fs::read(path.as_ref()).map_err(|e| {
        error!("Failed to read file: {}", e);
        Error::detached(ErrorKind::Io {
            detail: e.to_string(),
        })
    })?;
    info!(bytes = content.len(), "File read successfully");

    let root = xml::Parser::with_config(&content, config).parse()?;
    debug!(elements = root.element_count(), "Parsing completed");
    Ok(root)
}
