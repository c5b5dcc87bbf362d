//! Line-oriented edit scripts driving a model through its command surface
//!
//! One command per line. Blank lines and lines starting with `#` are
//! skipped. Rows are addressed by a PATH of slash-separated row numbers
//! walked from the invisible root, so `0` is the document root element and
//! `0/2/1` the second row under its third row. `/` is the invisible root.
//!
//! ```text
//! set PATH COLUMN VALUE...
//! add-attr PATH KEY [VALUE...]
//! remove-attr PATH KEY
//! add-child PATH
//! add-parent PATH
//! remove PATH
//! delete PATH
//! insert-rows PATH POSITION COUNT
//! remove-rows PATH POSITION COUNT
//! action PATH LABEL...
//! ```

use std::fmt;
use std::str::FromStr;

use tracing::{debug, instrument, warn};

use crate::error::{Error, ErrorKind, Result, Span};
use crate::model::{Action, EtreeModel, ModelIndex, ModelObserver, Role};

/// Row numbers from the invisible root down to one node
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowPath(Vec<usize>);

impl RowPath {
    pub fn rows(&self) -> &[usize] {
        &self.0
    }

    /// Walk the path through the model's `index` queries
    pub fn resolve<O: ModelObserver>(&self, model: &EtreeModel<O>) -> Result<ModelIndex> {
        let mut index = ModelIndex::invalid();
        for &row in &self.0 {
            index = model.index(row, 0, &index);
            if !index.is_valid() {
                return Err(Error::detached(ErrorKind::InvalidPath {
                    path: self.to_string(),
                }));
            }
        }
        Ok(index)
    }
}

impl FromStr for RowPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        trimmed
            .split('/')
            .map(|part| part.parse::<usize>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Self)
            .map_err(|_| {
                Error::detached(ErrorKind::InvalidPath {
                    path: s.to_string(),
                })
            })
    }
}

impl fmt::Display for RowPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join("/"))
    }
}

/// One edit
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Set {
        path: RowPath,
        column: usize,
        value: String,
    },
    AddAttribute {
        path: RowPath,
        key: String,
        value: String,
    },
    RemoveAttribute {
        path: RowPath,
        key: String,
    },
    AddChild(RowPath),
    AddParent(RowPath),
    Remove(RowPath),
    Delete(RowPath),
    InsertRows {
        path: RowPath,
        position: usize,
        count: usize,
    },
    RemoveRows {
        path: RowPath,
        position: usize,
        count: usize,
    },
    Action {
        path: RowPath,
        action: Action,
    },
}

/// Split off the first whitespace-delimited word
fn next_word(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    let (word, rest) = input.split_at(end);
    Some((word, rest))
}

struct Args<'a> {
    command: &'a str,
    rest: &'a str,
}

impl<'a> Args<'a> {
    fn word(&mut self, what: &str) -> Result<&'a str> {
        let (word, rest) = next_word(self.rest).ok_or_else(|| {
            Error::with_message(
                ErrorKind::InvalidCommand {
                    command: self.command.to_string(),
                },
                Span::empty(),
                format!("{}: missing {what}", self.command),
            )
        })?;
        self.rest = rest;
        Ok(word)
    }

    fn number(&mut self, what: &str) -> Result<usize> {
        let word = self.word(what)?;
        word.parse().map_err(|_| {
            Error::with_message(
                ErrorKind::InvalidCommand {
                    command: self.command.to_string(),
                },
                Span::empty(),
                format!("{}: {what} must be a number, got {word:?}", self.command),
            )
        })
    }

    fn path(&mut self) -> Result<RowPath> {
        self.word("path")?.parse()
    }

    /// Everything left, trimmed
    fn remainder(&mut self) -> &'a str {
        std::mem::take(&mut self.rest).trim()
    }

    fn finish(&self) -> Result<()> {
        let extra = self.rest.trim();
        if extra.is_empty() {
            Ok(())
        } else {
            Err(Error::with_message(
                ErrorKind::InvalidCommand {
                    command: self.command.to_string(),
                },
                Span::empty(),
                format!("{}: unexpected {extra:?}", self.command),
            ))
        }
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let (command, rest) = next_word(line).ok_or_else(|| {
            Error::detached(ErrorKind::InvalidCommand {
                command: String::new(),
            })
        })?;
        let mut args = Args { command, rest };
        let parsed = match command {
            "set" => Self::Set {
                path: args.path()?,
                column: args.number("column")?,
                value: args.remainder().to_string(),
            },
            "add-attr" => Self::AddAttribute {
                path: args.path()?,
                key: args.word("key")?.to_string(),
                value: args.remainder().to_string(),
            },
            "remove-attr" => Self::RemoveAttribute {
                path: args.path()?,
                key: args.word("key")?.to_string(),
            },
            "add-child" => Self::AddChild(args.path()?),
            "add-parent" => Self::AddParent(args.path()?),
            "remove" => Self::Remove(args.path()?),
            "delete" => Self::Delete(args.path()?),
            "insert-rows" => Self::InsertRows {
                path: args.path()?,
                position: args.number("position")?,
                count: args.number("count")?,
            },
            "remove-rows" => Self::RemoveRows {
                path: args.path()?,
                position: args.number("position")?,
                count: args.number("count")?,
            },
            "action" => Self::Action {
                path: args.path()?,
                action: args.remainder().parse()?,
            },
            _ => {
                return Err(Error::detached(ErrorKind::InvalidCommand {
                    command: command.to_string(),
                }))
            }
        };
        args.finish()?;
        Ok(parsed)
    }
}

impl Command {
    pub const fn path(&self) -> &RowPath {
        match self {
            Self::Set { path, .. }
            | Self::AddAttribute { path, .. }
            | Self::RemoveAttribute { path, .. }
            | Self::InsertRows { path, .. }
            | Self::RemoveRows { path, .. }
            | Self::Action { path, .. }
            | Self::AddChild(path)
            | Self::AddParent(path)
            | Self::Remove(path)
            | Self::Delete(path) => path,
        }
    }

    /// Run against `model`. `Ok(false)` means the model refused the edit.
    pub fn apply<O: ModelObserver>(&self, model: &mut EtreeModel<O>) -> Result<bool> {
        let index = self.path().resolve(model)?;
        let applied = match self {
            Self::Set { column, value, .. } => {
                model.set_data(&index.sibling_column(*column), value, Role::Edit)
            }
            Self::AddAttribute { key, value, .. } => model.add_attribute(&index, key, value),
            Self::RemoveAttribute { key, .. } => model.remove_attribute(&index, key),
            Self::AddChild(_) => model.add_child_element(&index),
            Self::AddParent(_) => model.add_parent_element(&index),
            Self::Remove(_) => model.remove_element(&index),
            Self::Delete(_) => model.delete_element(&index),
            Self::InsertRows {
                position, count, ..
            } => model.insert_rows(*position, *count, &index),
            Self::RemoveRows {
                position, count, ..
            } => model.remove_rows(*position, *count, &index),
            Self::Action { action, .. } => model.trigger(&index, *action),
        };
        Ok(applied)
    }
}

fn line_number(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

/// Parse a whole script, reporting the first bad line
pub fn parse_script(source: &str) -> Result<Vec<Command>> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(n, line)| {
            line.parse::<Command>()
                .map_err(|err| Error::with_message(err.kind().clone(), Span::line(line_number(n)), err.message()))
        })
        .collect()
}

/// Apply commands in order and return how many the model accepted
///
/// Refused edits are logged and skipped. A path that does not resolve
/// stops the run.
#[instrument(skip_all, fields(commands = commands.len()))]
pub fn run<O: ModelObserver>(model: &mut EtreeModel<O>, commands: &[Command]) -> Result<usize> {
    let mut applied = 0;
    for command in commands {
        if command.apply(model)? {
            debug!(?command, "applied");
            applied += 1;
        } else {
            warn!(?command, "refused");
        }
    }
    Ok(applied)
}
