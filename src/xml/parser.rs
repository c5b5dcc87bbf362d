//! XML parser implementation

use indexmap::IndexMap;
use tracing::trace;

use crate::config::ParserConfig;
use crate::error::{Error, ErrorKind, Pos, Result, Span};
use crate::xml::cursor::Cursor;
use crate::xml::element::Element;
use crate::xml::{is_name_char, is_name_start};

/// XML parser producing an owned [`Element`] tree
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    config: ParserConfig,
    input_len: usize,
    depth: u16,
}

impl<'a> Parser<'a> {
    /// Create a new XML parser with default limits
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, ParserConfig::default())
    }

    pub fn with_config(input: &'a [u8], config: ParserConfig) -> Self {
        Self {
            cursor: Cursor::new(input),
            config,
            input_len: input.len(),
            depth: 0,
        }
    }

    /// Parse a document and return its root element
    pub fn parse(&mut self) -> Result<Element> {
        self.config.validate_size(self.input_len)?;
        trace!(bytes = self.input_len, "parsing xml document");

        self.skip_misc()?;
        if self.cursor.is_eof() {
            return Err(self.error_here(ErrorKind::UnexpectedEof));
        }
        let root = self.parse_element()?;
        self.skip_misc()?;

        if !self.cursor.is_eof() {
            return Err(self.error_here(ErrorKind::TrailingContent));
        }
        Ok(root)
    }

    /// Skip whitespace, comments, processing instructions and doctype
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.eat(b"<?") {
                self.expect_terminator(b"?>")?;
            } else if self.cursor.eat(b"<!--") {
                self.expect_terminator(b"-->")?;
            } else if self.cursor.eat(b"<!DOCTYPE") {
                self.skip_doctype()?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_doctype(&mut self) -> Result<()> {
        // internal subsets may contain '>' inside brackets
        let mut in_subset = false;
        while let Some(b) = self.cursor.peek() {
            self.cursor.bump();
            match b {
                b'[' => in_subset = true,
                b']' => in_subset = false,
                b'>' if !in_subset => return Ok(()),
                _ => {}
            }
        }
        Err(self.error_here(ErrorKind::UnexpectedEof))
    }

    fn parse_element(&mut self) -> Result<Element> {
        self.expect(b"<")?;
        self.depth += 1;
        if self.depth > self.config.max_depth {
            return Err(self.error_here(ErrorKind::MaxDepthExceeded {
                max: self.config.max_depth,
            }));
        }

        let tag = self.parse_name()?;
        let attributes = self.parse_attributes()?;
        let mut element = Element {
            tag,
            attributes,
            ..Element::default()
        };

        if self.cursor.eat(b"/>") {
            self.depth -= 1;
            return Ok(element);
        }
        self.expect(b">")?;

        let mut pending = String::new();
        loop {
            if self.cursor.eat(b"</") {
                let found = self.parse_name()?;
                if found != element.tag {
                    return Err(self.error_here(ErrorKind::MismatchedTag {
                        expected: element.tag,
                        found,
                    }));
                }
                self.cursor.skip_whitespace();
                self.expect(b">")?;
                break;
            }

            if self.cursor.eat(b"<!--") {
                self.expect_terminator(b"-->")?;
            } else if self.cursor.eat(b"<![CDATA[") {
                let raw = self.expect_terminator(b"]]>")?;
                pending.push_str(&self.utf8(raw)?);
            } else if self.cursor.eat(b"<?") {
                self.expect_terminator(b"?>")?;
            } else if self.cursor.starts_with(b"<") {
                flush_text(&mut element, &mut pending);
                let child = self.parse_element()?;
                element.children.push(child);
            } else if self.cursor.is_eof() {
                return Err(self.error_here(ErrorKind::UnexpectedEof));
            } else {
                let pos = self.cursor.position();
                let raw = self.cursor.take_while(|b| b != b'<');
                let text = self.utf8(raw)?;
                pending.push_str(&decode_entities(&text, pos)?);
            }
        }
        flush_text(&mut element, &mut pending);

        self.depth -= 1;
        Ok(element)
    }

    fn parse_attributes(&mut self) -> Result<IndexMap<String, String>> {
        let mut attributes = IndexMap::new();

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.peek() {
                Some(b'/' | b'>') => break,
                Some(_) => {}
                None => return Err(self.error_here(ErrorKind::UnexpectedEof)),
            }

            let key_pos = self.cursor.position();
            let key = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect(b"=")?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attributes.contains_key(&key) {
                return Err(Error::at(ErrorKind::DuplicateAttribute { key }, key_pos));
            }
            attributes.insert(key, value);
        }

        Ok(attributes)
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return Err(self.error_here(ErrorKind::InvalidToken)),
        };
        self.cursor.bump();

        let pos = self.cursor.position();
        let Some(raw) = self.cursor.take_until(&[quote]) else {
            return Err(self.error_here(ErrorKind::UnexpectedEof));
        };
        let text = self.utf8(raw)?;
        decode_entities(&text, pos)
    }

    fn parse_name(&mut self) -> Result<String> {
        match self.cursor.peek() {
            Some(b) if is_name_start(b) => {}
            Some(_) => return Err(self.error_here(ErrorKind::InvalidName)),
            None => return Err(self.error_here(ErrorKind::UnexpectedEof)),
        }
        let raw = self.cursor.take_while(is_name_char);
        self.utf8(raw)
    }

    fn expect(&mut self, pattern: &[u8]) -> Result<()> {
        if self.cursor.eat(pattern) {
            Ok(())
        } else if self.cursor.is_eof() {
            Err(self.error_here(ErrorKind::UnexpectedEof))
        } else {
            Err(self.error_here(ErrorKind::InvalidToken))
        }
    }

    fn expect_terminator(&mut self, terminator: &[u8]) -> Result<&'a [u8]> {
        let start = self.cursor.position();
        self.cursor.take_until(terminator).ok_or_else(|| {
            Error::new(
                ErrorKind::UnexpectedEof,
                Span::new(start, self.cursor.position()),
            )
        })
    }

    fn utf8(&self, raw: &[u8]) -> Result<String> {
        std::str::from_utf8(raw)
            .map(str::to_string)
            .map_err(|_| self.error_here(ErrorKind::InvalidUtf8))
    }

    fn error_here(&self, kind: ErrorKind) -> Error {
        Error::at(kind, self.cursor.position())
    }
}

/// Attach accumulated character data as the element's text, or as the tail
/// of its last child.
fn flush_text(element: &mut Element, pending: &mut String) {
    if pending.trim().is_empty() {
        pending.clear();
        return;
    }
    let text = std::mem::take(pending);
    let slot = match element.children.last_mut() {
        Some(child) => &mut child.tail,
        None => &mut element.text,
    };
    match slot {
        Some(existing) => existing.push_str(&text),
        None => *slot = Some(text),
    }
}

fn decode_entities(input: &str, pos: Pos) -> Result<String> {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        let (before, after) = rest.split_at(amp);
        result.push_str(before);
        let Some(semi) = after.find(';') else {
            return Err(Error::at(
                ErrorKind::InvalidEntity {
                    entity: after.trim_start_matches('&').to_string(),
                },
                pos,
            ));
        };
        let entity = after.get(1..semi).unwrap_or_default();
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => decode_numeric_entity(entity),
        };
        match decoded {
            Some(ch) => result.push(ch),
            None => {
                return Err(Error::at(
                    ErrorKind::InvalidEntity {
                        entity: entity.to_string(),
                    },
                    pos,
                ))
            }
        }
        rest = after.get(semi + 1..).unwrap_or_default();
    }
    result.push_str(rest);
    Ok(result)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}
