//! Byte cursor with line/column tracking for the XML parser

use crate::error::Pos;

#[derive(Clone, Debug)]
pub(crate) struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
}

impl<'a> Cursor<'a> {
    pub(crate) const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Current byte without consuming
    pub(crate) fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub(crate) const fn position(&self) -> Pos {
        Pos::new(self.pos, self.line, self.col)
    }

    pub(crate) fn bump(&mut self) {
        if let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'\n' {
                self.line += 1;
                self.col = 1;
            } else if b & 0xC0 != 0x80 {
                // continuation bytes of a multi-byte char don't start a column
                self.col += 1;
            }
        }
    }

    pub(crate) fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    pub(crate) fn starts_with(&self, pattern: &[u8]) -> bool {
        self.input
            .get(self.pos..)
            .is_some_and(|rest| rest.starts_with(pattern))
    }

    /// Consume `pattern` if the input continues with it
    pub(crate) fn eat(&mut self, pattern: &[u8]) -> bool {
        if self.starts_with(pattern) {
            self.bump_n(pattern.len());
            true
        } else {
            false
        }
    }

    /// Consume bytes while `pred` holds and return them
    pub(crate) fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a [u8] {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if !pred(b) {
                break;
            }
            self.bump();
        }
        self.input.get(start..self.pos).unwrap_or_default()
    }

    /// Consume up to and including `terminator`, returning the bytes before it.
    /// Returns `None` (with the cursor at EOF) if the terminator never occurs.
    pub(crate) fn take_until(&mut self, terminator: &[u8]) -> Option<&'a [u8]> {
        let start = self.pos;
        while !self.is_eof() {
            if self.starts_with(terminator) {
                let body = self.input.get(start..self.pos);
                self.bump_n(terminator.len());
                return body;
            }
            self.bump();
        }
        None
    }

    pub(crate) fn skip_whitespace(&mut self) {
        self.take_while(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'));
    }
}
