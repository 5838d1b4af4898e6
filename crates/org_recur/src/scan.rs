/// Byte cursor for the ASCII grammars used in scheduling annotations.
///
/// The cursor only ever advances over ASCII bytes, so every position it reports is a valid
/// `str` boundary of the input.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub(crate) fn at(input: &'a str, pos: usize) -> Self {
        Self { input, pos }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    pub(crate) fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + offset).copied()
    }

    pub(crate) fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_str(&mut self, literal: &str) -> bool {
        if self.input[self.pos..].starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    /// Consumes exactly `count` bytes matching `pred`, or nothing at all.
    pub(crate) fn take_exact(&mut self, count: usize, pred: impl Fn(u8) -> bool) -> Option<&'a str> {
        let bytes = self.input.as_bytes();
        let end = self.pos + count;
        if end > bytes.len() || !bytes[self.pos..end].iter().all(|b| pred(*b)) {
            return None;
        }
        let taken = &self.input[self.pos..end];
        self.pos = end;
        Some(taken)
    }

    /// Consumes up to `max` bytes matching `pred`.
    pub(crate) fn take_while_max(&mut self, max: usize, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.pos - start < max {
            match self.peek() {
                Some(b) if pred(b) => self.pos += 1,
                _ => break,
            }
        }
        &self.input[start..self.pos]
    }

    pub(crate) fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        self.take_while_max(usize::MAX, pred)
    }

    pub(crate) fn slice_from(&self, start: usize) -> &'a str {
        &self.input[start..self.pos]
    }
}

pub(crate) fn is_word(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

pub(crate) fn is_digit(byte: u8) -> bool {
    byte.is_ascii_digit()
}
