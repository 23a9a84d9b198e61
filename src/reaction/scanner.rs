use super::error::ReactionSmilesError;

/// Character reader over the reaction text with one character of
/// lookahead.
///
/// Positions are character offsets, not byte offsets.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().collect(),
            pos: 0,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn look_next(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    pub fn read_char(&mut self, context: &'static str) -> Result<char, ReactionSmilesError> {
        let c = self
            .look_next()
            .ok_or(ReactionSmilesError::UnexpectedEnd { context })?;
        self.pos += 1;
        Ok(c)
    }

    pub fn skip(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.chars.len());
    }

    /// Consumes `expected` if it is next.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.look_next() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Reads one decimal digit, if the next character is one.
    pub fn read_digit(&mut self) -> Option<u32> {
        let d = self.look_next()?.to_digit(10)?;
        self.pos += 1;
        Some(d)
    }

    /// Reads one or more decimal digits.
    ///
    /// No digit at all is a [`ReactionSmilesError::MalformedDirective`] for
    /// `directive`; a value that does not fit `usize` is
    /// [`ReactionSmilesError::NumberTooLarge`].
    pub fn read_unsigned(&mut self, directive: char) -> Result<usize, ReactionSmilesError> {
        let start = self.pos;
        let mut value: Option<usize> = Some(0);
        while let Some(d) = self.read_digit() {
            value = value
                .and_then(|v| v.checked_mul(10))
                .and_then(|v| v.checked_add(d as usize));
        }
        if self.pos == start {
            return Err(ReactionSmilesError::MalformedDirective {
                directive,
                pos: start,
                expected: "number",
                found: self.look_next(),
            });
        }
        value.ok_or(ReactionSmilesError::NumberTooLarge {
            directive,
            pos: start,
        })
    }

    /// Returns the text up to the first of `stops` (or the end) and the stop
    /// character, which is consumed.
    pub fn take_until(&mut self, stops: &[char]) -> (&'a str, Option<char>) {
        let start = self.byte_offset(self.pos);
        while let Some(c) = self.look_next() {
            if stops.contains(&c) {
                let text = &self.input[start..self.byte_offset(self.pos)];
                self.pos += 1;
                return (text, Some(c));
            }
            self.pos += 1;
        }
        (&self.input[start..], None)
    }

    fn byte_offset(&self, pos: usize) -> usize {
        self.chars
            .get(pos)
            .map_or(self.input.len(), |&(offset, _)| offset)
    }
}
