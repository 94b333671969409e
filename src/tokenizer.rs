// src/tokenizer.rs

/// Splits a name into non-empty tokens. Any character of `separators` ends a
/// token, and runs of separators never produce empty tokens.
pub struct Tokenizer<'a> {
    s: &'a str,
    separators: &'a str,
    i: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(s: &'a str, separators: &'a str) -> Self {
        Self { s, separators, i: 0 }
    }

    /// Counts separator characters in the whole input, including leading,
    /// trailing and repeated ones.
    pub fn separator_count(&self) -> usize {
        self.s.chars().filter(|c| self.is_separator(*c)).count()
    }

    pub fn skip_separators(&mut self) {
        while let Some(c) = self.peek_char() {
            if self.is_separator(c) {
                self.i += c.len_utf8();
            } else {
                break;
            }
        }
    }

    pub fn next_token(&mut self) -> Option<&'a str> {
        self.skip_separators();
        if self.eof() {
            return None;
        }
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if self.is_separator(c) {
                break;
            }
            self.i += c.len_utf8();
        }
        Some(&self.s[start..self.i])
    }

    pub fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    fn is_separator(&self, c: char) -> bool {
        self.separators.contains(c)
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}
