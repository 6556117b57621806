//! Forward-only cursor over the physical lines of a definition.
//!
//! Every header handler in the parser works through this cursor instead of
//! raw index arithmetic. The cursor never moves backwards, so each line is
//! visited a bounded number of times.

/// A cursor over the lines of a definition text.
///
/// Lines are split on `\n` and kept verbatim; callers trim where they
/// compare. The cursor points at the next line to be examined.
#[derive(Debug, Clone)]
pub struct LineCursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> LineCursor<'a> {
    /// Create a cursor positioned at the first line of `text`.
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.split('\n').collect(),
            pos: 0,
        }
    }

    /// Index of the line the cursor points at.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total number of physical lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always `false`: even empty text splits into one blank line.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// `true` once every line has been passed.
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.lines.len()
    }

    /// All lines, independent of the cursor position.
    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    /// The untrimmed line under the cursor.
    pub fn current(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    /// Step past the current line.
    pub fn advance(&mut self) {
        self.advance_to(self.pos + 1);
    }

    /// Move the cursor to `index`, clamped to the end of input.
    ///
    /// Requests to move backwards are ignored.
    pub fn advance_to(&mut self, index: usize) {
        let target = index.min(self.lines.len());
        if target > self.pos {
            self.pos = target;
        }
    }

    /// Move the cursor past the last line.
    pub fn finish(&mut self) {
        self.pos = self.lines.len();
    }

    /// Find the next line at or after the cursor whose trimmed text is not
    /// empty, without moving the cursor.
    ///
    /// Returns the line index and its trimmed text.
    pub fn peek_non_blank(&self) -> Option<(usize, &'a str)> {
        self.peek_trimmed(|line| !line.is_empty())
    }

    /// Find the first line at or after the cursor whose trimmed text
    /// satisfies `accept`, without moving the cursor.
    pub fn peek_trimmed<P>(&self, accept: P) -> Option<(usize, &'a str)>
    where
        P: Fn(&str) -> bool,
    {
        self.lines[self.pos..]
            .iter()
            .enumerate()
            .map(|(offset, line)| (self.pos + offset, line.trim()))
            .find(|(_, line)| accept(line))
    }

    /// Take lines from the cursor until `stop` matches an untrimmed line.
    ///
    /// The matching line is not consumed: the cursor is left on it, or at
    /// the end of input when nothing matched. Returned lines are untrimmed.
    pub fn consume_until<P>(&mut self, stop: P) -> Vec<&'a str>
    where
        P: Fn(&str) -> bool,
    {
        let mut taken = Vec::new();
        while let Some(line) = self.current() {
            if stop(line) {
                break;
            }
            taken.push(line);
            self.pos += 1;
        }
        taken
    }
}
