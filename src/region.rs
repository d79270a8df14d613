use std::ops::Range;

/// Byte range of a node within the Jade source it was parsed from.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct Region {
    /// The beginning of the range, inclusive.
    pub begin: usize,
    /// The ending of the range, exclusive.
    pub end: usize,
}

impl Region {
    /// Create a new [`Region`] from the given range.
    pub fn new(position: Range<usize>) -> Self {
        Self {
            begin: position.start,
            end: position.end,
        }
    }

    /// Return the text covered by this [`Region`], or `None` when the
    /// region does not fall on character boundaries inside `source`.
    pub fn literal<'source>(&self, source: &'source str) -> Option<&'source str> {
        source.get(self.begin..self.end)
    }
}

impl From<Range<usize>> for Region {
    fn from(value: Range<usize>) -> Self {
        Self::new(value)
    }
}
