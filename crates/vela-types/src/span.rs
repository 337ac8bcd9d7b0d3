//! Byte-offset source spans attached to unification errors.

use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, end)` into the source text of the
/// compilation unit that requested the unification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Span for engine-internal steps with no source position.
    pub fn dummy() -> Self {
        Span { start: 0, end: 0 }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
