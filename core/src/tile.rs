use serde::{Deserialize, Serialize};

/// Player-visible state of a single board cell.
///
/// `Mine` doubles as the wrong-flag marker: a revealed mine and a
/// misplaced flag render with the same glyph, a deliberate ambiguity in
/// the display contract.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Hidden,
    Open(u8),
    Flagged,
    Mine,
}

impl Tile {
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open(_))
    }

    /// Display character for the textual grid.
    pub const fn symbol(self) -> char {
        match self {
            Self::Hidden => '?',
            Self::Open(0) => ' ',
            Self::Open(count) => (b'0' + count) as char,
            Self::Flagged => 'X',
            Self::Mine => 'X',
        }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::Hidden
    }
}
