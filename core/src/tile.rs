use serde::{Deserialize, Serialize};

/// Player-visible state of a single tile, as stored in the session grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileState {
    Hidden,
    /// Revealed safe tile carrying its adjacent-mine count for display.
    Revealed(u8),
    Flagged,
}

impl TileState {
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }

    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed(_))
    }
}

impl Default for TileState {
    fn default() -> Self {
        Self::Hidden
    }
}
