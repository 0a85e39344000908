//! Types shared across the kernel: coordinates, outcomes and errors.

use super::bitboard::BitBoardError;
use super::config::BOARD_SIZE;

/// Zero-based board coordinate. Both components are always `< BOARD_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    x: u8,
    y: u8,
}

impl Coord {
    /// Returns `None` when either component is off the board.
    pub const fn new(x: u8, y: u8) -> Option<Self> {
        if x < BOARD_SIZE && y < BOARD_SIZE {
            Some(Self { x, y })
        } else {
            None
        }
    }

    /// Translates 1-based keypad digits into a board coordinate.
    pub fn from_keypad(x_key: u8, y_key: u8) -> Option<Self> {
        Self::new(x_key.checked_sub(1)?, y_key.checked_sub(1)?)
    }

    /// Column.
    pub const fn x(&self) -> u8 {
        self.x
    }

    /// Row.
    pub const fn y(&self) -> u8 {
        self.y
    }

    pub(crate) const fn row_col(&self) -> (usize, usize) {
        (self.y as usize, self.x as usize)
    }
}

/// Result of one resolved turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum ShotOutcome {
    /// First shot on a ship cell, ships remain.
    Hit,
    /// Empty cell, or a cell that was already hit.
    Miss,
    /// Last ship cell sunk.
    Win,
    /// Turn limit exceeded.
    Loss,
}

impl ShotOutcome {
    /// Win and Loss end the game.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ShotOutcome::Win | ShotOutcome::Loss)
    }
}

/// Errors reported by kernel operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// Underlying grid error.
    BitBoardError(BitBoardError),
    /// A shot was requested while no game is in progress.
    NotPlaying,
    /// The map stream ended before 64 cells were accepted.
    IncompleteMap { accepted: u8 },
    /// Keypad digits do not name a board cell.
    InvalidCoordinate { x: u8, y: u8 },
}

impl From<BitBoardError> for KernelError {
    fn from(err: BitBoardError) -> Self {
        KernelError::BitBoardError(err)
    }
}

impl core::fmt::Display for KernelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            KernelError::BitBoardError(e) => write!(f, "BitBoard error: {}", e),
            KernelError::NotPlaying => write!(f, "No game is in progress"),
            KernelError::IncompleteMap { accepted } => {
                write!(f, "Map stream ended after {} of 64 cells", accepted)
            }
            KernelError::InvalidCoordinate { x, y } => {
                write!(f, "Keypad digits ({}, {}) are not a board cell", x, y)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for KernelError {}
