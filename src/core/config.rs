//! Fixed game parameters and default timings.

use super::bitboard::BitBoard;

/// Side length of the board.
pub const BOARD_SIZE: u8 = 8;
/// Accepted serial bytes needed to fill the ship map.
pub const MAP_BYTES: u8 = BOARD_SIZE * BOARD_SIZE;
/// Turns allowed per game; the turn after this one is a loss.
pub const MAX_TURNS: u8 = 16;

/// Keypad code that toggles the X/Y axis instead of entering a digit.
pub const AXIS_TOGGLE_KEY: u8 = 9;

/// Toggles per hit blink of the LED.
pub const BLINK_BUDGET: u8 = 6;
/// Toggles per end-of-game beep of the buzzer.
pub const BEEP_BUDGET: u8 = 10;

/// Digit refresh period (one digit per tick).
pub const DISPLAY_PERIOD_MS: u64 = 5;
/// Half period of the LED and buzzer sequences.
pub const FEEDBACK_PERIOD_MS: u64 = 330;
/// Foreground poll period.
pub const POLL_PERIOD_MS: u64 = 1;
/// Minimum spacing between two accepted keypad presses.
pub const KEY_DEBOUNCE_MS: u64 = 50;
/// Sampling window of the confirm button's hardware debounce.
pub const BUTTON_DEBOUNCE_MS: u64 = 340;

/// Packed 8×8 cell map shared by the ship and shot maps.
pub type CellMap = BitBoard<u64, { BOARD_SIZE as usize }>;
