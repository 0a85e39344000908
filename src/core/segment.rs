//! Four-digit seven-segment multiplexing.
//!
//! Only one digit is lit at a time. Each display tick lights the next digit
//! in a three-step cycle: the cursor value on digit 1, then the tens and
//! units of the turn counter on digits 3 and 4. Digit 2 stays dark.

use super::keypad::{Axis, Cursor};

/// Segment patterns for decimal digits 0–9 (active low).
pub const PATTERNS: [u8; 10] = [
    0b1000_0010,
    0b1110_1110,
    0b0000_0111,
    0b0100_0110,
    0b0110_1010,
    0b0101_0010,
    0b0001_0010,
    0b1110_0110,
    0b0000_0010,
    0b0100_0010,
];

/// Segment cleared on digit 1 while the Y axis is selected.
pub const Y_AXIS_MARK: u8 = 1 << 1;

/// Physical digit positions, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum DigitPosition {
    First,
    Second,
    Third,
    Fourth,
}

/// Raw output lines of the digit display.
pub trait SegmentDisplay {
    /// Lights `position` with `pattern`, turning the other digits off.
    fn show(&mut self, position: DigitPosition, pattern: u8);

    /// Turns every digit off.
    fn blank(&mut self);
}

/// What the multiplexer needs to know about the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplaySnapshot {
    pub playing: bool,
    pub cursor: Cursor,
    pub turns: u8,
}

/// Output of one multiplexer step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitFrame {
    Blank,
    Digit { position: DigitPosition, pattern: u8 },
}

impl DigitFrame {
    /// Writes the frame to the display lines.
    pub fn apply<D: SegmentDisplay + ?Sized>(self, display: &mut D) {
        match self {
            DigitFrame::Blank => display.blank(),
            DigitFrame::Digit { position, pattern } => display.show(position, pattern),
        }
    }
}

fn pattern(digit: u8) -> u8 {
    PATTERNS[(digit % 10) as usize]
}

/// Phase counter driving the digit cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigitMux {
    phase: u8,
}

impl DigitMux {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current step of the cycle, 0..3.
    pub fn phase(&self) -> u8 {
        self.phase
    }

    /// Produces the frame for this tick and advances the cycle. The cycle
    /// keeps running while rendering is suppressed.
    pub fn tick(&mut self, snapshot: &DisplaySnapshot) -> DigitFrame {
        let phase = self.phase;
        self.phase = (self.phase + 1) % 3;
        if !snapshot.playing {
            return DigitFrame::Blank;
        }
        match phase {
            0 => {
                let mut bits = pattern(snapshot.cursor.selected().unwrap_or(0));
                if snapshot.cursor.axis == Axis::Y {
                    bits &= !Y_AXIS_MARK;
                }
                DigitFrame::Digit {
                    position: DigitPosition::First,
                    pattern: bits,
                }
            }
            1 => DigitFrame::Digit {
                position: DigitPosition::Third,
                pattern: pattern(snapshot.turns / 10),
            },
            _ => DigitFrame::Digit {
                position: DigitPosition::Fourth,
                pattern: pattern(snapshot.turns % 10),
            },
        }
    }
}

/// Maps a pattern back to its digit; used by simulated displays.
pub fn decode(pattern: u8) -> Option<u8> {
    PATTERNS
        .iter()
        .position(|&p| p == pattern || p & !Y_AXIS_MARK == pattern)
        .map(|d| d as u8)
}
