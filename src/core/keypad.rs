//! 3×3 keypad scanning, debounce and cursor selection.
//!
//! The pad has three drive lines and three sense lines. Driving one line
//! low exposes one column of keys on the sense lines; key codes are laid
//! out so that drive line `d` and sense line `s` give `d + 1 + 3 * s`.

use embedded_hal::digital::{InputPin, OutputPin};

use super::config::{AXIS_TOGGLE_KEY, KEY_DEBOUNCE_MS};

/// Number of drive (and sense) lines.
pub const LINES: usize = 3;

/// Access to the raw switch matrix.
pub trait KeyMatrix {
    /// Activates drive line `line`, releasing the other two.
    fn drive(&mut self, line: usize);

    /// True if sense line `line` reads a closed switch.
    fn sense(&mut self, line: usize) -> bool;
}

/// Returns the first pressed key code (1–9) in scan order, or 0.
pub fn scan<M: KeyMatrix + ?Sized>(matrix: &mut M) -> u8 {
    for drive in 0..LINES {
        matrix.drive(drive);
        for sense in 0..LINES {
            if matrix.sense(sense) {
                return (drive + 1 + LINES * sense) as u8;
            }
        }
    }
    0
}

/// Switch matrix on GPIO pins. Lines are active low: the driven line is
/// pulled low and a closed switch pulls its sense line low.
pub struct PinMatrix<D, S> {
    drive: [D; LINES],
    sense: [S; LINES],
}

impl<D: OutputPin, S: InputPin> PinMatrix<D, S> {
    pub fn new(drive: [D; LINES], sense: [S; LINES]) -> Self {
        Self { drive, sense }
    }

    /// Gives the pins back.
    pub fn release(self) -> ([D; LINES], [S; LINES]) {
        (self.drive, self.sense)
    }
}

impl<D: OutputPin, S: InputPin> KeyMatrix for PinMatrix<D, S> {
    fn drive(&mut self, line: usize) {
        for (i, pin) in self.drive.iter_mut().enumerate() {
            let res = if i == line { pin.set_low() } else { pin.set_high() };
            if let Err(e) = res {
                log::warn!("keypad: drive line {} failed: {:?}", i, e);
            }
        }
    }

    fn sense(&mut self, line: usize) -> bool {
        match self.sense.get_mut(line).map(|pin| pin.is_low()) {
            Some(Ok(pressed)) => pressed,
            Some(Err(e)) => {
                log::warn!("keypad: sense line {} failed: {:?}", line, e);
                false
            }
            None => false,
        }
    }
}

/// Wall-clock debounce: a key is accepted only if no key was accepted in
/// the preceding window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debouncer {
    window_ms: u64,
    last_accept_ms: Option<u64>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(KEY_DEBOUNCE_MS)
    }
}

impl Debouncer {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last_accept_ms: None,
        }
    }

    /// Records a press at `now_ms` and reports whether it counts.
    pub fn accept(&mut self, now_ms: u64) -> bool {
        match self.last_accept_ms {
            Some(last) if now_ms.saturating_sub(last) < self.window_ms => false,
            _ => {
                self.last_accept_ms = Some(now_ms);
                true
            }
        }
    }
}

/// Which coordinate the next digit key sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    #[default]
    X,
    Y,
}

impl Axis {
    pub fn toggled(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// Axis selector plus the two keypad digits entered so far (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Cursor {
    pub axis: Axis,
    pub x: Option<u8>,
    pub y: Option<u8>,
}

impl Cursor {
    /// Applies one accepted key code.
    pub fn apply_key(&mut self, key: u8) {
        match key {
            0 => {}
            AXIS_TOGGLE_KEY => self.axis = self.axis.toggled(),
            digit => match self.axis {
                Axis::X => self.x = Some(digit),
                Axis::Y => self.y = Some(digit),
            },
        }
    }

    /// Value entered for the active axis.
    pub fn selected(&self) -> Option<u8> {
        match self.axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Both coordinates entered.
    pub fn is_complete(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }

    /// Back to (X, none, none).
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pad {
        pressed: Option<u8>,
        driven: usize,
    }

    impl KeyMatrix for Pad {
        fn drive(&mut self, line: usize) {
            self.driven = line;
        }
        fn sense(&mut self, line: usize) -> bool {
            self.pressed == Some((self.driven + 1 + LINES * line) as u8)
        }
    }

    #[test]
    fn every_key_scans_to_its_code() {
        for key in 1..=9 {
            let mut pad = Pad {
                pressed: Some(key),
                driven: 0,
            };
            assert_eq!(scan(&mut pad), key);
        }
        let mut idle = Pad {
            pressed: None,
            driven: 0,
        };
        assert_eq!(scan(&mut idle), 0);
    }

    #[test]
    fn debounce_window() {
        let mut d = Debouncer::new(50);
        assert!(d.accept(1_000));
        assert!(!d.accept(1_049));
        assert!(d.accept(1_050));
    }

    #[test]
    fn toggle_key_switches_axis() {
        let mut cursor = Cursor::default();
        cursor.apply_key(3);
        cursor.apply_key(AXIS_TOGGLE_KEY);
        cursor.apply_key(5);
        cursor.apply_key(6);
        assert_eq!(cursor.axis, Axis::Y);
        assert_eq!((cursor.x, cursor.y), (Some(3), Some(6)));
        assert_eq!(cursor.selected(), Some(6));
        assert!(cursor.is_complete());
        cursor.clear();
        assert_eq!(cursor, Cursor::default());
    }
}
