//! State shared between the foreground loop and the interrupt tasks.
//!
//! Every field is a single word-sized atomic with exactly one writer, so no
//! reader can observe a half-applied multi-field update:
//!
//! | field                       | writer          | readers                 |
//! |-----------------------------|-----------------|-------------------------|
//! | `ship_bits`, `bytes_loaded` | serial task     | foreground loop         |
//! | `phase`, `turns`, cursor    | foreground loop | display task, operators |
//! | `blink`, `beep`             | set: foreground, clear: feedback task     |
//!
//! The ship bits are stored before the count that publishes them, so a
//! reader that sees 64 accepted bytes also sees the complete map.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};

use crate::core::{
    Axis, BoardLoader, CellMap, Cursor, DisplaySnapshot, GameSession, Phase, MAP_BYTES,
};

const UNSET: u8 = 0;

#[derive(Debug, Default)]
pub struct SharedState {
    ship_bits: AtomicU64,
    bytes_loaded: AtomicU8,
    phase: AtomicU8,
    turns: AtomicU8,
    axis_y: AtomicBool,
    cursor_x: AtomicU8,
    cursor_y: AtomicU8,
    blink: AtomicBool,
    beep: AtomicBool,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    // serial task side

    /// Publishes the loader's progress.
    pub fn publish_loader(&self, loader: &BoardLoader) {
        self.ship_bits
            .store(loader.ship_map().into_raw(), Ordering::Release);
        self.bytes_loaded.store(loader.accepted(), Ordering::Release);
    }

    pub fn bytes_loaded(&self) -> u8 {
        self.bytes_loaded.load(Ordering::Acquire)
    }

    pub fn map_complete(&self) -> bool {
        self.bytes_loaded() >= MAP_BYTES
    }

    pub fn ship_map(&self) -> CellMap {
        CellMap::from_raw(self.ship_bits.load(Ordering::Acquire))
    }

    // foreground side

    /// Publishes the fields the display and operators read.
    pub fn publish_session(&self, session: &GameSession) {
        let cursor = session.cursor();
        self.turns.store(session.turns(), Ordering::Release);
        self.cursor_x.store(cursor.x.unwrap_or(UNSET), Ordering::Release);
        self.cursor_y.store(cursor.y.unwrap_or(UNSET), Ordering::Release);
        self.axis_y.store(cursor.axis == Axis::Y, Ordering::Release);
        self.phase.store(session.phase().to_u8(), Ordering::Release);
    }

    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub fn turns(&self) -> u8 {
        self.turns.load(Ordering::Acquire)
    }

    pub fn cursor(&self) -> Cursor {
        let slot = |v: u8| (v != UNSET).then_some(v);
        Cursor {
            axis: if self.axis_y.load(Ordering::Acquire) {
                Axis::Y
            } else {
                Axis::X
            },
            x: slot(self.cursor_x.load(Ordering::Acquire)),
            y: slot(self.cursor_y.load(Ordering::Acquire)),
        }
    }

    /// Field-by-field read for the display tick. Fields may come from
    /// different foreground iterations; each one is valid on its own.
    pub fn display_snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot {
            playing: self.phase().is_playing(),
            cursor: self.cursor(),
            turns: self.turns(),
        }
    }

    // feedback flags

    pub fn arm_blink(&self) {
        self.blink.store(true, Ordering::Release);
    }

    pub fn arm_beep(&self) {
        self.beep.store(true, Ordering::Release);
    }

    pub fn blink_armed(&self) -> bool {
        self.blink.load(Ordering::Acquire)
    }

    pub fn beep_armed(&self) -> bool {
        self.beep.load(Ordering::Acquire)
    }

    pub fn finish_blink(&self) {
        self.blink.store(false, Ordering::Release);
    }

    pub fn finish_beep(&self) {
        self.beep.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AXIS_TOGGLE_KEY;

    #[test]
    fn loader_progress_is_visible() {
        let shared = SharedState::new();
        let mut loader = BoardLoader::new();
        loader.feed(b'1');
        shared.publish_loader(&loader);
        assert_eq!(shared.bytes_loaded(), 1);
        assert!(!shared.map_complete());
        assert!(shared.ship_map().get(0, 0).unwrap());
    }

    #[test]
    fn session_fields_round_trip() {
        let shared = SharedState::new();
        let mut session = GameSession::with_map(CellMap::from_cells([(0, 0)]).unwrap());
        session.on_trigger();
        session.press_key(4);
        session.press_key(AXIS_TOGGLE_KEY);
        shared.publish_session(&session);
        assert_eq!(shared.phase(), Phase::Playing);
        assert_eq!(shared.cursor(), *session.cursor());
        let snap = shared.display_snapshot();
        assert!(snap.playing);
        assert_eq!(snap.cursor.selected(), None);
    }
}
