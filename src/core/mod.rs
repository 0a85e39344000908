//! Hardware-independent kernel logic (no_std compatible).
//!
//! Everything here is plain data and pure transitions over it; the only
//! hardware contact is through the `embedded-hal` pin traits and the small
//! display traits defined alongside the code that drives them.

pub mod bitboard;
pub mod common;
pub mod config;
pub mod feedback;
pub mod keypad;
pub mod loader;
pub mod render;
pub mod resolver;
pub mod segment;
pub mod session;

pub use bitboard::{BitBoard, BitBoardError};
pub use common::{Coord, KernelError, ShotOutcome};
pub use config::*;
pub use feedback::{FeedbackDriver, FeedbackSequence, FeedbackTarget};
pub use keypad::{scan, Axis, Cursor, Debouncer, KeyMatrix, PinMatrix};
pub use loader::{map_bytes, parse_map, BoardLoader};
pub use render::Surface;
pub use resolver::resolve;
pub use segment::{DigitFrame, DigitMux, DigitPosition, DisplaySnapshot, SegmentDisplay, PATTERNS};
pub use session::{GameResult, GameSession, Phase, PhaseEvent, TriggerAction};
