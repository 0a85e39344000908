//! Game phase machine and the session aggregate.
//!
//! Every gameplay decision is a function of the current [`Phase`] and an
//! event. [`GameSession`] owns the maps, counters and cursor and is only
//! ever mutated from the foreground loop.

use super::common::{Coord, KernelError, ShotOutcome};
use super::config::CellMap;
use super::keypad::Cursor;
use super::resolver;

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum GameResult {
    Won,
    Lost,
}

/// Top-level game phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Ship map still arriving on the serial line
    #[default]
    Loading,
    /// Map complete, waiting for the first confirm press
    AwaitingStart,
    /// Turns are being played
    Playing,
    /// Game finished; a confirm press starts a new one
    GameOver(GameResult),
}

/// Events that move the phase machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    /// The loader has accepted all 64 cells
    MapLoaded,
    /// Confirm pressed to start play
    Start,
    /// A resolved turn ended the game
    Finished(GameResult),
    /// Confirm pressed after the game ended
    Reset,
}

impl Phase {
    pub fn is_playing(&self) -> bool {
        matches!(self, Phase::Playing)
    }

    pub fn is_over(&self) -> bool {
        matches!(self, Phase::GameOver(_))
    }

    /// Next phase for `event`; unknown combinations keep the current phase.
    pub fn transition(self, event: PhaseEvent) -> Self {
        use Phase::*;
        use PhaseEvent::*;

        match (self, event) {
            (Loading, MapLoaded) => AwaitingStart,
            (AwaitingStart, Start) => Playing,
            (Playing, Finished(result)) => GameOver(result),
            (GameOver(_), Reset) => Playing,
            _ => self,
        }
    }

    /// Compact encoding for publishing through a single atomic byte.
    pub fn to_u8(self) -> u8 {
        match self {
            Phase::Loading => 0,
            Phase::AwaitingStart => 1,
            Phase::Playing => 2,
            Phase::GameOver(GameResult::Won) => 3,
            Phase::GameOver(GameResult::Lost) => 4,
        }
    }

    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Phase::AwaitingStart,
            2 => Phase::Playing,
            3 => Phase::GameOver(GameResult::Won),
            4 => Phase::GameOver(GameResult::Lost),
            _ => Phase::Loading,
        }
    }
}

/// What a confirm press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum TriggerAction {
    /// Nothing applicable in the current phase.
    Ignored,
    /// Play started.
    Started,
    /// Both coordinates were set; a turn is pending.
    TurnQueued,
    /// Finished game cleared; play restarts on the same map.
    Reset,
}

/// All game state, owned by the foreground loop.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameSession {
    ships: CellMap,
    shots: CellMap,
    turns: u8,
    cursor: Cursor,
    phase: Phase,
    turn_pending: bool,
}

impl GameSession {
    /// Session still waiting for its map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Session with a complete map, waiting for the start press.
    pub fn with_map(ships: CellMap) -> Self {
        let mut session = Self::new();
        session.load_map(ships);
        session
    }

    /// Installs the loaded map. Only effective while loading.
    pub fn load_map(&mut self, ships: CellMap) {
        if self.phase == Phase::Loading {
            self.ships = ships;
            self.phase = self.phase.transition(PhaseEvent::MapLoaded);
            log::info!("session: map loaded with {} ship cells", ships.count_ones());
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn ships(&self) -> &CellMap {
        &self.ships
    }

    pub fn shots(&self) -> &CellMap {
        &self.shots
    }

    pub fn turns(&self) -> u8 {
        self.turns
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn turn_pending(&self) -> bool {
        self.turn_pending
    }

    /// Applies an accepted keypad code. Ignored unless playing.
    pub fn press_key(&mut self, key: u8) -> bool {
        if !self.phase.is_playing() || key == 0 {
            return false;
        }
        self.cursor.apply_key(key);
        true
    }

    /// Confirm-button handling: start latch, then turn trigger, then reset.
    /// Exactly one of them applies per press.
    pub fn on_trigger(&mut self) -> TriggerAction {
        match self.phase {
            Phase::Loading => TriggerAction::Ignored,
            Phase::AwaitingStart => {
                self.start();
                TriggerAction::Started
            }
            Phase::Playing => {
                if self.cursor.is_complete() {
                    self.turn_pending = true;
                    TriggerAction::TurnQueued
                } else {
                    TriggerAction::Ignored
                }
            }
            Phase::GameOver(_) => {
                self.reset();
                TriggerAction::Reset
            }
        }
    }

    /// Enters play with a fresh shot map.
    pub fn start(&mut self) {
        self.shots.clear_all();
        self.turns = 0;
        self.cursor.clear();
        self.turn_pending = false;
        self.phase = self.phase.transition(PhaseEvent::Start);
    }

    /// Clears a finished game; the ship map is kept.
    pub fn reset(&mut self) {
        self.shots.clear_all();
        self.turns = 0;
        self.cursor.clear();
        self.turn_pending = false;
        self.phase = self.phase.transition(PhaseEvent::Reset);
    }

    /// Resolves the pending turn from the cursor, if any, and clears the
    /// cursor. Returns the target and outcome.
    pub fn take_pending_turn(&mut self) -> Option<Result<(Coord, ShotOutcome), KernelError>> {
        if !self.turn_pending {
            return None;
        }
        self.turn_pending = false;
        let cursor = self.cursor;
        self.cursor.clear();
        let (x, y) = (cursor.x.unwrap_or(0), cursor.y.unwrap_or(0));
        let result = match Coord::from_keypad(x, y) {
            Some(target) => self.fire(target).map(|outcome| (target, outcome)),
            None => Err(KernelError::InvalidCoordinate { x, y }),
        };
        Some(result)
    }

    /// Fires at `target`. Refused outside of play so that a finished game
    /// cannot keep counting turns.
    pub fn fire(&mut self, target: Coord) -> Result<ShotOutcome, KernelError> {
        if !self.phase.is_playing() {
            return Err(KernelError::NotPlaying);
        }
        let outcome = resolver::resolve(&self.ships, &mut self.shots, &mut self.turns, target);
        match outcome {
            ShotOutcome::Win => {
                self.phase = self.phase.transition(PhaseEvent::Finished(GameResult::Won))
            }
            ShotOutcome::Loss => {
                self.phase = self.phase.transition(PhaseEvent::Finished(GameResult::Lost))
            }
            ShotOutcome::Hit | ShotOutcome::Miss => {}
        }
        Ok(outcome)
    }

    /// Cells hit so far (shot and holding a ship).
    pub fn hits(&self) -> CellMap {
        self.ships & self.shots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_walk() {
        let p = Phase::Loading;
        assert_eq!(p.transition(PhaseEvent::Reset), Phase::Loading);
        assert_eq!(p.transition(PhaseEvent::Start), Phase::Loading);
        let p = p.transition(PhaseEvent::MapLoaded);
        assert_eq!(p, Phase::AwaitingStart);
        let p = p.transition(PhaseEvent::Start);
        assert_eq!(p, Phase::Playing);
        assert_eq!(p.transition(PhaseEvent::Start), Phase::Playing);
        let p = p.transition(PhaseEvent::Finished(GameResult::Lost));
        assert_eq!(p, Phase::GameOver(GameResult::Lost));
        assert_eq!(p.transition(PhaseEvent::Reset), Phase::Playing);
    }

    #[test]
    fn phase_byte_encoding() {
        for p in [
            Phase::Loading,
            Phase::AwaitingStart,
            Phase::Playing,
            Phase::GameOver(GameResult::Won),
            Phase::GameOver(GameResult::Lost),
        ] {
            assert_eq!(Phase::from_u8(p.to_u8()), p);
        }
    }

    #[test]
    fn trigger_before_map_is_ignored() {
        let mut s = GameSession::new();
        assert_eq!(s.on_trigger(), TriggerAction::Ignored);
        assert_eq!(s.phase(), Phase::Loading);
    }

    #[test]
    fn keys_ignored_before_start() {
        let mut s = GameSession::with_map(CellMap::from_cells([(0, 0)]).unwrap());
        assert!(!s.press_key(3));
        assert_eq!(s.cursor().x, None);
    }

    #[test]
    fn incomplete_cursor_does_not_queue() {
        let mut s = GameSession::with_map(CellMap::from_cells([(0, 0)]).unwrap());
        assert_eq!(s.on_trigger(), TriggerAction::Started);
        s.press_key(2);
        assert_eq!(s.on_trigger(), TriggerAction::Ignored);
        assert!(s.take_pending_turn().is_none());
    }

    #[test]
    fn queued_turn_uses_keypad_digits() {
        let mut s = GameSession::with_map(CellMap::from_cells([(1, 2)]).unwrap());
        s.on_trigger();
        s.press_key(3);
        s.press_key(9);
        s.press_key(2);
        assert_eq!(s.on_trigger(), TriggerAction::TurnQueued);
        let (target, outcome) = s.take_pending_turn().unwrap().unwrap();
        assert_eq!((target.x(), target.y()), (2, 1));
        assert_eq!(outcome, ShotOutcome::Win);
        assert_eq!(*s.cursor(), Cursor::default());
        assert_eq!(s.phase(), Phase::GameOver(GameResult::Won));
    }

    #[test]
    fn fire_refused_after_game_over() {
        let mut s = GameSession::with_map(CellMap::from_cells([(0, 0)]).unwrap());
        s.start();
        let origin = Coord::new(0, 0).unwrap();
        assert_eq!(s.fire(origin), Ok(ShotOutcome::Win));
        assert_eq!(s.fire(origin), Err(KernelError::NotPlaying));
        assert_eq!(s.turns(), 1);
    }
}
