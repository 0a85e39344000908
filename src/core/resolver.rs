//! Turn resolution.

use super::common::{Coord, ShotOutcome};
use super::config::{CellMap, MAX_TURNS};

/// Resolves one shot at `target`.
///
/// The turn is counted before anything else, and a turn past the limit is
/// a loss that leaves `shots` untouched. Repeat shots on a hit cell are
/// misses. Win detection rescans the whole board after every fresh hit.
pub fn resolve(ships: &CellMap, shots: &mut CellMap, turns: &mut u8, target: Coord) -> ShotOutcome {
    *turns = turns.saturating_add(1);
    if *turns > MAX_TURNS {
        return ShotOutcome::Loss;
    }

    let (row, col) = target.row_col();
    let ship = ships.get(row, col).unwrap_or(false);
    let already_shot = shots.get(row, col).unwrap_or(false);
    if !ship || already_shot {
        return ShotOutcome::Miss;
    }

    if shots.set(row, col).is_err() {
        return ShotOutcome::Miss;
    }
    if ships.iter_set().any(|(r, c)| !shots.get(r, c).unwrap_or(false)) {
        ShotOutcome::Hit
    } else {
        ShotOutcome::Win
    }
}
