use battleship_kernel::{
    map_bytes, parse_map, resolve, CellMap, Coord, GameResult, GameSession, Phase, ShotOutcome,
    BOARD_SIZE, MAX_TURNS,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn coord() -> impl Strategy<Value = Coord> {
    (0..BOARD_SIZE, 0..BOARD_SIZE).prop_map(|(x, y)| Coord::new(x, y).unwrap())
}

fn cell(target: Coord) -> (usize, usize) {
    (target.y() as usize, target.x() as usize)
}

fn fleet(max: usize) -> impl Strategy<Value = BTreeSet<(u8, u8)>> {
    prop::collection::btree_set((0..BOARD_SIZE, 0..BOARD_SIZE), 1..=max)
}

fn map_of(cells: &BTreeSet<(u8, u8)>) -> CellMap {
    CellMap::from_cells(cells.iter().map(|&(x, y)| (y as usize, x as usize))).unwrap()
}

fn playing(ships: CellMap) -> GameSession {
    let mut session = GameSession::with_map(ships);
    session.start();
    session
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Shooting water is a miss and leaves the shot map alone.
    #[test]
    fn empty_cell_is_a_miss(raw in any::<u64>(), target in coord(), turns in 0..MAX_TURNS) {
        let ships = CellMap::from_raw(raw);
        let (row, col) = cell(target);
        prop_assume!(!ships.get(row, col).unwrap());

        let mut shots = CellMap::new();
        let mut t = turns;
        prop_assert_eq!(resolve(&ships, &mut shots, &mut t, target), ShotOutcome::Miss);
        prop_assert!(shots.is_empty());
        prop_assert_eq!(t, turns + 1);
    }

    /// A second shot at the same cell never changes the shot map.
    #[test]
    fn repeat_shot_is_a_miss(raw in any::<u64>(), target in coord()) {
        let ships = CellMap::from_raw(raw);
        let mut shots = CellMap::new();
        let mut turns = 0;
        resolve(&ships, &mut shots, &mut turns, target);
        let after_first = shots;

        prop_assert_eq!(resolve(&ships, &mut shots, &mut turns, target), ShotOutcome::Miss);
        prop_assert_eq!(shots, after_first);
        prop_assert_eq!(turns, 2);
    }

    /// Every call past the turn limit is a loss, whatever the target.
    #[test]
    fn seventeenth_call_loses(raw in any::<u64>(), targets in prop::collection::vec(coord(), 17)) {
        let ships = CellMap::from_raw(raw);
        let mut shots = CellMap::new();
        let mut turns = 0;
        for target in &targets[..16] {
            resolve(&ships, &mut shots, &mut turns, *target);
        }
        let before = shots;
        prop_assert_eq!(resolve(&ships, &mut shots, &mut turns, targets[16]), ShotOutcome::Loss);
        prop_assert_eq!(shots, before);
        prop_assert_eq!(turns, 17);
    }

    /// Hitting every ship cell within the limit wins on the last one.
    #[test]
    fn sinking_everything_wins(cells in fleet(MAX_TURNS as usize)) {
        let ships = map_of(&cells);
        let mut session = playing(ships);
        let last = cells.len() - 1;
        for (i, &(x, y)) in cells.iter().enumerate() {
            let outcome = session.fire(Coord::new(x, y).unwrap()).unwrap();
            if i == last {
                prop_assert_eq!(outcome, ShotOutcome::Win);
            } else {
                prop_assert_eq!(outcome, ShotOutcome::Hit);
            }
        }
        prop_assert_eq!(session.phase(), Phase::GameOver(GameResult::Won));
        prop_assert_eq!(session.hits(), ships);
    }

    /// Hits are always a subset of the ships; shots only grow.
    #[test]
    fn shots_stay_on_ships(raw in any::<u64>(), targets in prop::collection::vec(coord(), 1..40)) {
        let ships = CellMap::from_raw(raw);
        let mut shots = CellMap::new();
        let mut turns = 0;
        for target in targets {
            let before = shots;
            resolve(&ships, &mut shots, &mut turns, target);
            prop_assert!(before.is_subset_of(&shots));
            prop_assert!(shots.is_subset_of(&ships));
        }
    }

    /// Reset after a finished game starts over on the same map.
    #[test]
    fn reset_restores_a_fresh_game(cells in fleet(8), targets in prop::collection::vec(coord(), 17)) {
        let ships = map_of(&cells);
        let mut session = playing(ships);
        for target in targets {
            if session.fire(target).is_err() {
                break;
            }
        }
        prop_assert!(session.phase().is_over());

        session.reset();
        prop_assert_eq!(session.phase(), Phase::Playing);
        prop_assert!(session.shots().is_empty());
        prop_assert_eq!(session.turns(), 0);
        prop_assert_eq!(*session.ships(), ships);
    }

    /// The map survives the serial encoding even with line noise mixed in.
    #[test]
    fn map_survives_noisy_line(raw in any::<u64>(), noise in prop::collection::vec(any::<u8>(), 0..64)) {
        let ships = CellMap::from_raw(raw);
        let mut stream = Vec::new();
        for (i, byte) in map_bytes(&ships).iter().enumerate() {
            if let Some(n) = noise.get(i) {
                if *n != b'0' && *n != b'1' {
                    stream.push(*n);
                }
            }
            stream.push(*byte);
        }
        prop_assert_eq!(parse_map(&stream).unwrap(), ships);
    }
}

