//! Commonly used types and utilities for ease of import.

pub use crate::{
    map_bytes, parse_map, spawn_kernel, CellMap, Coord, GameSession, KernelConfig, KernelHandle,
    KernelReport, Phase, ShotOutcome, TurnReport,
};

pub use crate::runtime::sim::{random_map, shuffled_cells, sim_board, Operator, SimProbes};
pub use crate::serial::{InMemorySerial, SerialSource, StreamSerial};
