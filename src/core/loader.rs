//! Serial map ingestion.
//!
//! The map arrives as 64 ASCII `'0'`/`'1'` bytes, row-major. Anything else
//! on the line is noise and is dropped without advancing the write position.

use super::common::KernelError;
use super::config::{CellMap, BOARD_SIZE, MAP_BYTES};

/// Accumulates the ship map one received byte at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardLoader {
    ships: CellMap,
    accepted: u8,
}

impl BoardLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one received byte. Returns `true` if the byte was written.
    ///
    /// Bytes arriving after the map is full are ignored.
    pub fn feed(&mut self, byte: u8) -> bool {
        let value = match byte {
            b'0' => false,
            b'1' => true,
            _ => {
                log::trace!("loader: ignoring byte {:#04x}", byte);
                return false;
            }
        };
        if self.is_complete() {
            log::trace!("loader: map already complete, ignoring {:?}", byte as char);
            return false;
        }
        let row = (self.accepted / BOARD_SIZE) as usize;
        let col = (self.accepted % BOARD_SIZE) as usize;
        if self.ships.put(row, col, value).is_err() {
            return false;
        }
        self.accepted += 1;
        true
    }

    /// Number of cells written so far.
    pub fn accepted(&self) -> u8 {
        self.accepted
    }

    pub fn is_complete(&self) -> bool {
        self.accepted >= MAP_BYTES
    }

    /// The map as loaded so far; cells not yet received read as empty.
    pub fn ship_map(&self) -> CellMap {
        self.ships
    }
}

/// Loads a complete map from a byte stream.
pub fn parse_map(stream: &[u8]) -> Result<CellMap, KernelError> {
    let mut loader = BoardLoader::new();
    for &byte in stream {
        loader.feed(byte);
    }
    if loader.is_complete() {
        Ok(loader.ship_map())
    } else {
        Err(KernelError::IncompleteMap {
            accepted: loader.accepted(),
        })
    }
}

/// Encodes a map the way a sender transmits it, one ASCII digit per cell.
pub fn map_bytes(ships: &CellMap) -> [u8; MAP_BYTES as usize] {
    let mut bytes = [b'0'; MAP_BYTES as usize];
    for (row, col) in ships.iter_set() {
        bytes[row * BOARD_SIZE as usize + col] = b'1';
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_does_not_advance() {
        let mut loader = BoardLoader::new();
        assert!(!loader.feed(b'\n'));
        assert!(!loader.feed(b'x'));
        assert_eq!(loader.accepted(), 0);
        assert!(loader.feed(b'1'));
        assert_eq!(loader.accepted(), 1);
        assert!(loader.ship_map().get(0, 0).unwrap());
    }

    #[test]
    fn ninth_byte_starts_second_row() {
        let mut loader = BoardLoader::new();
        for b in b"000000001" {
            loader.feed(*b);
        }
        assert!(loader.ship_map().get(1, 0).unwrap());
        assert_eq!(loader.ship_map().count_ones(), 1);
    }

    #[test]
    fn surplus_bytes_are_dropped() {
        let mut loader = BoardLoader::new();
        for _ in 0..MAP_BYTES {
            loader.feed(b'0');
        }
        assert!(loader.is_complete());
        assert!(!loader.feed(b'1'));
        assert!(loader.ship_map().is_empty());
    }

    #[test]
    fn encoded_map_loads_back() {
        let ships = CellMap::from_cells([(0, 7), (3, 3), (7, 0)]).unwrap();
        let bytes = map_bytes(&ships);
        assert_eq!(bytes[7], b'1');
        assert_eq!(bytes[56], b'1');
        assert_eq!(parse_map(&bytes), Ok(ships));
    }

    #[test]
    fn short_stream_is_incomplete() {
        assert_eq!(
            parse_map(b"0101"),
            Err(KernelError::IncompleteMap { accepted: 4 })
        );
    }
}
