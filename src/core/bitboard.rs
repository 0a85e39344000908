//! Fixed-size bit grids used for the ship and shot maps.
//!
//! A grid of `N×N` cells is packed row-major into an unsigned integer `T`,
//! so the whole map fits in one machine word on the target (`u64` for 8×8).
//! That keeps the maps copyable and lets the runtime publish them through a
//! single atomic.

use core::fmt;
use core::ops::{BitAnd, BitOr, Not};
use num_traits::{PrimInt, Unsigned, Zero};

/// Errors returned by bit grid operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitBoardError {
    /// Requested grid size N*N exceeds the capacity of `T`.
    SizeTooLarge { n: usize, capacity: usize },
    /// Row or column outside `[0, N)`.
    IndexOutOfBounds { row: usize, col: usize },
}

impl fmt::Display for BitBoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitBoardError::SizeTooLarge { n, capacity } => {
                write!(f, "grid of {} cells exceeds {} bits", n * n, capacity)
            }
            BitBoardError::IndexOutOfBounds { row, col } => {
                write!(f, "cell ({}, {}) is outside the grid", row, col)
            }
        }
    }
}

/// An `N×N` grid of flags stored in `T`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitBoard<T, const N: usize>
where
    T: PrimInt + Unsigned + Zero,
{
    bits: T,
}

impl<T, const N: usize> BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    const CELLS: usize = N * N;

    #[inline]
    fn mask() -> T {
        if Self::CELLS == core::mem::size_of::<T>() * 8 {
            !T::zero()
        } else {
            (T::one() << Self::CELLS) - T::one()
        }
    }

    #[inline]
    fn bit(row: usize, col: usize) -> T {
        T::one() << (row * N + col)
    }

    /// Empty grid.
    #[inline]
    pub fn new() -> Self {
        BitBoard { bits: T::zero() }
    }

    /// Empty grid, checking that `N×N` fits into `T`.
    pub fn try_new() -> Result<Self, BitBoardError> {
        let capacity = core::mem::size_of::<T>() * 8;
        if Self::CELLS > capacity {
            Err(BitBoardError::SizeTooLarge { n: N, capacity })
        } else {
            Ok(Self::new())
        }
    }

    /// Number of set cells.
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_zero()
    }

    /// Reads cell (row, col).
    pub fn get(&self, row: usize, col: usize) -> Result<bool, BitBoardError> {
        Self::check_bounds(row, col)?;
        Ok(!(self.bits & Self::bit(row, col)).is_zero())
    }

    /// Writes cell (row, col).
    pub fn put(&mut self, row: usize, col: usize, value: bool) -> Result<(), BitBoardError> {
        Self::check_bounds(row, col)?;
        if value {
            self.bits = self.bits | Self::bit(row, col);
        } else {
            self.bits = self.bits & !Self::bit(row, col);
        }
        Ok(())
    }

    /// Sets cell (row, col).
    pub fn set(&mut self, row: usize, col: usize) -> Result<(), BitBoardError> {
        self.put(row, col, true)
    }

    /// Clears every cell.
    #[inline]
    pub fn clear_all(&mut self) {
        self.bits = T::zero();
    }

    /// True when every set cell of `self` is also set in `other`.
    pub fn is_subset_of(&self, other: &Self) -> bool {
        (self.bits & !other.bits).is_zero()
    }

    #[inline]
    fn check_bounds(row: usize, col: usize) -> Result<(), BitBoardError> {
        if row >= N || col >= N {
            Err(BitBoardError::IndexOutOfBounds { row, col })
        } else {
            Ok(())
        }
    }

    /// Raw packed representation, bit `row * N + col`.
    #[inline]
    pub fn into_raw(self) -> T {
        self.bits
    }

    /// Builds a grid from its packed form, dropping bits beyond `N×N`.
    #[inline]
    pub fn from_raw(raw: T) -> Self {
        BitBoard {
            bits: raw & Self::mask(),
        }
    }

    /// Builds a grid from `(row, col)` positions.
    pub fn from_cells<I>(cells: I) -> Result<Self, BitBoardError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut board = Self::new();
        for (r, c) in cells {
            board.set(r, c)?;
        }
        Ok(board)
    }

    /// Iterator over set cells in row-major order.
    #[inline]
    pub fn iter_set(&self) -> SetCells<T, N> {
        SetCells {
            bits: self.bits,
            idx: 0,
        }
    }
}

impl<T, const N: usize> Default for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> fmt::Debug for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BitBoard<{}x{}>:", N, N)?;
        fmt::Display::fmt(self, f)
    }
}

/// Rows of `1`/`0`, the same alphabet the serial loader accepts.
impl<T, const N: usize> fmt::Display for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..N {
            for c in 0..N {
                let set = !(self.bits & Self::bit(r, c)).is_zero();
                f.write_str(if set { "1" } else { "0" })?;
            }
            if r + 1 < N {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Iterator over the set cells of a grid.
#[derive(Clone, Copy)]
pub struct SetCells<T, const N: usize> {
    bits: T,
    idx: usize,
}

impl<T, const N: usize> Iterator for SetCells<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while self.idx < N * N {
            let idx = self.idx;
            self.idx += 1;
            if !((self.bits >> idx) & T::one()).is_zero() {
                return Some((idx / N, idx % N));
            }
        }
        None
    }
}

impl<T, const N: usize> BitAnd for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        BitBoard::from_raw(self.bits & rhs.bits)
    }
}

impl<T, const N: usize> BitOr for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        BitBoard::from_raw(self.bits | rhs.bits)
    }
}

/// Complement within the grid bounds.
impl<T, const N: usize> Not for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    fn not(self) -> Self {
        Self::from_raw(!self.bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Grid = BitBoard<u64, 8>;

    #[test]
    fn full_word_grid_masks_nothing() {
        let g = Grid::from_raw(u64::MAX);
        assert_eq!(g.count_ones(), 64);
        assert!((!g).is_empty());
    }

    #[test]
    fn put_and_clear_cell() {
        let mut g = Grid::new();
        g.put(7, 7, true).unwrap();
        assert!(g.get(7, 7).unwrap());
        assert_eq!(g.into_raw(), 1 << 63);
        g.put(7, 7, false).unwrap();
        assert!(g.is_empty());
    }

    #[test]
    fn out_of_bounds_is_rejected() {
        let g = Grid::new();
        assert_eq!(
            g.get(8, 0),
            Err(BitBoardError::IndexOutOfBounds { row: 8, col: 0 })
        );
    }

    #[test]
    fn oversized_grid_is_rejected() {
        assert!(matches!(
            BitBoard::<u16, 5>::try_new(),
            Err(BitBoardError::SizeTooLarge { n: 5, capacity: 16 })
        ));
    }

    #[test]
    fn subset_check() {
        let ships = Grid::from_cells([(0, 0), (3, 4)]).unwrap();
        let mut shots = Grid::from_cells([(0, 0)]).unwrap();
        assert!(!ships.is_subset_of(&shots));
        shots.set(3, 4).unwrap();
        assert!(ships.is_subset_of(&shots));
    }
}
