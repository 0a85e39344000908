//! Screens drawn on the pixel display surface.

use super::config::{CellMap, BOARD_SIZE};
use super::session::GameResult;

/// Pixel-addressed text surface.
pub trait Surface {
    fn clear(&mut self);
    fn draw_char(&mut self, x: u8, y: u8, glyph: char);
    fn draw_str(&mut self, x: u8, y: u8, text: &str);
}

/// Horizontal offset of the board's first column.
pub const BOARD_LEFT: u8 = 32;
/// Width and height of one board cell.
pub const CELL_PIXELS: u8 = 8;

/// Splash shown while the map is being sent.
pub fn title_screen<S: Surface + ?Sized>(surface: &mut S) {
    surface.clear();
    surface.draw_str(24, 0, "BATTLESHIP");
    surface.draw_str(10, 32, "Input map to continue");
}

/// Shown once all 64 cells arrived, until play starts.
pub fn map_loaded_screen<S: Surface + ?Sized>(surface: &mut S) {
    surface.clear();
    surface.draw_str(6, 24, "Map Loaded Successfully");
}

/// Glyph for one cell: only confirmed hits are revealed.
pub fn cell_glyph(ship: bool, shot: bool) -> char {
    if ship && shot {
        'X'
    } else {
        '-'
    }
}

/// Redraws the whole board.
pub fn board_screen<S: Surface + ?Sized>(surface: &mut S, ships: &CellMap, shots: &CellMap) {
    surface.clear();
    for row in 0..BOARD_SIZE {
        for col in 0..BOARD_SIZE {
            let (r, c) = (row as usize, col as usize);
            let glyph = cell_glyph(
                ships.get(r, c).unwrap_or(false),
                shots.get(r, c).unwrap_or(false),
            );
            surface.draw_char(col * CELL_PIXELS + BOARD_LEFT, row * CELL_PIXELS, glyph);
        }
    }
}

/// End-of-game banner.
pub fn game_over_screen<S: Surface + ?Sized>(surface: &mut S, result: GameResult) {
    surface.clear();
    surface.draw_str(28, 8, "Game Over");
    match result {
        GameResult::Won => surface.draw_str(36, 24, "You Win"),
        GameResult::Lost => surface.draw_str(30, 24, "You Lose"),
    }
}
