use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Structured snapshot of the board for presentation layers: the
/// display symbols plus the counters shown alongside the grid. Carries
/// no engine internals, so a terminal, a test harness, or a GUI can
/// render it without touching the game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardView {
    pub size: Coord2,
    pub remaining_unopened: CellCount,
    pub remaining_mines: CellCount,
    pub state: GameState,
    /// Row-major display symbols, `size.0` rows of `size.1` chars.
    pub symbols: Vec<Vec<char>>,
}

impl Game {
    pub fn view(&self) -> BoardView {
        let (rows, cols) = self.size();
        let symbols = (0..rows)
            .map(|row| (0..cols).map(|col| self.tile_at((row, col)).symbol()).collect())
            .collect();

        BoardView {
            size: self.size(),
            remaining_unopened: self.unopened_count(),
            remaining_mines: self.mines_left(),
            state: self.state(),
            symbols,
        }
    }
}
