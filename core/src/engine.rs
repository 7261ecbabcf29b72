use alloc::collections::{BTreeSet, VecDeque};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - InProgress -> Won
/// - InProgress -> LostMine
/// - InProgress -> LostBadFlag
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameState {
    /// Accepting moves
    InProgress,
    /// All safe cells opened
    Won,
    /// A mine was opened
    LostMine,
    /// A safe cell was flagged
    LostBadFlag,
}

impl GameState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::LostMine | Self::LostBadFlag)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::InProgress
    }
}

/// Outcome of opening a cell
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The cell was open already, nothing changed
    AlreadyOpen,
    /// The cell (and possibly a zero region around it) was opened
    Opened,
    /// The cell held a mine, game lost
    Exploded,
    /// This open left only mines unopened, game won
    Won,
}

/// Outcome of flagging a cell
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    /// Opened cells cannot be flagged, nothing changed
    AlreadyOpen,
    /// The cell already carries a flag, nothing changed
    AlreadyFlagged,
    /// Correct flag on a mine
    Flagged,
    /// Flag on a safe cell, game lost
    WrongFlag,
}

/// Board-state engine for one game: mine truth, per-cell display state,
/// and the two remaining-counters the renderer shows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    mine_layout: MineLayout,
    grid: Array2<Tile>,
    unopened_count: CellCount,
    mines_left: CellCount,
    state: GameState,
}

impl Game {
    pub fn new(mine_layout: MineLayout) -> Self {
        let size = mine_layout.size();
        let unopened_count = mine_layout.total_cells();
        let mines_left = mine_layout.mine_count();
        Self {
            mine_layout,
            grid: Array2::default(size.to_nd_index()),
            unopened_count,
            mines_left,
            state: Default::default(),
        }
    }

    /// Fresh game from a config, with mines placed by the given seed.
    pub fn from_config(config: GameConfig, seed: u64) -> Self {
        Self::new(RandomMineLayout::new(seed).generate(config))
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn size(&self) -> Coord2 {
        self.mine_layout.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.mine_layout.mine_count()
    }

    /// Cells not yet opened, mines included.
    pub fn unopened_count(&self) -> CellCount {
        self.unopened_count
    }

    /// Mines not yet flagged.
    pub fn mines_left(&self) -> CellCount {
        self.mines_left
    }

    pub fn tile_at(&self, coords: Coord2) -> Tile {
        self.grid[coords.to_nd_index()]
    }

    pub fn has_mine_at(&self, coords: Coord2) -> bool {
        self.mine_layout.contains_mine(coords)
    }

    /// Open a cell. Opening a mine loses the game; opening a
    /// zero-adjacency cell cascades through its whole zero region.
    pub fn open(&mut self, coords: Coord2) -> Result<OpenOutcome> {
        use OpenOutcome::*;

        let coords = self.mine_layout.validate_coords(coords)?;
        self.check_in_progress()?;

        // mine truth wins over display state, so opening a flagged mine
        // still explodes
        if self.mine_layout[coords] {
            self.grid[coords.to_nd_index()] = Tile::Mine;
            self.state = GameState::LostMine;
            log::debug!("Opened a mine at {:?}", coords);
            return Ok(Exploded);
        }

        if self.grid[coords.to_nd_index()].is_open() {
            return Ok(AlreadyOpen);
        }

        let adjacent_mines = self.open_single_cell(coords);
        if adjacent_mines == 0 {
            self.flood_open(coords);
        }

        if self.unopened_count == self.mine_layout.mine_count() {
            self.state = GameState::Won;
            Ok(Won)
        } else {
            Ok(Opened)
        }
    }

    /// Flag a cell as a mine. Flags are one-shot: there is no unflag,
    /// and flagging a safe cell loses the game.
    pub fn flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        use FlagOutcome::*;

        let coords = self.mine_layout.validate_coords(coords)?;
        self.check_in_progress()?;

        match self.grid[coords.to_nd_index()] {
            Tile::Open(_) => Ok(AlreadyOpen),
            Tile::Flagged => Ok(AlreadyFlagged),
            _ if self.mine_layout[coords] => {
                self.grid[coords.to_nd_index()] = Tile::Flagged;
                self.mines_left -= 1;
                log::debug!("Flagged mine at {:?}, {} left", coords, self.mines_left);
                // only reachable on all-mine boards, where no open can
                // ever win: every safe cell being open already ends the
                // game through the open path
                if self.unopened_count == self.mine_layout.mine_count() {
                    self.state = GameState::Won;
                }
                Ok(Flagged)
            }
            _ => {
                self.grid[coords.to_nd_index()] = Tile::Mine;
                self.state = GameState::LostBadFlag;
                log::debug!("Wrong flag at {:?}", coords);
                Ok(WrongFlag)
            }
        }
    }

    /// Marks one safe cell open and returns its adjacency count.
    fn open_single_cell(&mut self, coords: Coord2) -> u8 {
        let adjacent_mines = self.mine_layout.adjacent_mine_count(coords);
        self.grid[coords.to_nd_index()] = Tile::Open(adjacent_mines);
        self.unopened_count -= 1;
        log::trace!("Opened {:?}, adjacency {}", coords, adjacent_mines);
        adjacent_mines
    }

    /// Worklist flood fill from a zero-adjacency cell: every hidden
    /// cell in the connected zero region opens, plus the digit frontier
    /// around it. Digit cells never enqueue their own neighbors, and
    /// the visited set keeps each cell from opening twice.
    fn flood_open(&mut self, start: Coord2) {
        let mut visited = BTreeSet::from([start]);
        let mut to_visit: VecDeque<_> = self
            .mine_layout
            .iter_neighbors(start)
            .filter(|&pos| self.grid[pos.to_nd_index()] == Tile::Hidden)
            .collect();

        while let Some(coords) = to_visit.pop_front() {
            if !visited.insert(coords) {
                continue;
            }
            if self.grid[coords.to_nd_index()] != Tile::Hidden {
                continue;
            }

            let adjacent_mines = self.open_single_cell(coords);
            if adjacent_mines == 0 {
                to_visit.extend(
                    self.mine_layout
                        .iter_neighbors(coords)
                        .filter(|&pos| self.grid[pos.to_nd_index()] == Tile::Hidden)
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }
    }

    fn check_in_progress(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(size: Coord2, mines: &[Coord2]) -> Game {
        Game::new(MineLayout::from_mine_coords(size, mines).unwrap())
    }

    #[test]
    fn opening_a_mine_loses_the_game() {
        let mut game = game((2, 2), &[(0, 0)]);

        assert_eq!(game.open((0, 0)), Ok(OpenOutcome::Exploded));
        assert_eq!(game.state(), GameState::LostMine);
        assert_eq!(game.tile_at((0, 0)), Tile::Mine);
        // nothing else moved
        assert_eq!(game.unopened_count(), 4);
        assert_eq!(game.mines_left(), 1);
    }

    #[test]
    fn no_moves_accepted_after_the_game_ends() {
        let mut game = game((2, 2), &[(0, 0)]);
        game.open((0, 0)).unwrap();

        assert_eq!(game.open((1, 1)), Err(GameError::AlreadyEnded));
        assert_eq!(game.flag((0, 1)), Err(GameError::AlreadyEnded));
        assert_eq!(game.unopened_count(), 4);
        assert_eq!(game.tile_at((1, 1)), Tile::Hidden);
    }

    #[test]
    fn out_of_bounds_coords_are_rejected() {
        let mut game = game((2, 2), &[(0, 0)]);

        assert_eq!(game.open((2, 0)), Err(GameError::InvalidCoords));
        assert_eq!(game.flag((0, 2)), Err(GameError::InvalidCoords));
        assert_eq!(game.state(), GameState::InProgress);
    }

    #[test]
    fn digit_cell_opens_without_recursing() {
        // 5x4 board, 20 cells: the cell between two mines shows '2'
        let mut game = game((5, 4), &[(0, 0), (0, 2)]);

        assert_eq!(game.open((0, 1)), Ok(OpenOutcome::Opened));
        assert_eq!(game.tile_at((0, 1)), Tile::Open(2));
        assert_eq!(game.unopened_count(), 19);
        assert_eq!(game.tile_at((1, 1)), Tile::Hidden);
    }

    #[test]
    fn opening_an_open_cell_changes_nothing() {
        let mut game = game((5, 4), &[(0, 0), (0, 2)]);
        game.open((0, 1)).unwrap();

        assert_eq!(game.open((0, 1)), Ok(OpenOutcome::AlreadyOpen));
        assert_eq!(game.unopened_count(), 19);
        assert_eq!(game.tile_at((0, 1)), Tile::Open(2));
        assert_eq!(game.state(), GameState::InProgress);
    }

    #[test]
    fn flood_fill_opens_zero_region_and_digit_frontier() {
        // mines across row 3: rows 0-1 are the zero region, row 2 is
        // the digit frontier, row 4 stays hidden
        let mines: &[Coord2] = &[(3, 0), (3, 1), (3, 2), (3, 3), (3, 4)];
        let mut game = game((5, 5), mines);

        assert_eq!(game.open((0, 0)), Ok(OpenOutcome::Opened));
        assert_eq!(game.unopened_count(), 10);
        for col in 0..5 {
            assert_eq!(game.tile_at((0, col)), Tile::Open(0));
            assert_eq!(game.tile_at((1, col)), Tile::Open(0));
            assert!(matches!(game.tile_at((2, col)), Tile::Open(n) if n > 0));
            assert_eq!(game.tile_at((4, col)), Tile::Hidden);
        }
        assert_eq!(game.state(), GameState::InProgress);
    }

    #[test]
    fn flood_fill_covers_the_whole_board_in_one_call() {
        // single far-away mine: one open cascades through all 99 safe
        // cells exactly once (the counter would underflow otherwise)
        let mut game = game((10, 10), &[(0, 0)]);

        assert_eq!(game.open((5, 5)), Ok(OpenOutcome::Won));
        assert_eq!(game.unopened_count(), 1);
        assert_eq!(game.tile_at((0, 0)), Tile::Hidden);
        assert_eq!(game.tile_at((1, 1)), Tile::Open(1));
        assert_eq!(game.state(), GameState::Won);
    }

    #[test]
    fn opening_every_safe_cell_wins() {
        let mut game = game((2, 2), &[(0, 0)]);

        assert_eq!(game.open((0, 1)), Ok(OpenOutcome::Opened));
        assert_eq!(game.open((1, 0)), Ok(OpenOutcome::Opened));
        assert_eq!(game.open((1, 1)), Ok(OpenOutcome::Won));
        assert_eq!(game.state(), GameState::Won);
        assert_eq!(game.unopened_count(), game.total_mines());
    }

    #[test]
    fn flagging_every_mine_empties_the_counter() {
        let mines: &[Coord2] = &[(0, 0), (1, 1)];
        let mut game = game((3, 3), mines);

        assert_eq!(game.flag((0, 0)), Ok(FlagOutcome::Flagged));
        assert_eq!(game.flag((1, 1)), Ok(FlagOutcome::Flagged));
        assert_eq!(game.mines_left(), 0);
        assert_eq!(game.tile_at((0, 0)), Tile::Flagged);
        // flags do not open cells, so the game is still running
        assert_eq!(game.state(), GameState::InProgress);
    }

    #[test]
    fn flagging_a_safe_cell_loses_the_game() {
        let mut game = game((3, 3), &[(0, 0)]);

        assert_eq!(game.flag((2, 2)), Ok(FlagOutcome::WrongFlag));
        assert_eq!(game.state(), GameState::LostBadFlag);
        // a wrong flag renders with the mine glyph
        assert_eq!(game.tile_at((2, 2)), Tile::Mine);
        assert_eq!(game.mines_left(), 1);
    }

    #[test]
    fn repeat_flag_is_a_noop() {
        let mut game = game((3, 3), &[(0, 0)]);
        game.flag((0, 0)).unwrap();

        assert_eq!(game.flag((0, 0)), Ok(FlagOutcome::AlreadyFlagged));
        assert_eq!(game.mines_left(), 0);
        assert_eq!(game.state(), GameState::InProgress);
    }

    #[test]
    fn flagging_an_open_cell_is_rejected() {
        let mut game = game((3, 3), &[(0, 0)]);
        game.open((1, 1)).unwrap();

        assert_eq!(game.flag((1, 1)), Ok(FlagOutcome::AlreadyOpen));
        assert_eq!(game.tile_at((1, 1)), Tile::Open(1));
        assert_eq!(game.mines_left(), 1);
    }

    #[test]
    fn opening_a_flagged_mine_still_explodes() {
        let mut game = game((2, 2), &[(1, 1)]);
        game.flag((1, 1)).unwrap();

        assert_eq!(game.open((1, 1)), Ok(OpenOutcome::Exploded));
        assert_eq!(game.state(), GameState::LostMine);
        assert_eq!(game.tile_at((1, 1)), Tile::Mine);
    }

    #[test]
    fn one_by_one_board_loses_on_any_open() {
        let mut game = game((1, 1), &[(0, 0)]);

        assert_eq!(game.open((0, 0)), Ok(OpenOutcome::Exploded));
        assert_eq!(game.state(), GameState::LostMine);
    }

    #[test]
    fn one_by_one_board_wins_by_flagging_its_mine() {
        // no safe cell exists, so the flag is the only winning action
        let mut game = game((1, 1), &[(0, 0)]);

        assert_eq!(game.flag((0, 0)), Ok(FlagOutcome::Flagged));
        assert_eq!(game.state(), GameState::Won);
        assert_eq!(game.mines_left(), 0);
    }

    #[test]
    fn seeded_game_from_config_is_playable() {
        let game = Game::from_config(GameConfig::from_size(5, 4), 3);

        assert_eq!(game.size(), (5, 4));
        assert_eq!(game.total_mines(), 3);
        assert_eq!(game.unopened_count(), 20);
        assert_eq!(game.mines_left(), 3);
        assert_eq!(game.state(), GameState::InProgress);
    }
}
