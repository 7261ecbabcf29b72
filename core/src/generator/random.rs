use ndarray::Array2;

use super::*;

/// Uniform mine placement by rejection sampling: draw random cells and
/// skip the ones already mined until the requested count is reached.
/// Mine density is at most `total / 10 + 1`, low enough that the
/// duplicate rate stays tiny and the loop always terminates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RandomMineLayout {
    seed: u64,
}

impl RandomMineLayout {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MineLayoutGenerator for RandomMineLayout {
    fn generate(self, config: GameConfig) -> MineLayout {
        use rand::prelude::*;

        let (rows, cols) = config.size;
        let total_cells = config.total_cells();

        // full boards need no sampling (the 1x1 board lands here)
        if config.mines >= total_cells {
            if config.mines > total_cells {
                log::warn!(
                    "Requested {} mines but the board only fits {}",
                    config.mines,
                    total_cells
                );
            }
            return MineLayout::from_mine_mask(Array2::from_elem(
                config.size.to_nd_index(),
                true,
            ));
        }

        let mut mine_mask: Array2<bool> = Array2::default(config.size.to_nd_index());
        let mut mines_placed: CellCount = 0;

        let mut rng = SmallRng::seed_from_u64(self.seed);
        while mines_placed < config.mines {
            let coords: Coord2 = (rng.random_range(0..rows), rng.random_range(0..cols));
            let cell = &mut mine_mask[coords.to_nd_index()];
            if !*cell {
                *cell = true;
                mines_placed += 1;
                log::trace!("Placed mine {} at {:?}", mines_placed, coords);
            }
        }

        MineLayout::from_mine_mask(mine_mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(rows: Coord, cols: Coord, seed: u64) -> MineLayout {
        RandomMineLayout::new(seed).generate(GameConfig::from_size(rows, cols))
    }

    #[test]
    fn places_exactly_the_configured_mine_count() {
        for seed in 0..20 {
            let layout = generate(10, 10, seed);
            assert_eq!(layout.mine_count(), 11);
        }
    }

    #[test]
    fn mine_count_matches_distinct_cells_in_mask() {
        // from_mine_mask recounts the mask, so equality with the config
        // proves all sampled cells were distinct
        let config = GameConfig::from_size(5, 4);
        let layout = RandomMineLayout::new(7).generate(config);
        assert_eq!(layout.mine_count(), config.mines);
        assert_eq!(layout.size(), config.size);
    }

    #[test]
    fn same_seed_reproduces_the_layout() {
        assert_eq!(generate(8, 8, 42), generate(8, 8, 42));
    }

    #[test]
    fn single_cell_board_is_all_mine() {
        let layout = generate(1, 1, 0);
        assert_eq!(layout.mine_count(), 1);
        assert!(layout.contains_mine((0, 0)));
        assert_eq!(layout.safe_cell_count(), 0);
    }
}
