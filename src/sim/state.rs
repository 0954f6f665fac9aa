//! Run state: balls, bin stacking and the seeded random stream
//!
//! Everything needed to reproduce a run lives here: the seed, the board and
//! the ordered list of balls with their target slots.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::board::Board;
use super::path::{Path, build_path};
use crate::error::{PlinkoError, Result};

/// A ball with its assigned slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    /// Slot index, 0..=pin_rows (number of right steps on the way down)
    pub final_bin: u32,
    /// Position in the slot's stack, 0 = bottom
    pub stack_index: u32,
}

impl Ball {
    /// Slot offset from the board center (half-integer on odd boards)
    pub fn bin_offset(&self, board: &Board) -> f32 {
        self.final_bin as f32 - board.center_bin()
    }

    /// Signed half-bin displacement the path must accumulate
    pub fn net_steps(&self, board: &Board) -> i32 {
        board.net_steps_for_bin(self.final_bin)
    }

    /// Horizontal center of the ball's slot
    pub fn final_position(&self, board: &Board) -> f32 {
        board.bin_position(self.final_bin)
    }
}

/// Occupancy counters per slot
///
/// Counters are taken in a single pass in ball order, so a ball's stack
/// position never depends on the order paths are built in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BinStacks {
    counts: BTreeMap<u32, u32>,
}

impl BinStacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next stack slot in `bin` and return its index
    pub fn assign(&mut self, bin: u32) -> u32 {
        let count = self.counts.entry(bin).or_insert(0);
        let index = *count;
        *count += 1;
        index
    }

    /// Number of balls assigned to `bin`
    pub fn occupancy(&self, bin: u32) -> u32 {
        self.counts.get(&bin).copied().unwrap_or(0)
    }

    /// Tallest stack, or 0 when empty
    pub fn max_occupancy(&self) -> u32 {
        self.counts.values().copied().max().unwrap_or(0)
    }

    /// (bin, count) pairs in bin order
    pub fn histogram(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.counts.iter().map(|(&bin, &count)| (bin, count))
    }
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// A complete, reproducible drop of many balls onto one board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropRun {
    /// Run seed for reproducibility
    pub rng_state: RngState,
    pub board: Board,
    /// Balls sorted by id
    pub balls: Vec<Ball>,
    pub stacks: BinStacks,
    /// Next ball ID
    next_id: u32,
}

impl DropRun {
    pub fn new(seed: u64, board: Board) -> Self {
        Self {
            rng_state: RngState::new(seed),
            board,
            balls: Vec::new(),
            stacks: BinStacks::new(),
            next_id: 1,
        }
    }

    pub fn seed(&self) -> u64 {
        self.rng_state.seed
    }

    /// Allocate a new ball ID
    pub fn next_ball_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a ball that must land in `bin`, taking the next stack slot there
    pub fn add_ball(&mut self, bin: u32) -> Result<&Ball> {
        let n_bins = self.board.n_bins();
        if bin >= n_bins {
            return Err(PlinkoError::BinOutOfRange { bin, n_bins });
        }
        let id = self.next_ball_id();
        let stack_index = self.stacks.assign(bin);
        self.balls.push(Ball {
            id,
            final_bin: bin,
            stack_index,
        });
        log::debug!("Ball {} -> bin {} (stack {})", id, bin, stack_index);
        Ok(&self.balls[self.balls.len() - 1])
    }

    /// Add one ball per entry of `bins`, in order
    pub fn add_balls(&mut self, bins: &[u32]) -> Result<()> {
        for &bin in bins {
            self.add_ball(bin)?;
        }
        Ok(())
    }

    /// Build every ball's path from a fresh stream seeded with the run seed
    ///
    /// `drop_height` adds a spawn point that far above the top pin row.
    pub fn build_paths(&self, drop_height: Option<f32>) -> Result<Vec<Path>> {
        let mut rng = self.rng_state.to_rng();
        let paths = self
            .balls
            .iter()
            .map(|ball| {
                build_path(
                    &self.board,
                    ball.id,
                    ball.final_bin,
                    ball.stack_index,
                    drop_height,
                    &mut rng,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        log::info!(
            "Built {} paths over {} rows (seed {}, tallest stack {})",
            paths.len(),
            self.board.pin_rows(),
            self.seed(),
            self.stacks.max_occupancy()
        );
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::board::BoardGeometry;

    fn board(pin_rows: u32) -> Board {
        Board::new(BoardGeometry {
            pin_rows,
            bin_width: 10.0,
            mean_position: 0.0,
            row_height: 5.0,
            bin_height: 20.0,
            ball_width: 2.0,
        })
        .unwrap()
    }

    #[test]
    fn test_stacks_count_in_insertion_order() {
        let mut run = DropRun::new(1, board(8));
        run.add_balls(&[4, 4, 2, 4, 2]).unwrap();

        let stacks: Vec<(u32, u32)> = run.balls.iter().map(|b| (b.final_bin, b.stack_index)).collect();
        assert_eq!(stacks, vec![(4, 0), (4, 1), (2, 0), (4, 2), (2, 1)]);
        assert_eq!(run.stacks.occupancy(4), 3);
        assert_eq!(run.stacks.occupancy(0), 0);
        assert_eq!(run.stacks.max_occupancy(), 3);
        assert_eq!(run.stacks.histogram().collect::<Vec<_>>(), vec![(2, 2), (4, 3)]);
    }

    #[test]
    fn test_ids_are_unique_and_sequential() {
        let mut run = DropRun::new(1, board(4));
        run.add_balls(&[0, 1, 2, 3, 4]).unwrap();
        let ids: Vec<u32> = run.balls.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_ball_geometry() {
        let b = board(8);
        let ball = Ball {
            id: 1,
            final_bin: 6,
            stack_index: 0,
        };
        assert_eq!(ball.bin_offset(&b), 2.0);
        assert_eq!(ball.net_steps(&b), 4);
        assert_eq!(ball.final_position(&b), 20.0);
    }

    #[test]
    fn test_bin_beyond_board_rejected() {
        let mut run = DropRun::new(1, board(4));
        let err = run.add_ball(5).unwrap_err();
        assert!(matches!(err, PlinkoError::BinOutOfRange { bin: 5, n_bins: 5 }));
        assert_eq!(err.to_string(), "Bin 5 does not exist on a board with 5 bins");
        assert!(run.balls.is_empty());
        assert_eq!(run.stacks.max_occupancy(), 0);
        // The last slot is still valid
        assert!(run.add_ball(4).is_ok());
    }

    #[test]
    fn test_zero_balls_gives_no_paths() {
        let run = DropRun::new(1, board(4));
        assert!(run.build_paths(Some(10.0)).unwrap().is_empty());
    }

    #[test]
    fn test_paths_land_on_their_stack() {
        let mut run = DropRun::new(42, board(6));
        run.add_balls(&[3, 3, 0, 6]).unwrap();
        let paths = run.build_paths(None).unwrap();

        assert_eq!(paths.len(), 4);
        for (ball, path) in run.balls.iter().zip(&paths) {
            assert_eq!(path.ball_id, ball.id);
            assert_eq!(path.net_steps(), ball.net_steps(&run.board));
            assert_eq!(path.rest.x, ball.final_position(&run.board));
            assert_eq!(path.rest, run.board.rest_position(ball.final_bin, ball.stack_index));
        }
        assert!(paths[1].rest.y > paths[0].rest.y);
    }

    #[test]
    fn test_determinism() {
        // Two runs with same seed should produce identical paths
        let mut run1 = DropRun::new(99999, board(10));
        let mut run2 = DropRun::new(99999, board(10));
        let bins = [5, 3, 7, 5, 0, 10];
        run1.add_balls(&bins).unwrap();
        run2.add_balls(&bins).unwrap();

        assert_eq!(run1.build_paths(Some(5.0)).unwrap(), run2.build_paths(Some(5.0)).unwrap());
        // Rebuilding from the same run restarts the stream
        assert_eq!(run1.build_paths(None).unwrap(), run1.build_paths(None).unwrap());
    }
}
