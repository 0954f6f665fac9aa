//! Analytic fall paths
//!
//! Instead of simulating collisions, each ball gets a shuffled sequence of
//! left/right pin steps whose signed sum is fixed in advance. The sequence
//! is built from two kinds of moves:
//! - fixed moves: `|target|` steps in the direction of the target
//! - balanced moves: equal numbers of left and right steps that cancel out
//!
//! Shuffling the combined multiset gives every ordering with the right
//! counts equal probability, so the path looks like a fair random walk that
//! is conditioned on its end point.

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::board::Board;
use crate::error::{PlinkoError, Result};

/// One pin interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    Left,
    /// Spawn marker at the apex, before any pin is hit
    Start,
    Right,
}

impl Step {
    /// Signed half-bin displacement of this step
    #[inline]
    pub fn value(self) -> i32 {
        match self {
            Step::Left => -1,
            Step::Start => 0,
            Step::Right => 1,
        }
    }

    fn toward(sign: i32) -> Self {
        if sign < 0 { Step::Left } else { Step::Right }
    }
}

/// A step together with where it leaves the ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Move {
    /// Depth in the board (0 = start marker)
    pub index: u32,
    pub step: Step,
    /// Cumulative signed step sum up to and including this move
    pub offset: i32,
    pub pos: Vec2,
}

/// The full trajectory of one ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub ball_id: u32,
    /// Optional point above the board, directly over the start move
    pub spawn: Option<Vec2>,
    /// Start marker followed by one move per pin row
    pub moves: Vec<Move>,
    /// Final resting place inside the bin, including stack offset
    pub rest: Vec2,
}

impl Path {
    /// Net displacement in half-bin steps
    pub fn net_steps(&self) -> i32 {
        self.moves.last().map_or(0, |m| m.offset)
    }

    /// Number of animated points (spawn, moves and rest)
    pub fn point_count(&self) -> usize {
        self.spawn.is_some() as usize + self.moves.len() + 1
    }

    /// Position of the `index`-th animated point, clamped to the rest point
    pub fn point(&self, index: usize) -> Vec2 {
        let index = match self.spawn {
            Some(spawn) if index == 0 => return spawn,
            Some(_) => index - 1,
            None => index,
        };
        self.moves.get(index).map_or(self.rest, |m| m.pos)
    }

    /// All animated points in order
    pub fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.spawn
            .into_iter()
            .chain(self.moves.iter().map(|m| m.pos))
            .chain(std::iter::once(self.rest))
    }
}

/// Check that `target` half-bin steps can be reached in exactly `pin_rows` steps
pub fn validate_target(pin_rows: u32, target: i32) -> Result<()> {
    if pin_rows == 0 {
        return Err(PlinkoError::InvalidBoard(
            "pin_rows must be at least 1".to_string(),
        ));
    }
    let fixed = target.unsigned_abs();
    if fixed > pin_rows {
        return Err(PlinkoError::TargetOutOfRange { target, pin_rows });
    }
    if (pin_rows - fixed) % 2 != 0 {
        return Err(PlinkoError::ParityMismatch { target, pin_rows });
    }
    Ok(())
}

/// Build a shuffled step sequence of length `pin_rows` summing to `target`
///
/// The returned steps exclude the start marker.
pub fn construct_steps<R: Rng + ?Sized>(pin_rows: u32, target: i32, rng: &mut R) -> Result<Vec<Step>> {
    validate_target(pin_rows, target)?;

    let fixed_moves = target.unsigned_abs() as usize;
    let half_balanced = (pin_rows as usize - fixed_moves) / 2;

    let mut steps = Vec::with_capacity(pin_rows as usize);
    steps.extend(std::iter::repeat_n(Step::toward(target), fixed_moves));
    steps.extend(std::iter::repeat_n(Step::Left, half_balanced));
    steps.extend(std::iter::repeat_n(Step::Right, half_balanced));
    steps.shuffle(rng);

    Ok(steps)
}

/// Lay a step sequence onto the board, prefixed with the start marker
pub fn place_moves(board: &Board, steps: &[Step]) -> Vec<Move> {
    let mut offset = 0;
    std::iter::once(Step::Start)
        .chain(steps.iter().copied())
        .enumerate()
        .map(|(index, step)| {
            offset += step.value();
            let index = index as u32;
            Move {
                index,
                step,
                offset,
                pos: Vec2::new(board.position_for_offset(offset), board.row_y(index)),
            }
        })
        .collect()
}

/// Construct the full path for one ball landing in `slot`
///
/// `stack_index` places the resting point above earlier balls in the same
/// slot; `drop_height` adds a spawn point that far above the board.
pub fn build_path<R: Rng + ?Sized>(
    board: &Board,
    ball_id: u32,
    slot: u32,
    stack_index: u32,
    drop_height: Option<f32>,
    rng: &mut R,
) -> Result<Path> {
    let target = board.net_steps_for_bin(slot);
    let steps = construct_steps(board.pin_rows(), target, rng)?;
    let moves = place_moves(board, &steps);

    let spawn = drop_height.map(|h| {
        let x = moves.first().map_or(board.mean_position(), |m| m.pos.x);
        Vec2::new(x, board.height() + h)
    });

    Ok(Path {
        ball_id,
        spawn,
        moves,
        rest: board.rest_position(slot, stack_index),
    })
}
