//! Galton board geometry
//!
//! Pins form a triangular lattice symmetric around `mean_position`:
//! - row r (0-based from the top) holds r + 1 pins
//! - pin x positions are `mean_position + k * bin_width / 2` with k ≡ r (mod 2)
//! - consecutive rows are therefore offset by half a bin width
//!
//! A ball that has taken m steps sits at `mean_position + S * bin_width / 2`,
//! where S is the signed sum of its steps.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::approx_eq;
use crate::consts::*;
use crate::error::{PlinkoError, Result};

/// Raw board dimensions, as read from configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardGeometry {
    /// Number of pin rows a ball passes through (path length)
    pub pin_rows: u32,
    /// Horizontal distance between adjacent bin centers
    pub bin_width: f32,
    /// Horizontal position of the board's axis of symmetry
    pub mean_position: f32,
    /// Vertical distance between pin rows
    pub row_height: f32,
    /// Height of the slot area below the last pin row
    pub bin_height: f32,
    /// Ball diameter (also the stacking pitch inside a bin)
    pub ball_width: f32,
}

impl Default for BoardGeometry {
    fn default() -> Self {
        Self {
            pin_rows: DEFAULT_PIN_ROWS,
            bin_width: 2.0 * DEFAULT_SD / (DEFAULT_PIN_ROWS as f32).sqrt(),
            mean_position: DEFAULT_MEAN,
            row_height: ROW_HEIGHT,
            bin_height: BIN_HEIGHT,
            ball_width: BALL_WIDTH,
        }
    }
}

/// A validated, immutable board
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoardGeometry", into = "BoardGeometry")]
pub struct Board {
    geometry: BoardGeometry,
}

impl TryFrom<BoardGeometry> for Board {
    type Error = PlinkoError;

    fn try_from(geometry: BoardGeometry) -> Result<Self> {
        Board::new(geometry)
    }
}

impl From<Board> for BoardGeometry {
    fn from(board: Board) -> Self {
        board.geometry
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PlinkoError::InvalidBoard(format!(
            "{name} must be finite and positive, got {value}"
        )))
    }
}

impl Board {
    pub fn new(geometry: BoardGeometry) -> Result<Self> {
        if geometry.pin_rows == 0 {
            return Err(PlinkoError::InvalidBoard(
                "pin_rows must be at least 1".to_string(),
            ));
        }
        positive("bin_width", geometry.bin_width)?;
        positive("row_height", geometry.row_height)?;
        positive("ball_width", geometry.ball_width)?;
        if !geometry.mean_position.is_finite() {
            return Err(PlinkoError::InvalidBoard(format!(
                "mean_position must be finite, got {}",
                geometry.mean_position
            )));
        }
        if !geometry.bin_height.is_finite() || geometry.bin_height < 0.0 {
            return Err(PlinkoError::InvalidBoard(format!(
                "bin_height must be finite and non-negative, got {}",
                geometry.bin_height
            )));
        }
        Ok(Self { geometry })
    }

    #[inline]
    pub fn geometry(&self) -> &BoardGeometry {
        &self.geometry
    }

    #[inline]
    pub fn pin_rows(&self) -> u32 {
        self.geometry.pin_rows
    }

    #[inline]
    pub fn bin_width(&self) -> f32 {
        self.geometry.bin_width
    }

    #[inline]
    pub fn mean_position(&self) -> f32 {
        self.geometry.mean_position
    }

    #[inline]
    pub fn row_height(&self) -> f32 {
        self.geometry.row_height
    }

    #[inline]
    pub fn ball_width(&self) -> f32 {
        self.geometry.ball_width
    }

    /// Number of slots at the bottom (one more than the row count)
    #[inline]
    pub fn n_bins(&self) -> u32 {
        self.geometry.pin_rows + 1
    }

    /// Slot index under the apex; a half-integer when the row count is odd
    #[inline]
    pub fn center_bin(&self) -> f32 {
        self.geometry.pin_rows as f32 / 2.0
    }

    /// Total height from the floor of the bins to the top pin row
    #[inline]
    pub fn height(&self) -> f32 {
        self.geometry.bin_height + self.geometry.pin_rows as f32 * self.geometry.row_height
    }

    /// Vertical ball center after `move_index` steps
    #[inline]
    pub fn row_y(&self, move_index: u32) -> f32 {
        self.height() - move_index as f32 * self.geometry.row_height + self.geometry.ball_width / 2.0
    }

    /// Horizontal position for a signed sum of half-bin steps
    #[inline]
    pub fn position_for_offset(&self, net_steps: i32) -> f32 {
        self.geometry.mean_position + net_steps as f32 * self.geometry.bin_width / 2.0
    }

    /// Net half-bin displacement that ends in `slot` (slot = number of right steps)
    #[inline]
    pub fn net_steps_for_bin(&self, slot: u32) -> i32 {
        2 * slot as i32 - self.geometry.pin_rows as i32
    }

    /// Horizontal center of a slot
    pub fn bin_position(&self, slot: u32) -> f32 {
        self.position_for_offset(self.net_steps_for_bin(slot))
    }

    /// Resting position of the `stack_index`-th ball in `slot`
    pub fn rest_position(&self, slot: u32, stack_index: u32) -> Vec2 {
        let ball_width = self.geometry.ball_width;
        Vec2::new(
            self.bin_position(slot),
            ball_width / 2.0 + stack_index as f32 * ball_width,
        )
    }

    /// Pin centers of one row, left to right
    pub fn pins(&self, row: u32) -> Vec<Vec2> {
        let y = self.height() - row as f32 * self.geometry.row_height;
        let r = row as i32;
        (0..=r)
            .map(|i| Vec2::new(self.position_for_offset(-r + 2 * i), y))
            .collect()
    }

    /// Whether `x` is a lattice position reachable after `move_index` steps
    pub fn is_lattice_position(&self, move_index: u32, x: f32) -> bool {
        let half = self.geometry.bin_width / 2.0;
        let k = ((x - self.geometry.mean_position) / half).round();
        let tolerance = half * 1e-3 + x.abs() * f32::EPSILON * 4.0;
        k.abs() <= move_index as f32
            && (k as i64 - move_index as i64).rem_euclid(2) == 0
            && approx_eq(self.position_for_offset(k as i32), x, tolerance)
    }
}
