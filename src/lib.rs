//! Presidential Plinko - an electoral forecast on a Galton board
//!
//! Core modules:
//! - `sim`: Deterministic board geometry, path construction and frame evaluation
//! - `fit`: Binomial approximation of a forecast distribution
//! - `export`: JSON hand-off to the external renderer
//! - `plan`: Settings to export in one call
//! - `settings`: Run configuration

pub mod error;
pub mod export;
pub mod fit;
pub mod plan;
pub mod settings;
pub mod sim;

pub use error::{PlinkoError, Result};
pub use plan::plan;
pub use settings::{Settings, TargetMode};

/// Default board and animation constants
pub mod consts {
    /// Electoral votes needed to win, used as the default board center
    pub const DEFAULT_MEAN: f32 = 270.0;
    /// Default forecast standard deviation (electoral votes)
    pub const DEFAULT_SD: f32 = 60.0;
    /// Default number of pin rows
    pub const DEFAULT_PIN_ROWS: u32 = 16;

    /// Vertical distance between pin rows
    pub const ROW_HEIGHT: f32 = 10.0;
    /// Height of the slot area below the last pin row
    pub const BIN_HEIGHT: f32 = 60.0;
    /// Ball diameter, also the stacking pitch inside a bin
    pub const BALL_WIDTH: f32 = 4.0;
    /// Clearance above the board where balls spawn
    pub const DROP_HEIGHT: f32 = 20.0;

    /// Default number of balls dropped per run
    pub const DEFAULT_BALLS: usize = 100;
    /// Animation ticks spent on each path point
    pub const TICKS_PER_MOVE: u32 = 2;
    /// Ticks between successive ball releases
    pub const RELEASE_INTERVAL: u32 = 1;
    /// Ticks the final frame is held after the last ball lands
    pub const HOLD_TICKS: u32 = 30;
}

/// Approximate float equality used for lattice checks
#[inline]
pub fn approx_eq(a: f32, b: f32, tolerance: f32) -> bool {
    (a - b).abs() <= tolerance
}
