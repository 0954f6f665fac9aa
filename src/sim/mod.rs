//! Deterministic board simulation
//!
//! Path construction is pure and reproducible:
//! - Seeded RNG only
//! - Stable iteration order (by ball ID)
//! - Stack positions assigned before any path is built
//! - No rendering or I/O

pub mod board;
pub mod frame;
pub mod path;
pub mod state;

pub use board::{Board, BoardGeometry};
pub use frame::{BallView, Frame, Timeline};
pub use path::{Move, Path, Step, build_path, construct_steps, place_moves, validate_target};
pub use state::{Ball, BinStacks, DropRun, RngState};
