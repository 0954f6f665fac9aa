//! Animation timeline
//!
//! Maps animation ticks onto path points. Balls are released one after
//! another; each point of a path is shown for `ticks_per_move` ticks and
//! the ball then stays at its rest point.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::path::Path;
use crate::consts::*;
use crate::error::{PlinkoError, Result};

/// Pacing of the animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    /// Ticks each path point stays visible (at least 1)
    pub ticks_per_move: u32,
    /// Ticks between successive ball releases (0 = all at once)
    pub release_interval: u32,
    /// Extra ticks after the last ball lands
    pub hold_ticks: u32,
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            ticks_per_move: TICKS_PER_MOVE,
            release_interval: RELEASE_INTERVAL,
            hold_ticks: HOLD_TICKS,
        }
    }
}

/// One ball as seen in a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallView {
    pub id: u32,
    pub pos: Vec2,
    /// Index into the path's animated points
    pub point_index: usize,
    /// Ball has reached its rest point
    pub landed: bool,
}

/// All visible balls at one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub tick: u32,
    pub balls: Vec<BallView>,
}

impl Frame {
    pub fn landed_count(&self) -> usize {
        self.balls.iter().filter(|b| b.landed).count()
    }
}

impl Timeline {
    pub fn new(ticks_per_move: u32, release_interval: u32, hold_ticks: u32) -> Result<Self> {
        let timeline = Self {
            ticks_per_move,
            release_interval,
            hold_ticks,
        };
        timeline.validate()?;
        Ok(timeline)
    }

    /// Check the pacing values on their own
    pub fn validate(&self) -> Result<()> {
        if self.ticks_per_move == 0 {
            return Err(PlinkoError::InvalidSettings(
                "ticks_per_move must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Check that `balls` paths of `points` points each finish within `u32` ticks
    pub fn check_schedule(&self, balls: usize, points: usize) -> Result<()> {
        self.validate()?;
        if balls == 0 {
            return Ok(());
        }
        let end = u32::try_from(balls - 1)
            .ok()
            .and_then(|order| order.checked_mul(self.release_interval))
            .zip(u32::try_from(points.saturating_sub(1)).ok())
            .and_then(|(release, last)| {
                last.checked_mul(self.ticks_per_move)
                    .and_then(|fall| release.checked_add(fall))
            })
            .and_then(|landing| landing.checked_add(1))
            .and_then(|end| end.checked_add(self.hold_ticks));
        if end.is_none() {
            return Err(PlinkoError::InvalidSettings(format!(
                "{balls} balls released every {} ticks do not fit in a u32 tick count",
                self.release_interval
            )));
        }
        Ok(())
    }

    /// Tick at which the `order`-th ball appears, saturating at `u32::MAX`
    #[inline]
    pub fn release_tick(&self, order: usize) -> u32 {
        u32::try_from(order)
            .unwrap_or(u32::MAX)
            .saturating_mul(self.release_interval)
    }

    /// Tick at which the `order`-th ball reaches its rest point
    pub fn landing_tick(&self, order: usize, path: &Path) -> u32 {
        let last = u32::try_from(path.point_count().saturating_sub(1)).unwrap_or(u32::MAX);
        self.release_tick(order)
            .saturating_add(last.saturating_mul(self.ticks_per_move))
    }

    /// Number of ticks needed to show every ball landing plus the hold
    pub fn frame_count(&self, paths: &[Path]) -> u32 {
        paths
            .iter()
            .enumerate()
            .map(|(order, path)| self.landing_tick(order, path).saturating_add(1))
            .max()
            .map_or(0, |end| end.saturating_add(self.hold_ticks))
    }

    /// Evaluate every released ball at `tick`
    pub fn frame(&self, paths: &[Path], tick: u32) -> Frame {
        let balls = paths
            .iter()
            .enumerate()
            .filter_map(|(order, path)| {
                let elapsed = tick.checked_sub(self.release_tick(order))?;
                let last = path.point_count() - 1;
                let point_index = ((elapsed / self.ticks_per_move) as usize).min(last);
                Some(BallView {
                    id: path.ball_id,
                    pos: path.point(point_index),
                    point_index,
                    landed: point_index == last,
                })
            })
            .collect();

        Frame { tick, balls }
    }

    /// Every frame of the animation, in tick order
    pub fn frames<'a>(&'a self, paths: &'a [Path]) -> impl Iterator<Item = Frame> + 'a {
        (0..self.frame_count(paths)).map(move |tick| self.frame(paths, tick))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::board::{Board, BoardGeometry};
    use crate::sim::state::DropRun;

    fn paths(bins: &[u32], drop_height: Option<f32>) -> Vec<Path> {
        let board = Board::new(BoardGeometry {
            pin_rows: 4,
            bin_width: 10.0,
            mean_position: 0.0,
            row_height: 5.0,
            bin_height: 20.0,
            ball_width: 2.0,
        })
        .unwrap();
        let mut run = DropRun::new(7, board);
        run.add_balls(bins).unwrap();
        run.build_paths(drop_height).unwrap()
    }

    #[test]
    fn test_no_balls_no_frames() {
        let timeline = Timeline::default();
        assert_eq!(timeline.frame_count(&[]), 0);
        assert_eq!(timeline.frames(&[]).count(), 0);
    }

    #[test]
    fn test_staggered_release() {
        let p = paths(&[2, 2, 4], None);
        let timeline = Timeline::new(1, 3, 0).unwrap();

        let first = timeline.frame(&p, 0);
        assert_eq!(first.balls.len(), 1);
        assert_eq!(first.balls[0].pos, p[0].moves[0].pos);

        let later = timeline.frame(&p, 3);
        assert_eq!(later.balls.len(), 2);
        assert_eq!(later.balls[0].point_index, 3);
        assert_eq!(later.balls[1].point_index, 0);
    }

    #[test]
    fn test_frame_count_covers_last_landing() {
        // 4 rows, no spawn: 5 moves + rest = 6 points, last index 5
        let p = paths(&[0, 4], None);
        let timeline = Timeline::new(2, 1, 10).unwrap();
        assert_eq!(timeline.landing_tick(1, &p[1]), 1 + 5 * 2);
        assert_eq!(timeline.frame_count(&p), 12 + 10);

        let last = timeline.frames(&p).last().unwrap();
        assert_eq!(last.landed_count(), 2);
        assert_eq!(last.balls[0].pos, p[0].rest);
        assert_eq!(last.balls[1].pos, p[1].rest);
    }

    #[test]
    fn test_ball_lands_exactly_on_landing_tick() {
        let p = paths(&[1], Some(8.0));
        let timeline = Timeline::new(3, 0, 0).unwrap();
        let landing = timeline.landing_tick(0, &p[0]);
        assert!(!timeline.frame(&p, landing - 1).balls[0].landed);
        assert!(timeline.frame(&p, landing).balls[0].landed);
        assert_eq!(timeline.frame(&p, 0).balls[0].pos, p[0].spawn.unwrap());
    }

    #[test]
    fn test_rejects_zero_ticks_per_move() {
        assert!(Timeline::new(0, 1, 1).is_err());
    }

    #[test]
    fn test_schedule_overflow_rejected() {
        let timeline = Timeline::new(1, 3_000_000_000, 0).unwrap();
        assert!(timeline.check_schedule(1, 10).is_ok());
        assert!(matches!(
            timeline.check_schedule(3, 10),
            Err(PlinkoError::InvalidSettings(_))
        ));

        let slow = Timeline::new(u32::MAX / 4, 0, 0).unwrap();
        assert!(slow.check_schedule(1, 10).is_err());

        let held = Timeline::new(1, 1, u32::MAX).unwrap();
        assert!(held.check_schedule(2, 2).is_err());
        assert!(held.check_schedule(0, 2).is_ok());
    }

    #[test]
    fn test_huge_release_interval_saturates() {
        let p = paths(&[2, 2, 4], None);
        let timeline = Timeline {
            ticks_per_move: 1,
            release_interval: 3_000_000_000,
            hold_ticks: 0,
        };
        assert_eq!(timeline.release_tick(2), u32::MAX);
        assert_eq!(timeline.frame_count(&p), u32::MAX);
        assert_eq!(timeline.frame(&p, 0).balls.len(), 1);
    }
}
