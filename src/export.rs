//! JSON hand-off to the renderer
//!
//! The renderer receives the board, every ball with its slot, every path
//! and (optionally) the per-tick frames. Nothing here draws anything.

use std::path::Path as FsPath;

use serde::{Deserialize, Serialize};

use crate::error::{PlinkoError, Result};
use crate::fit::BinomialFit;
use crate::sim::{Ball, Board, DropRun, Frame, Path, Timeline};

/// Everything the renderer needs for one animation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Export {
    pub seed: u64,
    pub board: Board,
    pub fit: Option<BinomialFit>,
    pub balls: Vec<Ball>,
    pub paths: Vec<Path>,
    pub timeline: Timeline,
    pub frame_count: u32,
    /// Per-tick frames; empty unless requested
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<Frame>,
}

impl Export {
    pub fn new(run: &DropRun, paths: Vec<Path>, timeline: Timeline, with_frames: bool) -> Self {
        let frames = if with_frames {
            timeline.frames(&paths).collect()
        } else {
            Vec::new()
        };
        Self {
            seed: run.seed(),
            board: run.board,
            fit: None,
            balls: run.balls.clone(),
            frame_count: timeline.frame_count(&paths),
            paths,
            timeline,
            frames,
        }
    }

    pub fn with_fit(mut self, fit: BinomialFit) -> Self {
        self.fit = Some(fit);
        self
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &FsPath) -> Result<()> {
        let json = self.to_json_string()?;
        std::fs::write(path, json).map_err(|e| PlinkoError::io("writing", path, e))?;
        log::info!(
            "Wrote {} paths and {} frames to {}",
            self.paths.len(),
            self.frames.len(),
            path.display()
        );
        Ok(())
    }

    pub fn read_json(path: &FsPath) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| PlinkoError::io("reading", path, e))?;
        let export: Self = serde_json::from_str(&json)?;
        let points = export.paths.iter().map(Path::point_count).max().unwrap_or(0);
        export.timeline.check_schedule(export.paths.len(), points)?;
        Ok(export)
    }
}
