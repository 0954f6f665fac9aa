//! Run settings
//!
//! Stored as JSON. Every field has a default, so a partial file only needs
//! the values it changes.

use std::path::Path as FsPath;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{PlinkoError, Result};
use crate::fit::{Forecast, MAX_PIN_ROWS};
use crate::sim::Timeline;

/// How balls are assigned their target slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetMode {
    /// Evenly spaced quantiles of the fitted binomial
    #[default]
    Quantile,
    /// Independent draws from the fitted binomial
    Sample,
}

impl TargetMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetMode::Quantile => "quantile",
            TargetMode::Sample => "sample",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quantile" | "quantiles" | "q" => Some(TargetMode::Quantile),
            "sample" | "sampled" | "s" => Some(TargetMode::Sample),
            _ => None,
        }
    }
}

/// Run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed for target sampling and path shuffling
    pub seed: u64,
    /// Number of balls to drop
    pub balls: usize,

    // === Forecast ===
    /// Forecast mean (ignored when `forecast` is set)
    pub mean: f64,
    /// Forecast standard deviation (ignored when `forecast` is set)
    pub sd: f64,
    /// Full forecast distribution, if available
    pub forecast: Option<Forecast>,
    pub target_mode: TargetMode,

    // === Board ===
    pub pin_rows: u32,
    pub row_height: f32,
    pub bin_height: f32,
    pub ball_width: f32,
    /// Spawn clearance above the board (None = no drop-in point)
    pub drop_height: Option<f32>,

    // === Animation ===
    pub timeline: Timeline,
    /// Include per-tick frames in the export
    pub include_frames: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0,
            balls: DEFAULT_BALLS,

            mean: DEFAULT_MEAN as f64,
            sd: DEFAULT_SD as f64,
            forecast: None,
            target_mode: TargetMode::Quantile,

            pin_rows: DEFAULT_PIN_ROWS,
            row_height: ROW_HEIGHT,
            bin_height: BIN_HEIGHT,
            ball_width: BALL_WIDTH,
            drop_height: Some(DROP_HEIGHT),

            timeline: Timeline::default(),
            include_frames: false,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: &FsPath) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| PlinkoError::io("reading", path, e))?;
        let settings: Self = serde_json::from_str(&json)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &FsPath) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| PlinkoError::io("writing", path, e))?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Check ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.pin_rows == 0 || self.pin_rows > MAX_PIN_ROWS {
            return Err(PlinkoError::InvalidSettings(format!(
                "pin_rows must be in 1..={MAX_PIN_ROWS}, got {}",
                self.pin_rows
            )));
        }
        // Start marker, one move per row, rest point and the optional spawn point
        let points = self.pin_rows as usize + 2 + self.drop_height.is_some() as usize;
        self.timeline.check_schedule(self.balls, points)?;
        if let Some(h) = self.drop_height {
            if !h.is_finite() || h < 0.0 {
                return Err(PlinkoError::InvalidSettings(format!(
                    "drop_height must be non-negative, got {h}"
                )));
            }
        }
        Ok(())
    }

    /// Forecast mean and sd, from the full distribution when one is given
    pub fn moments(&self) -> Result<(f64, f64)> {
        match &self.forecast {
            Some(forecast) => Ok((forecast.mean()?, forecast.std_dev()?)),
            None => Ok((self.mean, self.sd)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_mode_round_trip_names() {
        for mode in [TargetMode::Quantile, TargetMode::Sample] {
            assert_eq!(TargetMode::from_str(mode.as_str()), Some(mode));
        }
        assert_eq!(TargetMode::from_str("Q"), Some(TargetMode::Quantile));
        assert_eq!(TargetMode::from_str("physics"), None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"balls": 12, "target_mode": "sample"}"#).unwrap();
        assert_eq!(settings.balls, 12);
        assert_eq!(settings.target_mode, TargetMode::Sample);
        assert_eq!(settings.pin_rows, DEFAULT_PIN_ROWS);
        assert_eq!(settings.timeline, Timeline::default());
    }

    #[test]
    fn test_validate() {
        assert!(Settings::default().validate().is_ok());

        let no_rows = Settings {
            pin_rows: 0,
            ..Default::default()
        };
        assert!(matches!(no_rows.validate(), Err(PlinkoError::InvalidSettings(_))));

        let negative_drop = Settings {
            drop_height: Some(-1.0),
            ..Default::default()
        };
        assert!(negative_drop.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_overflowing_schedule() {
        let json = r#"{"balls":3,"timeline":{"ticks_per_move":1,"release_interval":3000000000,"hold_ticks":0}}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert!(matches!(settings.validate(), Err(PlinkoError::InvalidSettings(_))));
        assert!(crate::plan(&settings).is_err());

        let single = Settings {
            balls: 1,
            ..settings
        };
        assert!(single.validate().is_ok());
    }

    #[test]
    fn test_moments_prefer_forecast() {
        let mut settings = Settings::default();
        assert_eq!(settings.moments().unwrap(), (DEFAULT_MEAN as f64, DEFAULT_SD as f64));

        settings.forecast = Some(Forecast::from_pairs([(250.0, 0.5), (290.0, 0.5)]));
        let (mean, sd) = settings.moments().unwrap();
        assert!((mean - 270.0).abs() < 1e-9);
        assert!((sd - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("plinko_settings_{}.json", std::process::id()));
        let settings = Settings {
            seed: 2024,
            balls: 538,
            ..Default::default()
        };
        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load(FsPath::new("/nonexistent/plinko.json")).unwrap_err();
        assert!(matches!(err, PlinkoError::Io { .. }));
    }
}
