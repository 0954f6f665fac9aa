//! Binomial approximation of a forecast distribution
//!
//! A board with P rows and fair pins is a symmetric binomial over P trials.
//! Slot k sits at `mean + (k - P/2) * bin_width`, so the landing position
//! has variance `P * bin_width² / 4`. Matching that to a forecast's mean and
//! standard deviation fixes either the row count or the bin width.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{PlinkoError, Result};
use crate::sim::{Board, BoardGeometry};

/// Largest board the fit will produce
pub const MAX_PIN_ROWS: u32 = 1000;

/// One possible forecast outcome (e.g. an electoral vote total)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub value: f64,
    pub probability: f64,
}

/// A discrete forecast distribution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub outcomes: Vec<Outcome>,
}

impl Forecast {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self {
            outcomes: pairs
                .into_iter()
                .map(|(value, probability)| Outcome { value, probability })
                .collect(),
        }
    }

    fn total_mass(&self) -> Result<f64> {
        if let Some(bad) = self
            .outcomes
            .iter()
            .find(|o| !o.value.is_finite() || !o.probability.is_finite() || o.probability < 0.0)
        {
            return Err(PlinkoError::InvalidForecast(format!(
                "bad outcome {} with probability {}",
                bad.value, bad.probability
            )));
        }
        let total: f64 = self.outcomes.iter().map(|o| o.probability).sum();
        if total <= 0.0 {
            return Err(PlinkoError::InvalidForecast(
                "forecast has no probability mass".to_string(),
            ));
        }
        Ok(total)
    }

    /// Probability-weighted mean (probabilities need not sum to 1)
    pub fn mean(&self) -> Result<f64> {
        let total = self.total_mass()?;
        Ok(self.outcomes.iter().map(|o| o.value * o.probability).sum::<f64>() / total)
    }

    /// Probability-weighted standard deviation
    pub fn std_dev(&self) -> Result<f64> {
        let total = self.total_mass()?;
        let mean = self.mean()?;
        let var = self
            .outcomes
            .iter()
            .map(|o| (o.value - mean).powi(2) * o.probability)
            .sum::<f64>()
            / total;
        Ok(var.sqrt())
    }
}

/// Symmetric binomial fitted to a forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinomialFit {
    pub pin_rows: u32,
    pub bin_width: f64,
    pub mean: f64,
}

fn check_moments(mean: f64, sd: f64) -> Result<()> {
    if !mean.is_finite() || !sd.is_finite() || sd <= 0.0 {
        return Err(PlinkoError::InvalidForecast(format!(
            "need a finite mean and positive sd, got mean {mean}, sd {sd}"
        )));
    }
    Ok(())
}

impl BinomialFit {
    /// Pick the row count that best matches `sd` for a fixed bin width
    pub fn from_moments(mean: f64, sd: f64, bin_width: f64) -> Result<Self> {
        check_moments(mean, sd)?;
        if !bin_width.is_finite() || bin_width <= 0.0 {
            return Err(PlinkoError::InvalidForecast(format!(
                "bin width must be positive, got {bin_width}"
            )));
        }
        let rows = (4.0 * sd * sd / (bin_width * bin_width)).round();
        if rows > MAX_PIN_ROWS as f64 {
            return Err(PlinkoError::InvalidForecast(format!(
                "sd {sd} needs {rows} rows at bin width {bin_width} (max {MAX_PIN_ROWS})"
            )));
        }
        let pin_rows = (rows as u32).max(1);
        if rows < 1.0 {
            log::warn!("sd {} is narrower than one bin; using a single row", sd);
        }
        Ok(Self {
            pin_rows,
            bin_width,
            mean,
        })
    }

    /// Pick the bin width that matches `sd` exactly for a fixed row count
    pub fn with_rows(mean: f64, sd: f64, pin_rows: u32) -> Result<Self> {
        check_moments(mean, sd)?;
        if pin_rows == 0 || pin_rows > MAX_PIN_ROWS {
            return Err(PlinkoError::InvalidForecast(format!(
                "pin rows must be in 1..={MAX_PIN_ROWS}, got {pin_rows}"
            )));
        }
        Ok(Self {
            pin_rows,
            bin_width: 2.0 * sd / (pin_rows as f64).sqrt(),
            mean,
        })
    }

    /// Fit a forecast with a fixed row count
    pub fn fit(forecast: &Forecast, pin_rows: u32) -> Result<Self> {
        let fit = Self::with_rows(forecast.mean()?, forecast.std_dev()?, pin_rows)?;
        log::info!(
            "Fitted {} rows, bin width {:.3}, mean {:.2}",
            fit.pin_rows,
            fit.bin_width,
            fit.mean
        );
        Ok(fit)
    }

    /// Standard deviation of the landing position
    pub fn std_dev(&self) -> f64 {
        self.bin_width * (self.pin_rows as f64).sqrt() / 2.0
    }

    /// Position of slot k's center
    pub fn slot_value(&self, slot: u32) -> f64 {
        self.mean + (slot as f64 - self.pin_rows as f64 / 2.0) * self.bin_width
    }

    /// Slot probabilities, index = slot
    pub fn pmf_table(&self) -> Vec<f64> {
        let n = self.pin_rows;
        let ln_half_n = n as f64 * std::f64::consts::LN_2;
        // ln C(n, k) built incrementally: C(n, k) = C(n, k-1) * (n-k+1) / k
        let mut ln_choose = 0.0;
        (0..=n)
            .map(|k| {
                if k > 0 {
                    ln_choose += ((n - k + 1) as f64).ln() - (k as f64).ln();
                }
                (ln_choose - ln_half_n).exp()
            })
            .collect()
    }

    pub fn pmf(&self, slot: u32) -> f64 {
        self.pmf_table().get(slot as usize).copied().unwrap_or(0.0)
    }

    pub fn cdf(&self, slot: u32) -> f64 {
        let end = (slot as usize + 1).min(self.pin_rows as usize + 1);
        self.pmf_table()[..end].iter().sum::<f64>().min(1.0)
    }

    /// Smallest slot whose cumulative probability reaches `q`
    pub fn quantile(&self, q: f64) -> u32 {
        quantile_in(&self.pmf_table(), q)
    }

    /// Target slots for `n` balls at the evenly spaced quantiles (i + ½) / n
    pub fn quantile_bins(&self, n: usize) -> Vec<u32> {
        let table = self.pmf_table();
        (0..n)
            .map(|i| quantile_in(&table, (i as f64 + 0.5) / n as f64))
            .collect()
    }

    /// Target slots for `n` balls drawn as P fair coin flips each
    pub fn sample_bins<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Vec<u32> {
        (0..n)
            .map(|_| (0..self.pin_rows).filter(|_| rng.random_bool(0.5)).count() as u32)
            .collect()
    }

    /// Board whose slots sit at this fit's slot values
    pub fn board(&self, row_height: f32, bin_height: f32, ball_width: f32) -> Result<Board> {
        Board::new(BoardGeometry {
            pin_rows: self.pin_rows,
            bin_width: self.bin_width as f32,
            mean_position: self.mean as f32,
            row_height,
            bin_height,
            ball_width,
        })
    }
}

fn quantile_in(table: &[f64], q: f64) -> u32 {
    let q = q.clamp(0.0, 1.0);
    let mut cumulative = 0.0;
    for (slot, p) in table.iter().enumerate() {
        cumulative += p;
        if cumulative >= q {
            return slot as u32;
        }
    }
    // Rounding can leave the total a hair under 1
    table.len().saturating_sub(1) as u32
}
