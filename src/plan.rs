//! End-to-end planning: settings in, renderer export out

use rand_pcg::Pcg32;

use crate::error::Result;
use crate::export::Export;
use crate::fit::BinomialFit;
use crate::settings::{Settings, TargetMode};
use crate::sim::DropRun;

/// Stream used for target sampling, kept apart from the path stream
const TARGET_STREAM: u64 = 0x7a26_e7a9;

/// Fit the forecast, assign target slots and build every path
pub fn plan(settings: &Settings) -> Result<Export> {
    settings.validate()?;

    let (mean, sd) = settings.moments()?;
    let fit = BinomialFit::with_rows(mean, sd, settings.pin_rows)?;
    let board = fit.board(settings.row_height, settings.bin_height, settings.ball_width)?;

    let bins = match settings.target_mode {
        TargetMode::Quantile => fit.quantile_bins(settings.balls),
        TargetMode::Sample => {
            let mut rng = Pcg32::new(settings.seed, TARGET_STREAM);
            fit.sample_bins(&mut rng, settings.balls)
        }
    };

    let mut run = DropRun::new(settings.seed, board);
    run.add_balls(&bins)?;
    let paths = run.build_paths(settings.drop_height)?;

    log::info!(
        "Planned {} balls ({} targets) on {} rows",
        run.balls.len(),
        settings.target_mode.as_str(),
        board.pin_rows()
    );

    Ok(Export::new(&run, paths, settings.timeline, settings.include_frames).with_fit(fit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan() {
        let export = plan(&Settings::default()).unwrap();
        assert_eq!(export.balls.len(), crate::consts::DEFAULT_BALLS);
        assert_eq!(export.paths.len(), export.balls.len());
        assert!(export.fit.is_some());
        for (ball, path) in export.balls.iter().zip(&export.paths) {
            assert_eq!(path.rest.x, export.board.bin_position(ball.final_bin));
            assert_eq!(path.net_steps(), export.board.net_steps_for_bin(ball.final_bin));
        }
    }

    #[test]
    fn test_plan_is_reproducible() {
        let settings = Settings {
            seed: 538,
            balls: 40,
            target_mode: TargetMode::Sample,
            include_frames: true,
            ..Default::default()
        };
        let a = plan(&settings).unwrap();
        let b = plan(&settings).unwrap();
        assert_eq!(a.balls, b.balls);
        assert_eq!(a.paths, b.paths);
        assert_eq!(a.frames, b.frames);

        let other = plan(&Settings { seed: 539, ..settings }).unwrap();
        assert_ne!(a.paths, other.paths);
    }

    #[test]
    fn test_zero_balls() {
        let export = plan(&Settings {
            balls: 0,
            include_frames: true,
            ..Default::default()
        })
        .unwrap();
        assert!(export.paths.is_empty());
        assert_eq!(export.frame_count, 0);
        assert!(export.frames.is_empty());
    }

    #[test]
    fn test_odd_row_count_board() {
        let export = plan(&Settings {
            pin_rows: 7,
            balls: 25,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(export.board.center_bin(), 3.5);
        assert!(export.paths.iter().all(|p| p.moves.len() == 8));
    }
}
