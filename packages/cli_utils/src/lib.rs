#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal helpers shared by the report binaries.
//!
//! [`IndicatifProgress`] adapts `indicatif` bars to the loader's
//! [`ProgressCallback`]; [`init_logger`] routes `log` output through the
//! same [`MultiProgress`] so log lines and bars do not overwrite each other.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use sinaloa_report_source::progress::ProgressCallback;

pub use indicatif::MultiProgress;

const TICK: Duration = Duration::from_millis(120);

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn counted_style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

/// A progress bar reporting through [`ProgressCallback`].
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Applied on `set_total`, replacing the spinner.
    counted: ProgressStyle,
}

impl IndicatifProgress {
    /// Spinner while the dataset count is unknown, then a bar of
    /// `loaded/total` files.
    #[must_use]
    pub fn datasets_bar(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.set_style(spinner_style());
        bar.enable_steady_tick(TICK);
        bar.set_message(message.to_owned());

        Arc::new(Self {
            bar,
            counted: counted_style("  {msg:<40} [{bar:30.cyan/blue}] {pos}/{len} files"),
        })
    }

    /// Bar over a known number of report sections.
    #[must_use]
    pub fn sections_bar(
        multi: &MultiProgress,
        message: &str,
        total: u64,
    ) -> Arc<dyn ProgressCallback> {
        let counted = counted_style("{msg:<40} [{bar:30.green/white}] {pos}/{len} ({elapsed})");
        let bar = multi.add(ProgressBar::new(total));
        bar.set_style(counted.clone());
        bar.set_message(message.to_owned());

        Arc::new(Self { bar, counted })
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_style(self.counted.clone());
        self.bar.set_length(total);
        self.bar.reset();
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Installs a `pretty_env_logger` logger (filtered by `RUST_LOG`) behind
/// `indicatif-log-bridge` and returns the [`MultiProgress`] every bar must
/// be added to.
///
/// Calling it twice is harmless: the second logger is discarded.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_timed_builder()
        .parse_env("RUST_LOG")
        .build();
    let max_level = logger.filter();

    if indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .is_ok()
    {
        log::set_max_level(max_level);
    }

    multi
}
