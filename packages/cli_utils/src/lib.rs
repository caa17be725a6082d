#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for Saarthi Net.
//!
//! Provides an `indicatif` spinner behind the [`LoadingReporter`] trait,
//! plus [`init_logger`] which sets up `indicatif-log-bridge` so that
//! `log::info!` and friends are suspended while the spinner redraws.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use saarthi_net_api::progress::LoadingReporter;

pub use indicatif::MultiProgress;

/// An `indicatif` spinner that implements [`LoadingReporter`].
///
/// The spinner is created hidden and only appears once a refresh starts,
/// so a dashboard served entirely from cache never flashes it.
pub struct IndicatifSpinner {
    multi: MultiProgress,
    bar: Mutex<Option<ProgressBar>>,
}

impl IndicatifSpinner {
    #[must_use]
    pub fn new(multi: &MultiProgress) -> Arc<dyn LoadingReporter> {
        Arc::new(Self {
            multi: multi.clone(),
            bar: Mutex::new(None),
        })
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock()
            && let Some(bar) = guard.as_ref()
        {
            f(bar);
        }
    }

    fn take_bar(&self) -> Option<ProgressBar> {
        self.bar.lock().ok().and_then(|mut guard| guard.take())
    }
}

impl LoadingReporter for IndicatifSpinner {
    fn start(&self, msg: String) {
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(msg);

        if let Ok(mut guard) = self.bar.lock()
            && let Some(previous) = guard.replace(bar)
        {
            previous.finish_and_clear();
        }
    }

    fn set_message(&self, msg: String) {
        self.with_bar(|bar| bar.set_message(msg));
    }

    fn finish(&self, msg: String) {
        if let Some(bar) = self.take_bar() {
            bar.set_style(
                ProgressStyle::with_template("{msg:.yellow}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.finish_with_message(msg);
        }
    }

    fn finish_and_clear(&self) {
        if let Some(bar) = self.take_bar() {
            bar.finish_and_clear();
        }
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// `log::info!` and friends are suspended while progress bars redraw.
///
/// Returns the [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    // Build the pretty-env-logger logger manually so we can wrap it.
    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // Ignore error if logger was already set (e.g., in tests)

    log::set_max_level(level);

    multi
}
