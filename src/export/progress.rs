//! Progress tracking for export operations
//!
//! The total is only known after the first page arrives, so the tracker
//! starts as a spinner and switches to a bar once a total is reported.

use std::time::Instant;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Progress tracker for export operations
pub struct ProgressTracker {
    /// Documents written so far
    processed: u64,
    start_time: Instant,
    /// Progress bar (disabled when stderr is not wanted)
    bar: Option<ProgressBar>,
}

impl ProgressTracker {
    /// # Arguments
    /// * `enable_bar` - Whether to draw a progress bar on stderr
    pub fn new(enable_bar: bool) -> Self {
        let bar = enable_bar.then(|| {
            let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
            let template = "{spinner:.green} {pos} documents {msg}";
            if let Ok(style) = ProgressStyle::default_spinner().template(template) {
                bar.set_style(style);
            }
            bar
        });

        Self {
            processed: 0,
            start_time: Instant::now(),
            bar,
        }
    }

    /// Tracker that never draws
    pub fn hidden() -> Self {
        Self::new(false)
    }

    /// Record the total reported by the page source
    pub fn set_total(&self, total: u64) {
        if let Some(ref bar) = self.bar {
            if bar.length() != Some(total) {
                bar.set_length(total);
                if let Ok(style) = ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                {
                    bar.set_style(style.progress_chars("#>-"));
                }
            }
        }
    }

    /// Update progress with the number of documents written so far
    pub fn update(&mut self, count: u64) {
        self.processed = count;

        if let Some(ref bar) = self.bar {
            bar.set_position(count);

            let elapsed = self.start_time.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                let speed = count as f64 / elapsed;
                bar.set_message(format!("({:.0} docs/sec)", speed));
            }
        }
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Finish and clear the progress bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
