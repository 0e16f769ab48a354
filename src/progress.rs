//! Progress bar rendering of job events.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use mcat_core::{JobEvent, JobState};
use tracing::debug;

/// Renders the events of one job; a no-op when output is suppressed.
pub(crate) struct JobProgress {
    bar: Option<ProgressBar>,
}

impl JobProgress {
    /// Creates a progress bar on stderr, or a silent renderer when `enabled` is false.
    pub(crate) fn new(enabled: bool) -> Self {
        if !enabled {
            return Self { bar: None };
        }
        Self::with_bar(ProgressBar::with_draw_target(
            Some(0),
            ProgressDrawTarget::stderr(),
        ))
    }

    fn with_bar(bar: ProgressBar) -> Self {
        bar.set_style(
            ProgressStyle::with_template(
                "{prefix:.bold} [{bar:30}] {bytes}/{total_bytes} ({eta}) {wide_msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
        );
        Self { bar: Some(bar) }
    }

    /// Applies one job event to the display.
    pub(crate) fn apply(&self, event: &JobEvent) {
        let Some(bar) = &self.bar else {
            return;
        };
        match event {
            JobEvent::Title(title) => bar.set_prefix(title.clone()),
            JobEvent::State(state) => {
                debug!(?state, "job state");
                if *state == JobState::Connected {
                    bar.reset_eta();
                }
            }
            JobEvent::Progress { current, total } => {
                bar.set_length(*total);
                bar.set_position(*current);
            }
            JobEvent::Message(file) => bar.set_message(file.clone()),
        }
    }

    /// Removes the bar from the terminal.
    pub(crate) fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
