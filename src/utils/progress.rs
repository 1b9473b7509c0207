use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const RUNNING_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";
const FINISHED_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.green/blue}] {pos}/{len} {msg}";

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// One bar per harvest pass, advanced once per subject.
#[derive(Clone)]
pub struct ProgressTracker {
    progress_bar: ProgressBar,
}

impl ProgressTracker {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0);
        pb.set_style(style(RUNNING_TEMPLATE));
        pb.enable_steady_tick(Duration::from_millis(100));
        Self { progress_bar: pb }
    }

    /// A tracker that draws nothing; used when output is machine-readable.
    pub fn hidden() -> Self {
        Self {
            progress_bar: ProgressBar::hidden(),
        }
    }

    pub fn start_pass(&self, total: u64, pass: &str) {
        self.progress_bar.reset();
        self.progress_bar.set_style(style(RUNNING_TEMPLATE));
        self.progress_bar.set_length(total);
        self.progress_bar.set_position(0);
        self.progress_bar.set_message(pass.to_string());
    }

    pub fn update_message(&self, subject: &str, step: &str) {
        self.progress_bar.set_message(format!("[{}] {}", subject, step));
    }

    pub fn increment(&self) {
        self.progress_bar.inc(1);
    }

    pub fn finish(&self, message: &str) {
        self.progress_bar.set_style(style(FINISHED_TEMPLATE));
        self.progress_bar.finish_with_message(message.to_string());
    }

    pub fn position(&self) -> u64 {
        self.progress_bar.position()
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
