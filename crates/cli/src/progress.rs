use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Stderr spinner; hidden automatically when stderr is not a terminal
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn start(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        let spinner_style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        bar.set_style(spinner_style);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Self { bar }
    }

    pub fn finish_success(&self, message: &str) {
        self.bar
            .finish_with_message(style(format!("✓ {message}")).green().to_string());
    }

    pub fn finish_error(&self, message: &str) {
        self.bar
            .finish_with_message(style(format!("✗ {message}")).red().to_string());
    }

    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}
