//! CLI-specific progress handling for stream-relay
//!
//! Provides the progress bar shown on stderr while bytes are relayed.

use indicatif::{ProgressBar, ProgressStyle};
use stream_relay::ProgressCallback;

/// Creates a progress bar for CLI display, sized once the content length is known
pub fn create_progress_bar(total_size: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {bytes_per_sec} ETA: {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
    );
    pb
}

/// Progress manager for relay operations
pub struct ProgressManager {
    pub pb: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(message: &str) -> Self {
        let pb = create_progress_bar(0);

        // Print initial message to stderr
        eprintln!("{}", message);

        Self { pb }
    }

    /// Callback feeding relayed byte counts into the bar
    pub fn callback(&self) -> ProgressCallback {
        let pb = self.pb.clone();
        std::sync::Arc::new(move |relayed, total| {
            if total > 0 && pb.length().unwrap_or(0) != total {
                pb.set_length(total);
            }
            pb.set_position(relayed);
        })
    }

    /// Mark the bar as done
    pub fn finish(&self) {
        self.pb.finish_with_message("✅ Transfer completed!");
    }
}
