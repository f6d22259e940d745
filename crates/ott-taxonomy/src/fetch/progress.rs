//! Progress bars for downloads

use indicatif::{ProgressBar, ProgressStyle};

const DOWNLOAD_TEMPLATE: &str =
    "{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})";

/// Create a progress bar for a file download; hidden unless `visible`
///
/// A `size` of zero (unknown content length) yields a spinner-style bar.
pub fn download_progress(size: u64, message: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(size);
    if let Ok(style) = ProgressStyle::default_bar().template(DOWNLOAD_TEMPLATE) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(message.to_string());
    pb
}
