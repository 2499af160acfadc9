pub mod download;
pub mod picker;

use self::picker::Picker;
use anyhow::Result;
use anyhow::bail;
use indicatif::ProgressBar;
use std::fmt::Display;
use std::time::Duration;

/// Spinner shown on stderr while a page is being fetched.
pub fn loading_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Wrapper around the `termenu` picker that keeps the UX consistent across the
/// project. Returns the position of the chosen item so callers can map it back
/// to whatever the labels were built from.
pub fn choose_index<S: Display>(title: &str, items: &[S]) -> Result<usize> {
    if items.is_empty() {
        bail!("Nothing to choose from for '{title}'");
    }
    match Picker::new(title, items.iter().collect()).pick_index()? {
        Some(idx) => Ok(idx),
        None => bail!("No selection made"),
    }
}

/// Like [`choose_index`], but hands back the chosen item.
pub fn choose_one<T: Display>(title: &str, items: Vec<T>) -> Result<T> {
    if items.is_empty() {
        bail!("Nothing to choose from for '{title}'");
    }
    match Picker::new(title, items).pick()? {
        Some(choice) => Ok(choice),
        None => bail!("No selection made"),
    }
}
