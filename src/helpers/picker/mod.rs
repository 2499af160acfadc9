use std::fmt::Display;
use std::io;

use termenu::{Item, Menu};

#[derive(thiserror::Error, Debug)]
pub enum PickerError {
    #[error("failed to init menu: {0}")]
    Init(#[source] io::Error),
    #[error("menu error: {0}")]
    Select(#[source] io::Error),
}

/// A titled, fzf-like terminal menu over a list of displayable entries.
pub struct Picker<T> {
    title: String,
    entries: Vec<T>,
}

impl<T: Display> Picker<T> {
    pub fn new(title: impl Into<String>, entries: Vec<T>) -> Self {
        Self {
            title: title.into(),
            entries,
        }
    }

    /// Show the menu; `Ok(None)` when the user cancels.
    pub fn pick_index(&self) -> Result<Option<usize>, PickerError> {
        let mut menu = Menu::new().map_err(PickerError::Init)?;

        let list: Vec<Item<usize>> = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| Item::new(&entry.to_string(), idx))
            .collect();

        let selected = menu
            .set_title(self.title.as_str())
            .add_list(list)
            .select()
            .map_err(PickerError::Select)?;

        Ok(selected.copied())
    }

    /// Show the menu and hand back the chosen entry itself.
    pub fn pick(mut self) -> Result<Option<T>, PickerError> {
        Ok(self.pick_index()?.map(|idx| self.entries.swap_remove(idx)))
    }
}
