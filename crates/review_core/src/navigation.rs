//! Cursor movement rules over an ordered file list.

use shared::domain::FileEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    To(usize),
    /// Every entry is decided; the cursor stays where it is.
    NoPendingWork,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Back {
    To(usize),
    AtFirst,
}

/// First pending index at or after `start`, or the last index when everything
/// from `start` on is decided. `None` only for an empty list.
pub fn resume_index(files: &[FileEntry], start: usize) -> Option<usize> {
    let last = files.len().checked_sub(1)?;
    Some(
        files
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, file)| file.is_pending())
            .map(|(index, _)| index)
            .unwrap_or(last),
    )
}

/// Next pending index after `current`, wrapping to the front of the list.
pub fn advance_index(files: &[FileEntry], current: usize) -> Advance {
    let forward = files
        .iter()
        .enumerate()
        .skip(current.saturating_add(1))
        .find(|(_, file)| file.is_pending());
    let wrapped = || files.iter().enumerate().find(|(_, file)| file.is_pending());

    match forward.or_else(wrapped) {
        Some((index, _)) => Advance::To(index),
        None => Advance::NoPendingWork,
    }
}

pub fn previous_index(current: usize) -> Back {
    match current.checked_sub(1) {
        Some(index) => Back::To(index),
        None => Back::AtFirst,
    }
}

#[cfg(test)]
#[path = "tests/navigation_tests.rs"]
mod tests;
