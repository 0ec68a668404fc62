//! Input dispatch: maps intents and keystrokes onto the reviewer, honoring
//! control enablement.

use shared::domain::Decision;
use tracing::debug;

use crate::coordinator::{Controls, Effect, Reviewer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Accept,
    Decline,
    Back,
    SubmitFolder(String),
    BrowseFolder,
}

impl Intent {
    pub fn is_enabled(&self, controls: &Controls) -> bool {
        match self {
            Intent::Accept | Intent::Decline => controls.decide,
            Intent::Back => controls.back,
            Intent::SubmitFolder(_) | Intent::BrowseFolder => controls.folder,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowRight,
    ArrowLeft,
    ArrowUp,
    ArrowDown,
    Enter,
    Backspace,
    Char(char),
}

/// Where keyboard focus sits when a key arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Document,
    TextEntry,
}

pub fn intent_for_key(key: Key, focus: Focus) -> Option<Intent> {
    if focus == Focus::TextEntry {
        return None;
    }
    match key {
        Key::ArrowRight | Key::Enter | Key::Char('a' | 'A') => Some(Intent::Accept),
        Key::ArrowLeft | Key::Char('d' | 'D') => Some(Intent::Decline),
        Key::ArrowUp | Key::Backspace | Key::Char('b' | 'B') => Some(Intent::Back),
        _ => None,
    }
}

impl Reviewer {
    /// Disabled intents are dropped without touching state; this is what keeps
    /// a second submission out while a request is outstanding.
    pub fn dispatch(&mut self, intent: Intent) -> Vec<Effect> {
        if !intent.is_enabled(&self.view.controls) {
            debug!(?intent, "ignoring intent for disabled control");
            return Vec::new();
        }

        match intent {
            Intent::Accept => self.begin_decision(Decision::Accept),
            Intent::Decline => self.begin_decision(Decision::Decline),
            Intent::Back => self.step_back(),
            Intent::SubmitFolder(folder) => {
                let folder = folder.trim();
                if folder.is_empty() {
                    return Vec::new();
                }
                self.begin_load(folder.to_string())
            }
            Intent::BrowseFolder => self.begin_pick(),
        }
    }

    pub fn handle_key(&mut self, key: Key, focus: Focus) -> Vec<Effect> {
        if self.session().is_none() {
            return Vec::new();
        }
        match intent_for_key(key, focus) {
            Some(intent) => self.dispatch(intent),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
