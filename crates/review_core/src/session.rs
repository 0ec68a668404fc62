//! Session state: the loaded folder, its ordered entries, and the cursor.

use std::{collections::HashSet, fmt};

use shared::{
    domain::{Decision, FileEntry},
    protocol::FolderResponse,
};
use thiserror::Error;

use crate::navigation::resume_index;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("No molecule files found in {0}")]
    EmptyFolder(String),
    #[error("Duplicate file path '{0}' in folder listing")]
    DuplicatePath(String),
    #[error("No folder is loaded")]
    NoSession,
    #[error("'{0}' is not part of the loaded folder")]
    UnknownPath(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub reviewed: usize,
    pub total: usize,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.reviewed == self.total
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.reviewed, self.total)
    }
}

/// Files of one folder in listing order, keyed by `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderSession {
    folder_path: String,
    files: Vec<FileEntry>,
}

impl FolderSession {
    pub fn new(
        folder_path: impl Into<String>,
        files: Vec<FileEntry>,
    ) -> Result<Self, SessionError> {
        let folder_path = folder_path.into();
        if files.is_empty() {
            return Err(SessionError::EmptyFolder(folder_path));
        }

        let mut seen = HashSet::with_capacity(files.len());
        for file in &files {
            if !seen.insert(file.path.as_str()) {
                return Err(SessionError::DuplicatePath(file.path.clone()));
            }
        }

        Ok(Self { folder_path, files })
    }

    /// Builds a fresh session; every entry starts pending.
    pub fn from_listing(listing: FolderResponse) -> Result<Self, SessionError> {
        Self::new(
            listing.folder,
            listing.files.into_iter().map(FileEntry::from).collect(),
        )
    }

    pub fn folder_path(&self) -> &str {
        &self.folder_path
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FileEntry> {
        self.files.get(index)
    }

    pub fn position(&self, path: &str) -> Option<usize> {
        self.files.iter().position(|file| file.path == path)
    }

    pub fn progress(&self) -> Progress {
        Progress {
            reviewed: self.files.iter().filter(|file| !file.is_pending()).count(),
            total: self.files.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedDecision {
    pub index: usize,
    /// Value overwritten by this call, if the entry was already decided.
    pub previous: Option<Decision>,
}

/// Sole owner of the active `FolderSession` and its cursor.
#[derive(Debug, Default)]
pub struct SessionManager {
    session: Option<FolderSession>,
    cursor: usize,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any previous session wholesale and places the cursor on the
    /// first pending entry.
    pub fn load_folder(&mut self, listing: FolderResponse) -> Result<&FolderSession, SessionError> {
        let session = FolderSession::from_listing(listing)?;
        self.cursor = resume_index(session.files(), 0).unwrap_or(0);
        Ok(&*self.session.insert(session))
    }

    /// Last write wins; recording the same value twice is a no-op for progress.
    pub fn record_decision(
        &mut self,
        path: &str,
        decision: Decision,
    ) -> Result<RecordedDecision, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoSession)?;
        let index = session
            .position(path)
            .ok_or_else(|| SessionError::UnknownPath(path.to_string()))?;
        let previous = session.files[index].decision.replace(decision);
        Ok(RecordedDecision { index, previous })
    }

    pub fn clear(&mut self) {
        self.session = None;
        self.cursor = 0;
    }

    pub fn session(&self) -> Option<&FolderSession> {
        self.session.as_ref()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.session.as_ref().map(|_| self.cursor)
    }

    pub fn current(&self) -> Option<&FileEntry> {
        self.session.as_ref()?.get(self.cursor)
    }

    pub fn progress(&self) -> Progress {
        self.session
            .as_ref()
            .map(FolderSession::progress)
            .unwrap_or_default()
    }

    /// Moves the cursor; out-of-range indices are refused.
    pub(crate) fn move_cursor(&mut self, index: usize) -> bool {
        match &self.session {
            Some(session) if index < session.len() => {
                self.cursor = index;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
