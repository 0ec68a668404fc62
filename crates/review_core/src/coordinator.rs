//! Review pipeline: applies events to session state and returns the effects
//! (backend requests, draws) the runtime must carry out.
//!
//! Every backend request carries a `RequestToken`. A completion is applied
//! only if its token is still the one the reviewer is waiting on; anything
//! else was superseded by a later cursor move or folder load and is dropped.

use shared::{
    domain::{Decision, FileEntry},
    protocol::{FolderResponse, MoleculeResponse},
};
use tracing::{debug, info, warn};

use crate::{
    dispatcher::{Focus, Intent, Key},
    navigation::{advance_index, previous_index, Advance, Back},
    session::{FolderSession, Progress, SessionManager},
};

pub type RequestToken = u64;

const RENDER_FAILURE: &str = "Failed to visualize molecule";
const ALL_REVIEWED: &str = "All molecules reviewed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewErrorKind {
    Load,
    ContentFetch,
    Render,
    Persistence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    /// Accept and decline.
    pub decide: bool,
    pub back: bool,
    /// Submit-folder and browse-folder.
    pub folder: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            decide: false,
            back: false,
            folder: true,
        }
    }
}

/// Everything the display and input surfaces need to present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewView {
    pub status: String,
    pub last_error: Option<ReviewErrorKind>,
    pub folder_input: String,
    pub viewer_visible: bool,
    pub file_name: String,
    pub progress: Progress,
    pub banner: String,
    pub controls: Controls,
}

#[derive(Debug, Clone)]
pub enum ReviewEvent {
    Intent(Intent),
    Key {
        key: Key,
        focus: Focus,
    },
    FolderPicked {
        token: RequestToken,
        result: Result<String, String>,
    },
    FolderListed {
        token: RequestToken,
        result: Result<FolderResponse, String>,
    },
    DecisionSaved {
        token: RequestToken,
        path: String,
        decision: Decision,
        result: Result<(), String>,
    },
    MoleculeFetched {
        token: RequestToken,
        result: Result<MoleculeResponse, String>,
    },
    Rendered {
        token: RequestToken,
        result: Result<(), String>,
    },
    SurfaceResized,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    PickFolder {
        token: RequestToken,
    },
    ListFolder {
        token: RequestToken,
        folder: String,
    },
    SubmitDecision {
        token: RequestToken,
        path: String,
        decision: Decision,
    },
    FetchMolecule {
        token: RequestToken,
        path: String,
    },
    /// clear, resize, load, style, zoom-to-fit, render.
    Render {
        token: RequestToken,
        molecule: MoleculeResponse,
    },
    /// resize and render the current frame.
    Redraw,
}

#[derive(Debug)]
pub struct Reviewer {
    sessions: SessionManager,
    pub(crate) view: ReviewView,
    next_token: RequestToken,
    pending_load: Option<RequestToken>,
    pending_decision: Option<RequestToken>,
    view_token: Option<RequestToken>,
}

impl Default for Reviewer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reviewer {
    pub fn new() -> Self {
        Self {
            sessions: SessionManager::new(),
            view: ReviewView::default(),
            next_token: 0,
            pending_load: None,
            pending_decision: None,
            view_token: None,
        }
    }

    pub fn view(&self) -> &ReviewView {
        &self.view
    }

    pub fn session(&self) -> Option<&FolderSession> {
        self.sessions.session()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.sessions.cursor()
    }

    pub fn current_file(&self) -> Option<&FileEntry> {
        self.sessions.current()
    }

    pub fn is_busy(&self) -> bool {
        self.pending_load.is_some() || self.pending_decision.is_some()
    }

    pub fn handle(&mut self, event: ReviewEvent) -> Vec<Effect> {
        match event {
            ReviewEvent::Intent(intent) => self.dispatch(intent),
            ReviewEvent::Key { key, focus } => self.handle_key(key, focus),
            ReviewEvent::FolderPicked { token, result } => self.on_folder_picked(token, result),
            ReviewEvent::FolderListed { token, result } => self.on_folder_listed(token, result),
            ReviewEvent::DecisionSaved {
                token,
                path,
                decision,
                result,
            } => self.on_decision_saved(token, &path, decision, result),
            ReviewEvent::MoleculeFetched { token, result } => {
                self.on_molecule_fetched(token, result)
            }
            ReviewEvent::Rendered { token, result } => {
                self.on_rendered(token, result);
                Vec::new()
            }
            ReviewEvent::SurfaceResized => vec![Effect::Redraw],
        }
    }

    fn issue_token(&mut self) -> RequestToken {
        self.next_token += 1;
        self.next_token
    }

    fn set_status(&mut self, text: impl Into<String>) {
        self.view.status = text.into();
        self.view.last_error = None;
    }

    fn set_error(&mut self, kind: ReviewErrorKind, text: impl Into<String>) {
        self.view.status = text.into();
        self.view.last_error = Some(kind);
    }

    pub(crate) fn begin_load(&mut self, folder: String) -> Vec<Effect> {
        let token = self.issue_token();
        info!(%folder, token, "loading folder");
        self.pending_load = Some(token);
        self.view.controls.folder = false;
        self.view.folder_input = folder.clone();
        self.set_status("Loading folder…");
        vec![Effect::ListFolder { token, folder }]
    }

    pub(crate) fn begin_pick(&mut self) -> Vec<Effect> {
        let token = self.issue_token();
        self.pending_load = Some(token);
        self.view.controls.folder = false;
        self.set_status("Opening folder picker…");
        vec![Effect::PickFolder { token }]
    }

    pub(crate) fn begin_decision(&mut self, decision: Decision) -> Vec<Effect> {
        let Some(file) = self.sessions.current() else {
            return Vec::new();
        };
        let (path, name) = (file.path.clone(), file.name.clone());

        let token = self.issue_token();
        debug!(%path, %decision, token, "submitting decision");
        self.pending_decision = Some(token);
        self.view.controls.decide = false;
        self.view.controls.back = false;
        self.set_status(format!("{} {name}…", decision.progressive()));
        vec![Effect::SubmitDecision {
            token,
            path,
            decision,
        }]
    }

    pub(crate) fn step_back(&mut self) -> Vec<Effect> {
        let Some(cursor) = self.sessions.cursor() else {
            return Vec::new();
        };
        match previous_index(cursor) {
            Back::To(index) => {
                self.sessions.move_cursor(index);
                self.refresh_pipeline()
            }
            Back::AtFirst => {
                self.set_status("Already at the first molecule.");
                Vec::new()
            }
        }
    }

    fn on_folder_picked(
        &mut self,
        token: RequestToken,
        result: Result<String, String>,
    ) -> Vec<Effect> {
        if self.pending_load != Some(token) {
            debug!(token, "discarding superseded folder picker response");
            return Vec::new();
        }
        self.pending_load = None;

        match result {
            Ok(folder) => self.begin_load(folder),
            Err(message) => {
                self.fail_load(message);
                Vec::new()
            }
        }
    }

    fn on_folder_listed(
        &mut self,
        token: RequestToken,
        result: Result<FolderResponse, String>,
    ) -> Vec<Effect> {
        if self.pending_load != Some(token) {
            debug!(token, "discarding superseded folder listing");
            return Vec::new();
        }
        self.pending_load = None;
        self.view.controls.folder = true;

        let loaded = result.and_then(|listing| {
            self.sessions
                .load_folder(listing)
                .map(|session| (session.len(), session.folder_path().to_string()))
                .map_err(|err| err.to_string())
        });
        let (count, folder) = match loaded {
            Ok(loaded) => loaded,
            Err(message) => {
                self.fail_load(message);
                return Vec::new();
            }
        };

        info!(%folder, count, "folder loaded");
        // Decisions in flight belong to the replaced session.
        self.pending_decision = None;
        self.view.folder_input = folder.clone();
        self.view.viewer_visible = true;
        self.set_status(format!("Loaded {count} molecules from {folder}"));
        self.refresh_pipeline()
    }

    fn fail_load(&mut self, message: String) {
        warn!(%message, "folder load failed");
        self.sessions.clear();
        self.pending_decision = None;
        self.view_token = None;
        self.view.viewer_visible = false;
        self.view.file_name.clear();
        self.view.banner.clear();
        self.view.progress = Progress::default();
        self.view.controls = Controls::default();
        self.set_error(ReviewErrorKind::Load, message);
    }

    fn on_decision_saved(
        &mut self,
        token: RequestToken,
        path: &str,
        decision: Decision,
        result: Result<(), String>,
    ) -> Vec<Effect> {
        if self.pending_decision != Some(token) {
            debug!(token, %path, "discarding decision response for a replaced session");
            return Vec::new();
        }
        self.pending_decision = None;

        let recorded = result.and_then(|()| {
            self.sessions
                .record_decision(path, decision)
                .map_err(|err| err.to_string())
        });
        let recorded = match recorded {
            Ok(recorded) => recorded,
            Err(message) => {
                warn!(%path, %decision, %message, "decision was not saved");
                self.set_error(ReviewErrorKind::Persistence, message);
                self.refresh_controls();
                return Vec::new();
            }
        };

        if let Some(previous) = recorded.previous.filter(|previous| *previous != decision) {
            info!(%path, %previous, %decision, "overwrote earlier decision");
        }
        self.view.progress = self.sessions.progress();

        let (Some(session), Some(cursor)) = (self.sessions.session(), self.sessions.cursor())
        else {
            return Vec::new();
        };
        let name = session
            .get(recorded.index)
            .map(|file| file.name.clone())
            .unwrap_or_else(|| path.to_string());
        let advance = advance_index(session.files(), cursor);
        let has_earlier_entries = session.len() > 1;

        match advance {
            Advance::To(index) => {
                self.set_status(format!("Marked {name} as {decision}."));
                self.sessions.move_cursor(index);
                self.refresh_pipeline()
            }
            Advance::NoPendingWork => {
                info!(reviewed = self.view.progress.reviewed, "all molecules reviewed");
                self.set_status(format!("Marked {name} as {decision}. {ALL_REVIEWED}"));
                self.refresh_banner();
                self.view.controls.decide = true;
                self.view.controls.back = has_earlier_entries;
                Vec::new()
            }
        }
    }

    fn on_molecule_fetched(
        &mut self,
        token: RequestToken,
        result: Result<MoleculeResponse, String>,
    ) -> Vec<Effect> {
        if self.view_token != Some(token) {
            debug!(token, "discarding stale molecule response");
            return Vec::new();
        }

        match result {
            Ok(molecule) => vec![Effect::Render { token, molecule }],
            Err(message) => {
                warn!(token, %message, "molecule fetch failed");
                self.set_error(ReviewErrorKind::ContentFetch, message);
                Vec::new()
            }
        }
    }

    fn on_rendered(&mut self, token: RequestToken, result: Result<(), String>) {
        if self.view_token != Some(token) {
            debug!(token, "discarding stale render result");
            return;
        }
        if let Err(detail) = result {
            warn!(token, %detail, "rendering engine rejected molecule");
            self.set_error(ReviewErrorKind::Render, RENDER_FAILURE);
        }
    }

    /// Runs on every cursor change: view fields, enablement, then the fetch.
    fn refresh_pipeline(&mut self) -> Vec<Effect> {
        let Some(file) = self.sessions.current().cloned() else {
            self.view_token = None;
            self.refresh_controls();
            return Vec::new();
        };

        self.view.progress = self.sessions.progress();
        self.view.file_name = file.name;
        self.refresh_banner();
        self.refresh_controls();

        let token = self.issue_token();
        self.view_token = Some(token);
        debug!(path = %file.path, token, "fetching molecule for cursor");
        vec![Effect::FetchMolecule {
            token,
            path: file.path,
        }]
    }

    fn refresh_banner(&mut self) {
        self.view.banner = match self.sessions.current().and_then(|file| file.decision) {
            Some(decision) => format!("Already marked as {decision}"),
            None => String::new(),
        };
    }

    fn refresh_controls(&mut self) {
        let idle = self.pending_decision.is_none();
        let cursor = self.sessions.cursor();
        self.view.controls.decide = idle && cursor.is_some();
        self.view.controls.back = idle && cursor.is_some_and(|cursor| cursor > 0);
    }
}

#[cfg(test)]
#[path = "tests/coordinator_tests.rs"]
mod tests;
