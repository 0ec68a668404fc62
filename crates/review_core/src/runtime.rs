//! Effect execution: backend requests run concurrently as futures, draws run
//! inline against the display surface, and every completion is fed back to the
//! `Reviewer` as an event. All state changes happen on the caller's task.

use std::{collections::VecDeque, sync::Arc};

use client_core::ReviewBackend;
use futures::{future::BoxFuture, stream::FuturesUnordered, FutureExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{
    coordinator::{Effect, ReviewEvent, ReviewView, Reviewer},
    display::{draw_molecule, redraw, DisplaySurface, RenderStyle},
};

pub struct ReviewRuntime<B, S> {
    backend: Arc<B>,
    surface: S,
    style: RenderStyle,
    reviewer: Reviewer,
    inflight: FuturesUnordered<BoxFuture<'static, ReviewEvent>>,
}

impl<B, S> ReviewRuntime<B, S>
where
    B: ReviewBackend + 'static,
    S: DisplaySurface,
{
    pub fn new(backend: Arc<B>, surface: S) -> Self {
        Self {
            backend,
            surface,
            style: RenderStyle::default(),
            reviewer: Reviewer::new(),
            inflight: FuturesUnordered::new(),
        }
    }

    pub fn reviewer(&self) -> &Reviewer {
        &self.reviewer
    }

    pub fn view(&self) -> &ReviewView {
        self.reviewer.view()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn pending_requests(&self) -> usize {
        self.inflight.len()
    }

    /// Applies one event and everything it synchronously leads to.
    pub fn submit(&mut self, event: ReviewEvent) {
        let mut queue: VecDeque<Effect> = self.reviewer.handle(event).into();
        while let Some(effect) = queue.pop_front() {
            if let Some(follow_up) = self.perform(effect) {
                queue.extend(self.reviewer.handle(follow_up));
            }
        }
    }

    fn perform(&mut self, effect: Effect) -> Option<ReviewEvent> {
        match effect {
            Effect::PickFolder { token } => {
                let backend = Arc::clone(&self.backend);
                self.spawn(async move {
                    let result = backend.pick_folder().await.map_err(|err| err.to_string());
                    ReviewEvent::FolderPicked { token, result }
                });
                None
            }
            Effect::ListFolder { token, folder } => {
                let backend = Arc::clone(&self.backend);
                self.spawn(async move {
                    let result = backend
                        .list_folder(&folder)
                        .await
                        .map_err(|err| err.to_string());
                    ReviewEvent::FolderListed { token, result }
                });
                None
            }
            Effect::SubmitDecision {
                token,
                path,
                decision,
            } => {
                let backend = Arc::clone(&self.backend);
                self.spawn(async move {
                    let result = backend
                        .submit_decision(&path, decision)
                        .await
                        .map_err(|err| err.to_string());
                    ReviewEvent::DecisionSaved {
                        token,
                        path,
                        decision,
                        result,
                    }
                });
                None
            }
            Effect::FetchMolecule { token, path } => {
                let backend = Arc::clone(&self.backend);
                self.spawn(async move {
                    let result = backend
                        .fetch_molecule(&path)
                        .await
                        .map_err(|err| err.to_string());
                    ReviewEvent::MoleculeFetched { token, result }
                });
                None
            }
            Effect::Render { token, molecule } => {
                let result = draw_molecule(&mut self.surface, &molecule, &self.style)
                    .map_err(|err| err.to_string());
                Some(ReviewEvent::Rendered { token, result })
            }
            Effect::Redraw => {
                if let Err(err) = redraw(&mut self.surface) {
                    warn!(%err, "redraw after resize failed");
                }
                None
            }
        }
    }

    fn spawn<F>(&mut self, request: F)
    where
        F: std::future::Future<Output = ReviewEvent> + Send + 'static,
    {
        self.inflight.push(request.boxed());
        debug!(inflight = self.inflight.len(), "backend request issued");
    }

    /// Waits for the next outstanding request and applies its completion.
    /// Returns `false` when nothing is outstanding.
    pub async fn process_next(&mut self) -> bool {
        match self.inflight.next().await {
            Some(event) => {
                self.submit(event);
                true
            }
            None => false,
        }
    }

    /// Drains every outstanding request, including ones issued while draining.
    pub async fn settle(&mut self) {
        while self.process_next().await {}
    }

    /// Event loop: interleaves user input with request completions until the
    /// input channel closes, then lets outstanding requests (and whatever they
    /// issue in turn) complete. `on_view` sees the view after every change.
    pub async fn run<F>(mut self, mut inputs: mpsc::Receiver<ReviewEvent>, mut on_view: F) -> Self
    where
        F: FnMut(&ReviewView),
    {
        loop {
            tokio::select! {
                input = inputs.recv() => match input {
                    Some(event) => {
                        self.submit(event);
                        on_view(self.reviewer.view());
                    }
                    None => break,
                },
                Some(completion) = self.inflight.next(), if !self.inflight.is_empty() => {
                    self.submit(completion);
                    on_view(self.reviewer.view());
                }
            }
        }
        debug!(pending = self.inflight.len(), "input closed; finishing outstanding requests");
        while let Some(completion) = self.inflight.next().await {
            self.submit(completion);
            on_view(self.reviewer.view());
        }
        self
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
