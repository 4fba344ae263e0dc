// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use crate::audiothek::{HomeSection, SectionContent};
use crate::http::HttpClient;

/// What a section currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum SectionState {
    /// Placeholders while a fetch is in flight
    Loading { modules: usize, cards: usize },
    /// Normalized content of the last successful fetch
    Loaded(SectionContent),
    /// Nothing to show, either because the fetch failed or returned no cards
    Empty,
}

/// Runs the fetches of one home section and publishes their outcome
///
/// At most one fetch result is ever applied per `load()`; starting another
/// load or calling `stop()` discards whatever is still in flight.
pub struct SectionLoader<C: HttpClient + 'static> {
    section: HomeSection,
    client: Arc<C>,
    state: Arc<watch::Sender<SectionState>>,
    generation: Arc<AtomicU64>,
}

impl<C: HttpClient + 'static> SectionLoader<C> {
    pub fn new(section: HomeSection, client: Arc<C>) -> Self {
        let (state, _) = watch::channel(SectionState::Empty);
        Self {
            section,
            client,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn section(&self) -> HomeSection {
        self.section
    }

    /// Receiver observing every state change
    pub fn subscribe(&self) -> watch::Receiver<SectionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SectionState {
        self.state.borrow().clone()
    }

    /// Show placeholders and fetch the section in the background
    ///
    /// Must be called from within a tokio runtime.
    pub fn load(&self) {
        let (modules, cards) = self.section.placeholders();
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = SectionState::Loading { modules, cards };
        });

        let section = self.section;
        let client = Arc::clone(&self.client);
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);

        tokio::spawn(async move {
            let next = match section.fetch(client.as_ref()).await {
                Ok(content) if content.is_empty() => SectionState::Empty,
                Ok(content) => SectionState::Loaded(content),
                Err(e) => {
                    tracing::error!(%section, error = %e, "failed to load section");
                    SectionState::Empty
                }
            };

            let applied = state.send_if_modified(|shown| {
                if current.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *shown = next;
                true
            });
            if !applied {
                tracing::debug!(%section, "discarded superseded result");
            }
        });
    }

    /// Discard the result of any fetch still in flight
    pub fn stop(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
