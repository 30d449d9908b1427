//! Process-wide resolution and caching of the webhook URL.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::lookup::WebhookLookup;

use super::ResolveError;

type Outcome = Result<String, ResolveError>;

/// Resolves the webhook URL once and caches it.
///
/// Lifecycle: idle, then resolving (a single in-flight lookup shared by
/// every concurrent caller), then resolved (cached until [`reset`]).
/// A failed lookup is never cached: all callers waiting on it receive the
/// same error and the next call starts a fresh lookup.
///
/// Share one resolver per process, typically behind an `Arc`, and hand it
/// to every [`BatchSubmitter`](super::BatchSubmitter).
///
/// [`reset`]: Self::reset
///
/// # Example
///
/// ```
/// use task_sync::lookup::StaticLookup;
/// use task_sync::sync::WebhookResolver;
///
/// # async fn example() -> Result<(), task_sync::sync::ResolveError> {
/// let resolver = WebhookResolver::new(StaticLookup::new(" https://hooks.example.com/flow "));
/// assert_eq!(resolver.resolve().await?, "https://hooks.example.com/flow");
/// assert!(resolver.cached().is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WebhookResolver<L> {
    lookup: L,
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    /// Bumped by every reset so that a lookup started before the reset
    /// cannot overwrite the state after it.
    generation: u64,
    slot: Slot,
}

#[derive(Debug, Default)]
enum Slot {
    #[default]
    Idle,
    Resolving(watch::Receiver<Option<Outcome>>),
    Resolved(String),
}

enum Claim {
    Cached(String),
    Leader {
        tx: watch::Sender<Option<Outcome>>,
        generation: u64,
    },
    Follower(watch::Receiver<Option<Outcome>>),
}

impl<L> WebhookResolver<L> {
    /// Creates an unresolved resolver backed by `lookup`.
    #[must_use]
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            state: Mutex::new(State::default()),
        }
    }

    /// Returns the cached URL without triggering a lookup.
    #[must_use]
    pub fn cached(&self) -> Option<String> {
        match &self.lock().slot {
            Slot::Resolved(url) => Some(url.clone()),
            Slot::Idle | Slot::Resolving(_) => None,
        }
    }

    /// Returns true while a lookup is in flight.
    #[must_use]
    pub fn is_resolving(&self) -> bool {
        matches!(self.lock().slot, Slot::Resolving(_))
    }

    /// Forgets the cached URL and any in-flight lookup.
    ///
    /// Idempotent. Callers already waiting on an in-flight lookup still
    /// receive its outcome, but it is not cached.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.generation = state.generation.wrapping_add(1);
        state.slot = Slot::Idle;
        tracing::debug!("webhook URL cache reset");
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn claim(&self) -> Claim {
        let mut state = self.lock();

        if let Slot::Resolved(url) = &state.slot {
            return Claim::Cached(url.clone());
        }
        if let Slot::Resolving(rx) = &state.slot {
            return Claim::Follower(rx.clone());
        }

        let (tx, rx) = watch::channel(None);
        state.slot = Slot::Resolving(rx);
        Claim::Leader {
            tx,
            generation: state.generation,
        }
    }

    fn settle(&self, generation: u64, outcome: &Outcome) {
        let mut state = self.lock();
        if state.generation != generation {
            return;
        }
        state.slot = match outcome {
            Ok(url) => Slot::Resolved(url.clone()),
            Err(_) => Slot::Idle,
        };
    }
}

impl<L: WebhookLookup> WebhookResolver<L> {
    /// Returns the webhook URL, looking it up on first use.
    ///
    /// Concurrent calls while a lookup is in flight wait for that lookup
    /// instead of starting another one.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Empty`] if the looked-up value is blank after
    /// trimming, or [`ResolveError::Lookup`] if the lookup failed.
    pub async fn resolve(&self) -> Result<String, ResolveError> {
        loop {
            match self.claim() {
                Claim::Cached(url) => return Ok(url),
                Claim::Leader { tx, generation } => return self.lead(tx, generation).await,
                Claim::Follower(mut rx) => {
                    let outcome = rx
                        .wait_for(Option::is_some)
                        .await
                        .ok()
                        .and_then(|value| value.clone());
                    if let Some(outcome) = outcome {
                        return outcome;
                    }
                    // The leading caller was dropped mid-lookup; start over.
                }
            }
        }
    }

    async fn lead(&self, tx: watch::Sender<Option<Outcome>>, generation: u64) -> Outcome {
        let mut guard = AbandonGuard {
            state: &self.state,
            generation,
            armed: true,
        };

        let outcome = match self.lookup.lookup().await {
            Ok(raw) => {
                let url = raw.trim();
                if url.is_empty() {
                    Err(ResolveError::Empty)
                } else {
                    Ok(url.to_string())
                }
            }
            Err(e) => Err(ResolveError::from(e)),
        };
        guard.armed = false;

        match &outcome {
            Ok(url) => tracing::info!(url = %url, "webhook URL resolved"),
            Err(e) => tracing::warn!(error = %e, "webhook URL resolution failed"),
        }

        self.settle(generation, &outcome);
        tx.send_replace(Some(outcome.clone()));
        outcome
    }
}

/// Returns the slot to idle if the leading caller is dropped mid-lookup.
struct AbandonGuard<'a> {
    state: &'a Mutex<State>,
    generation: u64,
    armed: bool,
}

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.generation == self.generation && matches!(state.slot, Slot::Resolving(_)) {
            state.slot = Slot::Idle;
        }
    }
}
