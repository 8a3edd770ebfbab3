//! Mutation state.
//!
//! A [`Mutation`] records the outcome of the latest call of one write
//! operation. Each call takes a generation number; a call whose generation
//! is no longer current (because of a later call or a [`Mutation::reset`])
//! still runs its success side effects but leaves the observable state
//! alone.

use std::future::Future;

use parking_lot::Mutex;
use tracing::debug;

use taskdesk_client::ApiError;

use crate::notify::ChangeNotifier;
use crate::state::{MutationState, MutationStatus};

#[derive(Debug)]
struct Slot<T> {
    state: MutationState<T>,
    generation: u64,
}

/// State holder for one kind of write.
#[derive(Debug)]
pub struct Mutation<T> {
    name: &'static str,
    slot: Mutex<Slot<T>>,
    notifier: ChangeNotifier,
}

impl<T: Clone> Mutation<T> {
    /// Idle mutation publishing changes on `notifier`.
    pub fn new(name: &'static str, notifier: ChangeNotifier) -> Self {
        Self {
            name,
            slot: Mutex::new(Slot {
                state: MutationState::default(),
                generation: 0,
            }),
            notifier,
        }
    }

    /// Current state.
    pub fn state(&self) -> MutationState<T> {
        self.slot.lock().state.clone()
    }

    /// Back to idle. Calls in flight stop affecting the state.
    pub fn reset(&self) {
        {
            let mut slot = self.slot.lock();
            slot.generation += 1;
            slot.state = MutationState::default();
        }
        self.notifier.notify();
    }

    /// Run one call.
    ///
    /// `on_success` runs before the state turns to success, so readers woken
    /// by the change already see the cache side effects.
    pub async fn run<F, S>(&self, call: F, on_success: S) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
        S: FnOnce(&T),
    {
        let generation = {
            let mut slot = self.slot.lock();
            slot.generation += 1;
            slot.state = MutationState {
                status: MutationStatus::Pending,
                data: None,
                error: None,
            };
            slot.generation
        };
        self.notifier.notify();

        let guard = PendingGuard {
            mutation: self,
            generation,
            armed: true,
        };
        let result = call.await;
        guard.disarm();

        if let Ok(value) = &result {
            on_success(value);
        }

        let current = {
            let mut slot = self.slot.lock();
            let current = slot.generation == generation;
            if current {
                slot.state = match &result {
                    Ok(value) => MutationState {
                        status: MutationStatus::Success,
                        data: Some(value.clone()),
                        error: None,
                    },
                    Err(error) => MutationState {
                        status: MutationStatus::Error,
                        data: None,
                        error: Some(error.clone()),
                    },
                };
            }
            current
        };

        if current {
            self.notifier.notify();
        } else {
            debug!(mutation = self.name, "outcome of superseded call not recorded");
        }
        result
    }

    fn abandon(&self, generation: u64) {
        {
            let mut slot = self.slot.lock();
            if slot.generation != generation {
                return;
            }
            slot.state = MutationState::default();
        }
        debug!(mutation = self.name, "call dropped before completion");
        self.notifier.notify();
    }
}

/// Resets the mutation to idle if its call future is dropped mid-flight.
struct PendingGuard<'a, T: Clone> {
    mutation: &'a Mutation<T>,
    generation: u64,
    armed: bool,
}

impl<T: Clone> PendingGuard<'_, T> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<T: Clone> Drop for PendingGuard<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            self.mutation.abandon(self.generation);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
