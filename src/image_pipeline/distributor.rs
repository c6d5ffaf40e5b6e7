//! Scatter/gather work distribution
//!
//! A fixed list of producer roles, each bound to one task, runs on its own thread and
//! hands exactly one block to a single aggregator thread over a tagged point-to-point
//! channel. Producers share no state with each other apart from the run-wide
//! [`Cancellation`] flag, which is raised as soon as any role fails so that the others
//! stop instead of finishing work nobody will use.

use std::fmt;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use tracing::{debug, error};

use crate::image_pipeline::common::{Cancellation, ReconstructionError, Result};

pub type RoleId = usize;

/// A block delivered by one producer role.
#[derive(Debug)]
pub struct Tagged<K, T> {
    pub role: RoleId,
    pub task: K,
    pub payload: T,
}

// What travels over the channel: the block, or the reason there is none.
type Delivery<K, T> = Tagged<K, Result<T>>;

/// Raises the flag if a producer unwinds before delivering.
struct CancelOnPanic<'a>(&'a Cancellation);

impl Drop for CancelOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.cancel();
        }
    }
}

/// Producer roles `0..n` bound to tasks, plus aggregator role `n`.
#[derive(Debug, Clone)]
pub struct ScatterGather<K> {
    assignments: Vec<K>,
}

impl<K> ScatterGather<K>
where
    K: Copy + Send + Sync + fmt::Display,
{
    /// Role `i` performs `assignments[i]`.
    pub fn new(assignments: Vec<K>) -> Self {
        Self { assignments }
    }

    pub fn producers(&self) -> usize {
        self.assignments.len()
    }

    pub fn aggregator_role(&self) -> RoleId {
        self.assignments.len()
    }

    pub fn task(&self, role: RoleId) -> Option<K> {
        self.assignments.get(role).copied()
    }

    /// Runs every producer in parallel and hands their blocks, ordered by role, to
    /// `consume` on the aggregator thread.
    ///
    /// `consume` only runs once every role has delivered. The first producer failure
    /// raises the cancellation flag passed to every `produce` call and is returned as
    /// soon as the aggregator sees it; nothing is consumed. There is no timeout: a
    /// producer that never finishes and never checks the flag blocks the run.
    pub fn run<T, R, P, C>(&self, produce: P, consume: C) -> Result<R>
    where
        T: Send,
        R: Send,
        P: Fn(RoleId, K, &Cancellation) -> Result<T> + Sync,
        C: FnOnce(Vec<Tagged<K, T>>) -> Result<R> + Send,
    {
        let producer_count = self.producers();
        let produce = &produce;
        let cancel = Cancellation::new();
        let cancel = &cancel;

        thread::scope(|scope| {
            let (tx, rx) = mpsc::channel::<Delivery<K, T>>();

            let mut producers = Vec::with_capacity(producer_count);
            for (role, &task) in self.assignments.iter().enumerate() {
                let tx = tx.clone();
                let spawned = thread::Builder::new()
                    .name(format!("role-{role}"))
                    .spawn_scoped(scope, move || {
                        let _guard = CancelOnPanic(cancel);
                        let payload = produce(role, task, cancel);
                        let failed = payload.is_err();
                        if let Err(e) = &payload {
                            error!(role, "Producer failed: {}", e);
                        }
                        // Deliver before cancelling so the root cause is queued ahead of
                        // the other roles' `Cancelled` reports.
                        if tx.send(Tagged { role, task, payload }).is_err() {
                            debug!(role, "Aggregator already gone, dropping block");
                        }
                        if failed {
                            cancel.cancel();
                        }
                    });
                match spawned {
                    Ok(handle) => producers.push((role, handle)),
                    Err(e) => {
                        cancel.cancel();
                        return Err(ReconstructionError::TransferFailed(format!(
                            "cannot start role {role}: {e}"
                        )));
                    }
                }
            }
            drop(tx);

            let aggregator = thread::Builder::new()
                .name("aggregator".to_string())
                .spawn_scoped(scope, move || {
                    let blocks = gather(rx, producer_count, cancel)?;
                    consume(blocks)
                })
                .map_err(|e| {
                    cancel.cancel();
                    ReconstructionError::TransferFailed(format!("cannot start aggregator: {e}"))
                })?;

            let outcome = aggregator.join().unwrap_or_else(|_| {
                cancel.cancel();
                Err(ReconstructionError::TransferFailed("aggregator panicked".to_string()))
            });

            for (role, handle) in producers {
                if handle.join().is_err() {
                    error!(role, "Producer panicked");
                }
            }

            outcome
        })
    }
}

// Blocks are slotted by role tag, so arrival order does not matter. The first failure
// ends the gather immediately.
fn gather<K: fmt::Display, T>(
    rx: Receiver<Delivery<K, T>>,
    producers: usize,
    cancel: &Cancellation,
) -> Result<Vec<Tagged<K, T>>> {
    let mut slots: Vec<Option<Tagged<K, T>>> = (0..producers).map(|_| None).collect();
    let mut received = 0;

    while received < producers {
        let Ok(delivery) = rx.recv() else {
            cancel.cancel();
            let missing: Vec<String> = slots
                .iter()
                .enumerate()
                .filter(|(_, slot)| slot.is_none())
                .map(|(role, _)| role.to_string())
                .collect();
            return Err(ReconstructionError::TransferFailed(format!(
                "no block from role(s) {}",
                missing.join(", ")
            )));
        };

        let Tagged { role, task, payload } = delivery;
        let payload = match payload {
            Ok(payload) => payload,
            Err(e) => {
                cancel.cancel();
                return Err(e);
            }
        };

        debug!(role, task = %task, "Received block");
        if slots[role].replace(Tagged { role, task, payload }).is_some() {
            cancel.cancel();
            return Err(ReconstructionError::TransferFailed(format!(
                "role {role} delivered twice"
            )));
        }
        received += 1;
    }

    Ok(slots.into_iter().flatten().collect())
}
