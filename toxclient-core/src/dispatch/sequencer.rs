//! Per-resource issuance ordering
//!
//! Every operation on a [`ResourceKey`] draws a ticket when it is issued.
//! A ticket's holder may only run once every earlier ticket of the same
//! resource has finished, so a mutation followed by a query of the same
//! resource always observes the mutation, whichever dispatch path each took.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use tracing::trace;

use crate::engine::ResourceKey;

#[derive(Default)]
struct Lane {
    next: u64,
    serving: u64,
    /// Finished tickets that are still ahead of `serving`
    finished_early: BTreeSet<u64>,
}

#[derive(Default)]
struct Lanes {
    lanes: Mutex<HashMap<ResourceKey, Lane>>,
    turn: Condvar,
}

/// Hands out ordered tickets per resource
#[derive(Clone, Default)]
pub struct Sequencer {
    inner: Arc<Lanes>,
}

/// Place in a resource's queue
///
/// Dropping a ticket, whether or not it ran, releases its slot.
#[must_use = "a ticket releases its slot when dropped"]
pub struct Ticket {
    inner: Arc<Lanes>,
    resource: ResourceKey,
    number: u64,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ResourceKey, Lane>> {
        self.inner.lanes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Draw the next ticket for `resource`
    pub fn issue(&self, resource: ResourceKey) -> Ticket {
        let mut lanes = self.lock();
        let lane = lanes.entry(resource).or_default();
        let number = lane.next;
        lane.next += 1;
        trace!(?resource, number, "Ticket issued");
        Ticket {
            inner: self.inner.clone(),
            resource,
            number,
        }
    }

    /// Tickets issued for `resource` that have not finished yet
    pub fn outstanding(&self, resource: ResourceKey) -> u64 {
        self.lock()
            .get(&resource)
            .map_or(0, |lane| lane.next - lane.serving - lane.finished_early.len() as u64)
    }
}

impl Ticket {
    pub fn resource(&self) -> ResourceKey {
        self.resource
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    /// Block the calling thread until every earlier ticket has finished
    pub fn wait_turn(&self) {
        let mut lanes = self.inner.lanes.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            let serving = lanes.get(&self.resource).map_or(self.number, |lane| lane.serving);
            if serving >= self.number {
                return;
            }
            lanes = self
                .inner
                .turn
                .wait(lanes)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        let mut lanes = self.inner.lanes.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(lane) = lanes.get_mut(&self.resource) else {
            return;
        };
        if lane.serving == self.number {
            lane.serving += 1;
            while lane.finished_early.remove(&lane.serving) {
                lane.serving += 1;
            }
        } else {
            lane.finished_early.insert(self.number);
        }
        drop(lanes);
        self.inner.turn.notify_all();
    }
}
