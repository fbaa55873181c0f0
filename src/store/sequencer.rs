use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::models::MovieId;

use super::Command;

/// Identifies one in-flight command for a movie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub movie_id: MovieId,
    pub seq: u64,
}

/// Orders in-flight commands and the service lists they bring back.
///
/// Per movie, only the newest command settles. Across the whole store, a list from
/// the service is only applied if no newer list has been applied before it.
#[derive(Debug, Default)]
pub struct Sequencer {
    inner: Mutex<SequencerInner>,
}

#[derive(Debug, Default)]
struct SequencerInner {
    next_seq: u64,
    applied: u64,
    latest: HashMap<MovieId, InFlight>,
}

#[derive(Debug)]
struct InFlight {
    seq: u64,
    command: Command,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SequencerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issues a ticket that supersedes every earlier ticket for the same movie
    pub fn issue(&self, command: &Command) -> Ticket {
        let mut inner = self.lock();
        inner.next_seq += 1;
        let seq = inner.next_seq;
        inner.latest.insert(
            command.movie_id().clone(),
            InFlight {
                seq,
                command: command.clone(),
            },
        );
        Ticket {
            movie_id: command.movie_id().clone(),
            seq,
        }
    }

    /// Reserves a sequence number for a fetch of the whole list
    pub fn begin_fetch(&self) -> u64 {
        let mut inner = self.lock();
        inner.next_seq += 1;
        inner.next_seq
    }

    /// Settles `ticket`; returns false if a newer ticket for the same movie exists
    pub fn settle(&self, ticket: &Ticket) -> bool {
        let mut inner = self.lock();
        match inner.latest.get(&ticket.movie_id) {
            Some(latest) if latest.seq == ticket.seq => {
                inner.latest.remove(&ticket.movie_id);
                true
            }
            Some(_) => false,
            // Cleared by a reset while in flight
            None => false,
        }
    }

    /// Marks the list requested under `seq` as applied; false if a newer one already was
    pub fn mark_applied(&self, seq: u64) -> bool {
        let mut inner = self.lock();
        if seq <= inner.applied {
            return false;
        }
        inner.applied = seq;
        true
    }

    /// Commands still waiting on the service, oldest first
    pub fn pending(&self) -> Vec<Command> {
        let inner = self.lock();
        let mut pending: Vec<&InFlight> = inner.latest.values().collect();
        pending.sort_by_key(|in_flight| in_flight.seq);
        pending
            .into_iter()
            .map(|in_flight| in_flight.command.clone())
            .collect()
    }

    pub fn in_flight(&self) -> usize {
        self.lock().latest.len()
    }

    /// Forgets every in-flight ticket; their confirmations will be discarded
    pub fn clear(&self) {
        self.lock().latest.clear();
    }
}
