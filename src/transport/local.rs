//! In-process transport: one thread per participant, mailboxes in shared memory.
//!
//! Each participant owns a mailbox keyed by `(source, tag)`. Messages with the same key are
//! delivered in the order they were sent, which matches the non-overtaking rule of MPI. Sends are
//! buffered and never block, so an exchange is a send followed by a receive.

use std::collections::{HashMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::thread;

use log::{debug, warn};

use super::{Tag, Transport};
use crate::types::{Error, Result};

fn poisoned<T>(_: PoisonError<T>) -> Error {
    Error::Transport("local mesh lock poisoned".to_string())
}

#[derive(Default)]
struct Mailbox {
    queues: Mutex<HashMap<(usize, Tag), VecDeque<Vec<u8>>>>,
    arrived: Condvar,
}

#[derive(Default)]
struct BarrierState {
    waiting: usize,
    generation: u64,
}

struct Shared {
    mailboxes: Vec<Mailbox>,
    barrier: Mutex<BarrierState>,
    released: Condvar,
    aborted: AtomicBool,
}

impl Shared {
    fn new(size: usize) -> Self {
        Self {
            mailboxes: (0..size).map(|_| Mailbox::default()).collect(),
            barrier: Mutex::new(BarrierState::default()),
            released: Condvar::new(),
            aborted: AtomicBool::new(false),
        }
    }

    fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
        // Taking each lock once guarantees that every waiter is parked before it is notified.
        for mailbox in &self.mailboxes {
            drop(mailbox.queues.lock());
            mailbox.arrived.notify_all();
        }
        drop(self.barrier.lock());
        self.released.notify_all();
    }
}

/// A participant's handle on a [`LocalMesh`].
pub struct LocalTransport<'a> {
    id: usize,
    shared: &'a Shared,
}

impl Transport for LocalTransport<'_> {
    fn id(&self) -> usize {
        self.id
    }

    fn size(&self) -> usize {
        self.shared.mailboxes.len()
    }

    fn send(&self, dest: usize, tag: Tag, payload: &[u8]) -> Result<()> {
        if self.shared.is_aborted() {
            return Err(Error::Aborted);
        }
        let mailbox = self.shared.mailboxes.get(dest).ok_or_else(|| {
            Error::Transport(format!("participant {dest} is outside the mesh"))
        })?;
        let mut queues = mailbox.queues.lock().map_err(poisoned)?;
        queues
            .entry((self.id, tag))
            .or_default()
            .push_back(payload.to_vec());
        mailbox.arrived.notify_all();
        Ok(())
    }

    fn receive(&self, source: usize, tag: Tag) -> Result<Vec<u8>> {
        if source >= self.size() {
            return Err(Error::Transport(format!(
                "participant {source} is outside the mesh"
            )));
        }
        let mailbox = &self.shared.mailboxes[self.id];
        let mut queues = mailbox.queues.lock().map_err(poisoned)?;
        loop {
            if self.shared.is_aborted() {
                return Err(Error::Aborted);
            }
            if let Some(message) = queues
                .get_mut(&(source, tag))
                .and_then(VecDeque::pop_front)
            {
                return Ok(message);
            }
            queues = mailbox.arrived.wait(queues).map_err(poisoned)?;
        }
    }

    fn exchange(&self, dest: usize, source: usize, tag: Tag, payload: &[u8]) -> Result<Vec<u8>> {
        self.send(dest, tag, payload)?;
        self.receive(source, tag)
    }

    fn barrier(&self) -> Result<()> {
        let mut state = self.shared.barrier.lock().map_err(poisoned)?;
        if self.shared.is_aborted() {
            return Err(Error::Aborted);
        }
        let generation = state.generation;
        state.waiting += 1;
        if state.waiting == self.size() {
            state.waiting = 0;
            state.generation += 1;
            self.shared.released.notify_all();
            return Ok(());
        }
        while state.generation == generation {
            state = self.shared.released.wait(state).map_err(poisoned)?;
            if self.shared.is_aborted() {
                return Err(Error::Aborted);
            }
        }
        Ok(())
    }

    fn abort(&self) {
        warn!("participant {} aborting the local mesh", self.id);
        self.shared.abort();
    }
}

/// A mesh of participants running as threads of the current process.
#[derive(Debug, Clone, Copy)]
pub struct LocalMesh {
    size: usize,
}

impl LocalMesh {
    /// Mesh of `size` participants.
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    /// Number of participants.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Run `body` once per participant, each on its own thread, and collect the results in
    /// participant order.
    ///
    /// The first participant to fail aborts the others. The returned error is the one that caused
    /// the abort rather than the [`Error::Aborted`] seen by the rest.
    pub fn run<R, F>(&self, body: F) -> Result<Vec<R>>
    where
        R: Send,
        F: Fn(&LocalTransport<'_>) -> Result<R> + Sync,
    {
        debug!("starting local mesh of {} participants", self.size);
        let shared = Shared::new(self.size);
        let outcomes: Vec<Result<R>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..self.size)
                .map(|id| {
                    let shared = &shared;
                    let body = &body;
                    scope.spawn(move || {
                        let transport = LocalTransport { id, shared };
                        let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(&transport)))
                            .unwrap_or_else(|_| {
                                Err(Error::Transport(format!("participant {id} panicked")))
                            });
                        if outcome.is_err() {
                            transport.abort();
                        }
                        outcome
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        Err(Error::Transport("participant thread lost".to_string()))
                    })
                })
                .collect()
        });

        let mut results = Vec::with_capacity(outcomes.len());
        let mut failure: Option<Error> = None;
        for outcome in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    let replace = match &failure {
                        None => true,
                        Some(Error::Aborted) => !matches!(e, Error::Aborted),
                        Some(_) => false,
                    };
                    if replace {
                        failure = Some(e);
                    }
                }
            }
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(results),
        }
    }
}
