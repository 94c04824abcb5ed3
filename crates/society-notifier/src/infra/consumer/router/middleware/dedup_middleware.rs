use std::{
    collections::{HashMap, VecDeque},
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

use crate::{
    domain::{
        models::{Change, Event},
        outcome::{Outcome, SkipReason},
    },
    infra::consumer::router::traits::{Handler, Layer},
};

/// Suppresses redelivered events. Only events that ended in a dispatch are
/// remembered; skips and failures are forgotten so a later delivery of the
/// same change is handled again. A copy that arrives while the first attempt
/// is still running waits for it and takes over if it did not dispatch.
#[non_exhaustive]
pub struct DedupMiddleware<H> {
    inner: H,
    seen: Mutex<SeenKeys>,
}

enum Slot {
    /// Closed when the running attempt settles.
    InFlight(watch::Receiver<()>),
    Dispatched,
}

enum Claim {
    Run(watch::Sender<()>),
    Wait(watch::Receiver<()>),
    Duplicate,
}

/// Dispatched keys are kept in FIFO order up to `capacity`; in-flight keys
/// are not counted against it.
struct SeenKeys {
    capacity: usize,
    order: VecDeque<String>,
    slots: HashMap<String, Slot>,
}

impl SeenKeys {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            slots: HashMap::new(),
        }
    }

    fn claim(&mut self, key: &str) -> Claim {
        match self.slots.get(key) {
            Some(Slot::Dispatched) => Claim::Duplicate,
            Some(Slot::InFlight(settled)) => Claim::Wait(settled.clone()),
            None => {
                let (tx, rx) = watch::channel(());
                self.slots.insert(key.to_string(), Slot::InFlight(rx));
                Claim::Run(tx)
            }
        }
    }

    fn remember(&mut self, key: &str) {
        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.slots.remove(&oldest);
            }
        }

        self.order.push_back(key.to_string());
        self.slots.insert(key.to_string(), Slot::Dispatched);
    }

    fn forget(&mut self, key: &str) {
        self.slots.remove(key);
    }
}

fn lock(seen: &Mutex<SeenKeys>) -> MutexGuard<'_, SeenKeys> {
    seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Owns a key while its attempt runs. Dropping it settles the slot, also
/// when the attempt is cancelled, and then wakes any waiting copies.
struct Attempt<'a> {
    seen: &'a Mutex<SeenKeys>,
    key: String,
    dispatched: bool,
    _settled: watch::Sender<()>,
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        let mut seen = lock(self.seen);
        if self.dispatched {
            seen.remember(&self.key);
        } else {
            seen.forget(&self.key);
        }
    }
}

impl<H> DedupMiddleware<H> {
    pub fn new(inner: H, capacity: usize) -> Self {
        Self {
            inner,
            seen: Mutex::new(SeenKeys::new(capacity)),
        }
    }
}

#[async_trait]
impl<H: Handler> Handler for DedupMiddleware<H> {
    async fn handle(&self, event: Event) -> anyhow::Result<Outcome> {
        let key = dedup_key(&event);

        let mut attempt = loop {
            let claim = lock(&self.seen).claim(&key);
            match claim {
                Claim::Run(settled) => {
                    break Attempt {
                        seen: &self.seen,
                        key,
                        dispatched: false,
                        _settled: settled,
                    };
                }
                Claim::Duplicate => return Ok(Outcome::skipped(SkipReason::Duplicate)),
                // errors once the sender is gone, which is the signal
                Claim::Wait(mut settled) => {
                    let _ = settled.changed().await;
                }
            }
        };

        let res = self.inner.handle(event).await;
        attempt.dispatched = matches!(res, Ok(Outcome::Dispatched));

        res
    }
}

/// `collection/id/kind`, plus the resulting status for updates so that a
/// later decision on the same record is not mistaken for a repeat.
fn dedup_key(event: &Event) -> String {
    let mut key = format!("{}/{}/{}", event.collection, event.record_id, event.kind());

    if let Change::Updated { after, .. } = &event.change {
        match after.get("status") {
            Some(Value::String(status)) => {
                key.push('/');
                key.push_str(status);
            }
            Some(other) => {
                key.push('/');
                key.push_str(&other.to_string());
            }
            None => {}
        }
    }

    key
}

/// Wraps a handler in [`DedupMiddleware`]; a capacity of zero passes events
/// straight through.
#[derive(Debug, Clone, Copy)]
pub struct DedupLayer {
    capacity: usize,
}

impl DedupLayer {
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }
}

impl<H: Handler> Layer<H> for DedupLayer {
    type Service = Passthrough<H>;

    fn layer(&self, inner: H) -> Self::Service {
        if self.capacity == 0 {
            Passthrough::Direct(inner)
        } else {
            Passthrough::Dedup(DedupMiddleware::new(inner, self.capacity))
        }
    }
}

pub enum Passthrough<H> {
    Direct(H),
    Dedup(DedupMiddleware<H>),
}

#[async_trait]
impl<H: Handler> Handler for Passthrough<H> {
    async fn handle(&self, event: Event) -> anyhow::Result<Outcome> {
        match self {
            Passthrough::Direct(inner) => inner.handle(event).await,
            Passthrough::Dedup(inner) => inner.handle(event).await,
        }
    }
}
