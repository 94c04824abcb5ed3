//! Doubles for the domain seams, shared by the dispatcher tests.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{
    models::{Record, UserProfile},
    notification::Notification,
    sender::NotificationSender,
    store::ProfileStore,
};

pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

#[derive(Default)]
pub struct FakeSender {
    sent: Mutex<Vec<Notification>>,
    attempts: AtomicUsize,
    fail: bool,
}

impl FakeSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationSender for FakeSender {
    async fn send(&self, notification: &Notification) -> anyhow::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow::anyhow!("push transport unavailable"));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct FakeStore {
    profiles: Arc<HashMap<String, UserProfile>>,
    lookups: Arc<AtomicUsize>,
    fail: bool,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, user_id: &str, profile: UserProfile) -> Self {
        Arc::make_mut(&mut self.profiles).insert(user_id.to_string(), profile);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileStore for FakeStore {
    async fn profile(&self, user_id: &str) -> anyhow::Result<Option<UserProfile>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow::anyhow!("profile store unavailable"));
        }
        Ok(self.profiles.get(user_id).cloned())
    }
}
