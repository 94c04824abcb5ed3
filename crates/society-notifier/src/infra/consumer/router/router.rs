use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tracing::debug;

use crate::{
    domain::{
        models::{ChangeKind, Collection, Event},
        outcome::{Outcome, SkipReason},
    },
    infra::consumer::router::traits::Handler,
};

/// Trigger key: which kind of change on which collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    pub collection: Collection,
    pub kind: ChangeKind,
}

impl Route {
    pub fn new(collection: Collection, kind: ChangeKind) -> Self {
        Self { collection, kind }
    }
}

impl From<&Event> for Route {
    fn from(event: &Event) -> Self {
        Route::new(event.collection.clone(), event.kind())
    }
}

#[derive(Clone)]
pub struct BaseRouter {
    routes: HashMap<Route, Arc<dyn Handler>>,
}

impl BaseRouter {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    pub fn route(mut self, route: Route, handler: Arc<dyn Handler>) -> Self {
        self.routes.insert(route, handler);
        self
    }

    /// Collection names with at least one registered route, sorted.
    pub fn collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .routes
            .keys()
            .map(|r| r.collection.as_str().to_string())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

impl Default for BaseRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handler for BaseRouter {
    async fn handle(&self, event: Event) -> anyhow::Result<Outcome> {
        let route = Route::from(&event);

        match self.routes.get(&route) {
            Some(handler) => handler.handle(event).await,
            None => {
                debug!(?route, id = %event.record_id, "no handler for route");
                Ok(Outcome::skipped(SkipReason::Unrouted))
            }
        }
    }
}
