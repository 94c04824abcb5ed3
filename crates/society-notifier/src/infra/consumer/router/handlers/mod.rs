pub mod emergency;
pub mod notice;
pub mod visitor_arrival;
pub mod visitor_decision;

use std::sync::Arc;

use tracing::debug;

use crate::{
    domain::{
        models::{ChangeKind, Collection, Event, FromRecord, Record},
        sender::NotificationSender,
        store::ProfileStore,
    },
    infra::consumer::router::{BaseRouter, Route},
};

pub use emergency::EmergencyHandler;
pub use notice::NoticeHandler;
pub use visitor_arrival::VisitorArrivalHandler;
pub use visitor_decision::VisitorDecisionHandler;

/// The trigger table: which dispatcher answers which record change.
pub fn society_router(
    store: Arc<dyn ProfileStore>,
    sender: Arc<dyn NotificationSender>,
) -> BaseRouter {
    BaseRouter::new()
        .route(
            Route::new(Collection::VisitorRequests, ChangeKind::Create),
            Arc::new(VisitorArrivalHandler::new(store, sender.clone())),
        )
        .route(
            Route::new(Collection::Notices, ChangeKind::Create),
            Arc::new(NoticeHandler::new(sender.clone())),
        )
        .route(
            Route::new(Collection::SosAlerts, ChangeKind::Create),
            Arc::new(EmergencyHandler::new(sender.clone())),
        )
        .route(
            Route::new(Collection::VisitorRequests, ChangeKind::Update),
            Arc::new(VisitorDecisionHandler::new(sender)),
        )
}

fn decode<T: FromRecord>(event: &Event, record: &Record) -> Option<T> {
    match T::from_record(record) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(id = %event.record_id, "{}", e);
            None
        }
    }
}
