mod client;
pub mod types;

pub use client::FirestoreClient;
pub use types::{Document, FieldValue};
