pub mod auth;
pub mod changefeed;
pub mod firestore;
pub mod messaging;
pub mod types;

pub use auth::TokenManager;
pub use changefeed::ChangeFeedClient;
pub use firestore::FirestoreClient;
pub use messaging::MessagingClient;
pub use types::{
    AndroidConfig, AndroidNotification, AndroidPriority, ChangeKind, DocumentChange, Message,
    MessageTarget, Notification, NotificationPriority, Visibility,
};
