pub mod firestore_store;

pub use firestore_store::FirestoreProfileStore;
