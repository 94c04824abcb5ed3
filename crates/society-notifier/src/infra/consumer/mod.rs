pub mod consumer;
pub mod router;

pub use consumer::Consumer;
pub use router::{BaseRouter, Route};
