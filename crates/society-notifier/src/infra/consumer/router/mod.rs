pub mod handlers;
pub mod middleware;
pub mod router;
pub mod traits;

pub use router::{BaseRouter, Route};
