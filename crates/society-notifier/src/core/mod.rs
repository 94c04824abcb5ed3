mod app;
pub mod shutdown;

pub use app::App;
pub use shutdown::Shutdowner;
