mod bucket;
mod engine;
pub mod error;
mod event;
mod reducer;
mod report;
mod stream;
pub mod stubs;

pub use bucket::*;
pub use engine::*;
pub use event::*;
pub use reducer::*;
pub use report::*;
pub use stream::*;

pub static CORE_VERSION: &str = env!("CARGO_PKG_VERSION");
