pub mod cache;
pub mod scheduler;
pub mod service;

pub use cache::*;
pub use scheduler::*;
pub use service::*;
