pub mod config;
pub mod entity;
pub mod filter;
pub mod session;
pub mod task;

pub use config::*;
pub use entity::Entity;
pub use filter::*;
pub use session::*;
pub use task::*;
