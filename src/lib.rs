//! Task board state: observable stores, derived board views, and the `tb` CLI
//! built on top of them.

pub mod cli;
pub mod context;
pub mod io;
pub mod model;
pub mod ops;
pub mod reactive;
pub mod store;
pub mod util;

pub use context::BoardContext;
