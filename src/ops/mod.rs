pub mod auth;
pub mod filter;
pub mod task_ops;
