//! Application state: domain stores built on [`crate::reactive`].

pub mod auth;
pub mod board;
pub mod entity;
pub mod filters;
pub mod modal;
pub mod tasks;

pub use auth::AuthStore;
pub use board::BoardViews;
pub use entity::{Entity, EntityStore};
pub use filters::{DebouncedSearch, FilterStore};
pub use modal::{ModalHandler, ModalInstance, ModalPayload, ModalStack};
pub use tasks::TaskStore;
