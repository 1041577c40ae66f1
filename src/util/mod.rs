pub mod debounce;
pub mod unicode;
