use std::fmt::Debug;

/// A record with a unique id that an entity store can manage.
pub trait Entity: Clone + 'static {
    type Id: Clone + PartialEq + Debug + 'static;
    /// Partial update applied by `EntityStore::update_one`
    type Changes;

    fn id(&self) -> &Self::Id;

    /// Shallow-merge `changes` into `self`.
    fn apply_changes(&mut self, changes: &Self::Changes);
}
