use std::fmt::Debug;
use std::rc::Rc;

use tracing::debug;

pub use crate::model::entity::Entity;
use crate::reactive::{Derived, Observable, Readable, Subscription};

/// Reactive list of entities with CRUD operations and derived lookups.
///
/// Ids are not checked for uniqueness on insert; callers keep them unique.
/// Operations on an absent id are silent no-ops. Every mutation copies the
/// list and notifies subscribers once.
pub struct EntityStore<E: Entity> {
    entities: Observable<Vec<E>>,
}

impl<E: Entity> Clone for EntityStore<E> {
    fn clone(&self) -> Self {
        EntityStore {
            entities: self.entities.clone(),
        }
    }
}

impl<E: Entity> Default for EntityStore<E> {
    fn default() -> Self {
        EntityStore::new()
    }
}

impl<E: Entity + Debug> Debug for EntityStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("entities", &self.entities.get())
            .finish()
    }
}

impl<E: Entity> EntityStore<E> {
    pub fn new() -> Self {
        EntityStore::with_entities(Vec::new())
    }

    pub fn with_entities(entities: Vec<E>) -> Self {
        EntityStore {
            entities: Observable::new(entities),
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub fn add_one(&self, entity: E) {
        debug!(id = ?entity.id(), "add entity");
        self.entities.update(|list| {
            let mut next = list.clone();
            next.push(entity);
            next
        });
    }

    pub fn add_many(&self, entities: Vec<E>) {
        debug!(count = entities.len(), "add entities");
        self.entities.update(|list| {
            let mut next = list.clone();
            next.extend(entities);
            next
        });
    }

    pub fn update_one(&self, id: &E::Id, changes: E::Changes) {
        self.entities.update(|list| {
            list.iter()
                .map(|entity| {
                    if entity.id() == id {
                        let mut updated = entity.clone();
                        updated.apply_changes(&changes);
                        updated
                    } else {
                        entity.clone()
                    }
                })
                .collect()
        });
    }

    /// Apply several updates with a single notification.
    pub fn update_many(&self, updates: Vec<(E::Id, E::Changes)>) {
        self.entities.update(|list| {
            let mut next = list.clone();
            for (id, changes) in &updates {
                for entity in next.iter_mut().filter(|e| e.id() == id) {
                    entity.apply_changes(changes);
                }
            }
            next
        });
    }

    pub fn remove_one(&self, id: &E::Id) {
        debug!(?id, "remove entity");
        self.entities.update(|list| list.iter().filter(|e| e.id() != id).cloned().collect());
    }

    pub fn remove_many(&self, ids: &[E::Id]) {
        self.entities
            .update(|list| list.iter().filter(|e| !ids.contains(e.id())).cloned().collect());
    }

    /// Replace the whole collection.
    pub fn set_all(&self, entities: Vec<E>) {
        self.entities.set(entities);
    }

    pub fn remove_all(&self) {
        self.entities.set(Vec::new());
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn get_all(&self) -> Rc<Vec<E>> {
        self.entities.get()
    }

    pub fn get(&self, id: &E::Id) -> Option<E> {
        self.entities.get().iter().find(|e| e.id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entities.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.get().is_empty()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Vec<E>) + 'static,
    {
        self.entities.subscribe(callback)
    }

    /// Live lookup of one entity; `None` while it is absent.
    pub fn select_by_id(&self, id: E::Id) -> Derived<Option<E>> {
        Derived::new(&self.entities, move |list: &Vec<E>| {
            list.iter().find(|e| *e.id() == id).cloned()
        })
    }

    /// The whole collection as a read-only view.
    pub fn select_all(&self) -> Derived<Vec<E>> {
        Derived::new(&self.entities, |list: &Vec<E>| list.clone())
    }

    /// Entities whose id is in `ids`, in collection order.
    pub fn select_by_ids(&self, ids: Vec<E::Id>) -> Derived<Vec<E>> {
        Derived::new(&self.entities, move |list: &Vec<E>| {
            list.iter().filter(|e| ids.contains(e.id())).cloned().collect()
        })
    }
}

impl<E: Entity> Readable<Vec<E>> for EntityStore<E> {
    fn get(&self) -> Rc<Vec<E>> {
        self.get_all()
    }

    fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Vec<E>) + 'static,
    {
        EntityStore::subscribe(self, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: u32,
        text: String,
    }

    impl Entity for Note {
        type Id = u32;
        type Changes = String;

        fn id(&self) -> &u32 {
            &self.id
        }

        fn apply_changes(&mut self, changes: &String) {
            self.text = changes.clone();
        }
    }

    fn note(id: u32, text: &str) -> Note {
        Note {
            id,
            text: text.into(),
        }
    }

    fn store() -> EntityStore<Note> {
        EntityStore::with_entities(vec![note(1, "one"), note(2, "two"), note(3, "three")])
    }

    fn count_notifications(store: &EntityStore<Note>) -> (Rc<RefCell<usize>>, Subscription) {
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        let sub = store.subscribe(move |_| *c.borrow_mut() += 1);
        *count.borrow_mut() = 0;
        (count, sub)
    }

    #[test]
    fn add_one_appends() {
        let s = store();
        s.add_one(note(4, "four"));
        assert_eq!(s.len(), 4);
        assert_eq!(s.get_all().last(), Some(&note(4, "four")));
    }

    #[test]
    fn add_many_notifies_once() {
        let s = store();
        let (count, _sub) = count_notifications(&s);
        s.add_many(vec![note(4, "four"), note(5, "five")]);
        assert_eq!(s.len(), 5);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn add_does_not_check_uniqueness() {
        let s = store();
        s.add_one(note(1, "again"));
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn update_one_merges_matching_entity() {
        let s = store();
        s.update_one(&2, "deux".into());
        assert_eq!(s.get(&2), Some(note(2, "deux")));
        assert_eq!(s.get(&1), Some(note(1, "one")));
    }

    #[test]
    fn update_one_absent_id_leaves_collection_unchanged() {
        let s = store();
        let before = s.get_all();
        s.update_one(&99, "nope".into());
        assert_eq!(*s.get_all(), *before);
    }

    #[test]
    fn update_many_applies_all_in_one_notification() {
        let s = store();
        let (count, _sub) = count_notifications(&s);
        s.update_many(vec![(1, "uno".into()), (3, "tres".into()), (42, "x".into())]);
        let texts: Vec<String> = s.get_all().iter().map(|n| n.text.clone()).collect();
        assert_eq!(texts, vec!["uno", "two", "tres"]);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn remove_one_and_many() {
        let s = store();
        s.remove_one(&2);
        assert_eq!(s.len(), 2);
        s.remove_one(&2);
        assert_eq!(s.len(), 2);
        s.remove_many(&[1, 3, 7]);
        assert!(s.is_empty());
    }

    #[test]
    fn set_all_and_remove_all() {
        let s = store();
        s.set_all(vec![note(9, "nine")]);
        assert_eq!(*s.get_all(), vec![note(9, "nine")]);
        s.remove_all();
        assert!(s.is_empty());
    }

    #[test]
    fn select_by_id_follows_lifecycle() {
        let s = EntityStore::new();
        let view = s.select_by_id(5);
        assert_eq!(*view.get(), None);
        s.add_one(note(5, "five"));
        assert_eq!(*view.get(), Some(note(5, "five")));
        s.update_one(&5, "FIVE".into());
        assert_eq!(*view.get(), Some(note(5, "FIVE")));
        s.remove_one(&5);
        assert_eq!(*view.get(), None);
    }

    #[test]
    fn select_by_ids_keeps_collection_order() {
        let s = store();
        let view = s.select_by_ids(vec![3, 1]);
        assert_eq!(*view.get(), vec![note(1, "one"), note(3, "three")]);
        s.remove_one(&1);
        assert_eq!(*view.get(), vec![note(3, "three")]);
    }

    #[test]
    fn select_all_fires_with_set_all_contents() {
        let s = EntityStore::new();
        let all = s.select_all();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = all.subscribe(move |list: &Vec<Note>| sink.borrow_mut().push(list.clone()));

        let notes = vec![note(2, "b"), note(1, "a")];
        s.set_all(notes.clone());
        assert_eq!(seen.borrow().last(), Some(&notes));
    }
}
