//! Records with a stable identity.

use core::fmt::Debug;
use core::hash::Hash;

/// A record identified by its id rather than its contents. Products,
/// categories, brands and accounts are entities.
pub trait Entity {
    type Id: Copy + Eq + Hash + Debug;

    fn id(&self) -> Self::Id;
}

/// First record in `items` carrying `id`.
pub fn find_by_id<E: Entity>(items: &[E], id: E::Id) -> Option<&E> {
    items.iter().find(|item| item.id() == id)
}
