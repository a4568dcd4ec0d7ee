use std::{borrow::Borrow, hash::Hash};

use hashbrown::HashMap;

use super::{Fut, Ready, ResolverEntry};

/// Map of lazily-resolved values. Looking up a missing key schedules a fetch
/// exactly once; completions are folded in by [`poll`](Self::poll).
pub struct ResolverMap<K, V, T> {
    map: HashMap<K, Ready<V>>,
    pending: Vec<Fut<T>>,
}

impl<K, V, T> ResolverMap<K, V, T>
where
    K: Hash + PartialEq + Eq,
    T: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
            pending: Vec::new(),
        }
    }

    pub fn get_or_update<Q>(&mut self, key: &Q, mut update: impl FnMut(&Q) -> Fut<T>) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + PartialEq + Eq + ToOwned<Owned = K> + ?Sized,
    {
        use hashbrown::hash_map::RawEntryMut::*;
        match self.map.raw_entry_mut().from_key(key) {
            Occupied(entry) => entry.into_mut().as_option(),
            Vacant(entry) => {
                entry.insert(key.to_owned(), Ready::NotReady);
                self.pending.push(update(key));
                None
            }
        }
    }

    pub fn poll(&mut self, mut resolve: impl FnMut(&mut ResolverEntry<'_, K, V>, T)) {
        self.pending.retain_mut(|item| {
            let Some(item) = item.try_resolve() else { return true };
            let mut entry = ResolverEntry {
                inner: &mut self.map,
            };

            resolve(&mut entry, item);
            false
        })
    }
}
