//! Id-indexed lookups over fetched collections.
//!
//! Lookups borrow the records they index, so a snapshot can be normalised once
//! and joined against repeatedly without cloning. A record without a usable id
//! is left out of the index; a duplicated id keeps the last record seen.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::models::{Instrument, Lesson, Package, Payment, User};

/// A record that can be indexed by its `id` field.
pub trait Keyed {
    type Key: Eq + Hash + Clone;

    fn key(&self) -> Option<Self::Key>;
}

impl Keyed for User {
    type Key = String;

    fn key(&self) -> Option<String> {
        self.id.clone()
    }
}

impl Keyed for Instrument {
    type Key = i64;

    fn key(&self) -> Option<i64> {
        self.id
    }
}

impl Keyed for Package {
    type Key = i64;

    fn key(&self) -> Option<i64> {
        self.id
    }
}

impl Keyed for Lesson {
    type Key = i64;

    fn key(&self) -> Option<i64> {
        self.id
    }
}

impl Keyed for Payment {
    type Key = i64;

    fn key(&self) -> Option<i64> {
        self.id
    }
}

/// `id → &record` mapping.
#[derive(Debug)]
pub struct Lookup<'a, T: Keyed> {
    by_id: HashMap<T::Key, &'a T>,
}

impl<'a, T: Keyed> Lookup<'a, T> {
    pub fn get<Q>(&self, key: &Q) -> Option<&'a T>
    where
        T::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.by_id.get(key).copied()
    }

    /// Resolve an optional foreign key; absent keys resolve to `None`.
    pub fn resolve<Q>(&self, key: Option<&Q>) -> Option<&'a T>
    where
        T::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        key.and_then(|k| self.get(k))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl<T: Keyed> Default for Lookup<'_, T> {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
        }
    }
}

/// Index `records` by id.
pub fn index<T: Keyed>(records: &[T]) -> Lookup<'_, T> {
    let mut by_id = HashMap::with_capacity(records.len());
    for record in records {
        if let Some(key) = record.key() {
            by_id.insert(key, record);
        }
    }
    Lookup { by_id }
}

/// Index a collection that may not have been fetched at all.
pub fn index_opt<T: Keyed>(records: Option<&[T]>) -> Lookup<'_, T> {
    records.map(index).unwrap_or_default()
}
