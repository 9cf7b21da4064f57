//! One fetch cycle's worth of collections, plus the joins every view needs.

use crate::models::{Instrument, InstrumentLink, Lesson, Package, Payment, Relation, User};

use super::aggregator::UNKNOWN;
use super::normalizer::{index, Lookup};

/// Collections fetched for a view. Collections a view does not need stay empty.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub instruments: Vec<Instrument>,
    pub packages: Vec<Package>,
    pub lessons: Vec<Lesson>,
    pub payments: Vec<Payment>,
    pub relations: Vec<Relation>,
    pub student_instruments: Vec<InstrumentLink>,
    pub teacher_instruments: Vec<InstrumentLink>,
}

impl Snapshot {
    pub fn lookups(&self) -> Lookups<'_> {
        Lookups {
            users: index(&self.users),
            instruments: index(&self.instruments),
            packages: index(&self.packages),
        }
    }
}

/// Id lookups over a [`Snapshot`].
#[derive(Debug)]
pub struct Lookups<'a> {
    pub users: Lookup<'a, User>,
    pub instruments: Lookup<'a, Instrument>,
    pub packages: Lookup<'a, Package>,
}

impl<'a> Lookups<'a> {
    pub fn user(&self, id: Option<&str>) -> Option<&'a User> {
        self.users.resolve(id)
    }

    pub fn package(&self, id: Option<i64>) -> Option<&'a Package> {
        self.packages.resolve(id.as_ref())
    }

    /// Full name of a user, or `fallback` when the user is unknown.
    pub fn user_name_or(&self, id: Option<&str>, fallback: &str) -> String {
        self.user(id)
            .map(User::full_name)
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Instrument name, or `"Unknown"`.
    pub fn instrument_name(&self, id: Option<i64>) -> String {
        self.instruments
            .resolve(id.as_ref())
            .and_then(|i| i.name.clone())
            .unwrap_or_else(|| UNKNOWN.to_string())
    }
}
