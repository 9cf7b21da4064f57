//! Business logic services.
//!
//! Each view module exposes a pure `build` over a [`snapshot::Snapshot`] and
//! an async `load` that fetches the collections it needs concurrently.

pub mod aggregator;
pub mod expansion;
pub mod normalizer;
pub mod series;
pub mod snapshot;

pub mod financial;
pub mod instruments;
pub mod lessons;
pub mod overview;
pub mod packages;
pub mod students;
pub mod teachers;

#[cfg(test)]
mod testing;
