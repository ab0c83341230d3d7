//! Per-goal next-hop tables: building, storing and loading them.
//!
//! The [`PolicyTableBuilder`] trains one table per goal vertex. Tables are
//! read-only afterwards; they are kept in a [`PolicySet`] for routing and can
//! be persisted through any [`PolicyStore`], such as the CSV directory layout
//! of [`CsvDirStore`].

pub mod builder;
pub mod error;
pub mod store;
pub mod table;

pub use builder::{BuildReport, GoalBuild, GoalFailure, PolicyTableBuilder};
pub use error::PolicyTableError;
pub use store::{CsvDirStore, PolicySet, PolicyStore};
pub use table::{PolicyEntry, PolicyRecord, PolicyTable};
