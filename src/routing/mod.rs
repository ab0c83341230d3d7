//! Query-time route assembly.
//!
//! Routes are composed from frozen [`PolicyTable`](crate::policy_table::PolicyTable)s
//! only; nothing is trained here and nothing is mutated.

mod assembler;
pub mod error;
mod query;

pub use assembler::RouteAssembler;
pub use error::{IntegrityError, RouteError};
pub use query::{Route, RouteQuery};
