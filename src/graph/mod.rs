//! Graph model: identified vertices joined by reciprocal weighted edges that
//! carry learned values.

pub mod error;
pub mod records;

mod edge;
mod network;
mod position;
mod vertex;

pub use edge::{Edge, DEFAULT_Q};
pub use error::GraphError;
pub use network::Graph;
pub use position::Position;
pub use records::{EdgeRecord, VertexRecord};
pub use vertex::{Vertex, VertexRef};
