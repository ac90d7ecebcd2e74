//! Structural data model: nodes, elements and the structure snapshot

mod element;
mod node;
mod structure;

pub use element::{Element, ElementKind, SideValues};
pub use node::Node;
pub use structure::Structure;
