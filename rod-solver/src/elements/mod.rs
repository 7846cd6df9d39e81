//! Structural elements module

mod node;
mod rod;

pub use node::Node;
pub use rod::Rod;
