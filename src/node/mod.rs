pub mod node;

pub use node::{activate, derivative, Node, ParameterisedNode, Parameter};
