pub mod buffer;
pub mod shape;

pub use buffer::{Buffer, Scalar};
pub use shape::TensorShape;
