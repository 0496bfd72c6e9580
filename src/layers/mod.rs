pub mod activation;
pub mod debug;
pub mod dense;
pub mod dropout;

pub use activation::Activation;
pub use debug::{DebugFlags, DebugLayer};
pub use dense::{Dense, Init};
pub use dropout::Dropout;
