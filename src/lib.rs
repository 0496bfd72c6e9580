pub mod error;
pub mod math;
pub mod activation;
pub mod node;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;

// Convenience re-exports
pub use error::{Result, SeqnetError};
pub use math::{Buffer, Scalar, TensorShape};
pub use activation::activation::ActivationFunction;
pub use node::{Node, ParameterisedNode, Parameter};
pub use layers::{Activation, DebugFlags, DebugLayer, Dense, Dropout, Init};
pub use network::{Sequence, SequenceSpec, NodeSpec, load_model, save_model, inspect_model};
pub use loss::mse::MseLoss;
pub use optim::sgd::Sgd;
