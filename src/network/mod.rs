pub mod sequence;
pub mod serializer;
pub mod spec;

pub use sequence::Sequence;
pub use serializer::{load_model, save_model, inspect_model, ModelHeader, LayerRecord, MODEL_MAGIC};
pub use spec::{SequenceSpec, NodeSpec};
