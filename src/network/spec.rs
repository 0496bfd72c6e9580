use serde::{Serialize, Deserialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::activation::activation::ActivationFunction;
use crate::error::{Result, SeqnetError};
use crate::layers::{Activation, DebugFlags, DebugLayer, Dense, Dropout, Init};
use crate::math::{Scalar, TensorShape};
use crate::network::sequence::Sequence;

/// Describes one node in a sequence specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum NodeSpec {
    Dense {
        inputs: usize,
        outputs: usize,
        #[serde(default)]
        init: Init,
    },
    Activation {
        function: ActivationFunction,
    },
    Debug {
        shape: TensorShape,
        #[serde(default)]
        flags: DebugFlags,
    },
    Dropout {
        rate: Scalar,
    },
}

/// A serializable description of a sequence's architecture.
///
/// The model file stores no node types, so loading weights needs a sequence
/// built from the same description. Every `build()` of one `SequenceSpec`
/// that succeeds yields a structurally identical sequence (parameters are freshly
/// initialised each time).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceSpec {
    /// Human-readable name used as the model file stem.
    pub name: String,
    /// Initial training flag of the built sequence.
    #[serde(default)]
    pub training: bool,
    /// Ordered list of nodes (input → output).
    pub nodes: Vec<NodeSpec>,
}

impl SequenceSpec {
    /// # Errors
    /// Returns `InvalidSpec` for a node whose settings cannot be built, such
    /// as a dropout rate outside `[0, 1)`.
    pub fn build(&self) -> Result<Sequence> {
        self.validate()?;
        let mut seq = Sequence::new();
        let mut rng = rand::thread_rng();
        for node in &self.nodes {
            match node {
                NodeSpec::Dense { inputs, outputs, init } => {
                    seq.push(Dense::with_init(*inputs, *outputs, *init, &mut rng))
                }
                NodeSpec::Activation { function } => seq.push(Activation::new(*function)),
                NodeSpec::Debug { shape, flags } => seq.push(DebugLayer::new(shape.clone(), *flags)),
                NodeSpec::Dropout { rate } => seq.push(Dropout::new(*rate)),
            }
        }
        seq.set_training(self.training);
        Ok(seq)
    }

    fn validate(&self) -> Result<()> {
        for (node, spec) in self.nodes.iter().enumerate() {
            if let NodeSpec::Dropout { rate } = spec {
                if !(0.0..1.0).contains(rate) {
                    return Err(SeqnetError::InvalidSpec {
                        node,
                        reason: format!("dropout rate must be in [0, 1), got {rate}"),
                    });
                }
            }
        }
        Ok(())
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|source| SeqnetError::Open { path: path.to_path_buf(), source })?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `SequenceSpec` from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<SequenceSpec> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|source| SeqnetError::Open { path: path.to_path_buf(), source })?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
