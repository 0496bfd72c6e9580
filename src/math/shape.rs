use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// Ordered dimension sizes describing how a buffer is laid out.
///
/// Used to validate, never to address: nodes index their buffers flat.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TensorShape(Vec<u32>);

impl TensorShape {
    pub fn new(dims: Vec<u32>) -> TensorShape {
        TensorShape(dims)
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Product of the dimensions; 1 for a rank-0 shape.
    pub fn element_count(&self) -> usize {
        self.0.iter().map(|&d| d as usize).product()
    }

    pub fn dims(&self) -> &[u32] {
        &self.0
    }
}

impl From<&[u32]> for TensorShape {
    fn from(dims: &[u32]) -> Self {
        TensorShape(dims.to_vec())
    }
}

impl<const N: usize> From<[u32; N]> for TensorShape {
    fn from(dims: [u32; N]) -> Self {
        TensorShape(dims.to_vec())
    }
}

impl Index<usize> for TensorShape {
    type Output = u32;

    fn index(&self, i: usize) -> &u32 {
        &self.0[i]
    }
}

impl fmt::Display for TensorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}
