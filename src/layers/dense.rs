use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::math::{Buffer, Scalar, TensorShape};
use crate::node::{Node, Parameter, ParameterisedNode};

/// Weight initialisation scheme for a `Dense` layer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Init {
    /// N(0, sqrt(1 / inputs)); pair with sigmoid/tanh.
    #[default]
    Xavier,
    /// N(0, sqrt(2 / inputs)); pair with relu.
    He,
    Uniform { limit: Scalar },
    Zeros,
}

/// Fully connected layer: `y_j = b_j + Σ_i W[j, i] · x_i`.
///
/// Weights are stored row-major with shape `[outputs, inputs]`.
#[derive(Debug, Clone)]
pub struct Dense {
    inputs: usize,
    outputs: usize,
    weights: Parameter,
    biases: Parameter,
    input_shape: TensorShape,
    output_shape: TensorShape,
}

impl Dense {
    pub fn new(inputs: usize, outputs: usize) -> Dense {
        Dense::with_init(inputs, outputs, Init::Xavier, &mut rand::thread_rng())
    }

    pub fn with_init<R: Rng + ?Sized>(inputs: usize, outputs: usize, init: Init, rng: &mut R) -> Dense {
        let n = inputs * outputs;
        let w = match init {
            Init::Xavier => Buffer::xavier(n, inputs, rng),
            Init::He => Buffer::he(n, inputs, rng),
            Init::Uniform { limit } => Buffer::uniform(n, limit, rng),
            Init::Zeros => Buffer::zeros(n),
        };
        Dense::from_parts(inputs, outputs, w, Buffer::zeros(outputs))
    }

    /// Builds a layer from explicit weights (`[outputs, inputs]`, row-major) and biases.
    ///
    /// # Panics
    /// Panics if the buffer lengths do not match the declared sizes.
    pub fn from_parts(inputs: usize, outputs: usize, weights: Buffer, biases: Buffer) -> Dense {
        assert_eq!(weights.size(), inputs * outputs, "weight count must be inputs * outputs");
        assert_eq!(biases.size(), outputs, "bias count must equal outputs");
        Dense {
            inputs,
            outputs,
            weights: Parameter::new(weights),
            biases: Parameter::new(biases),
            input_shape: TensorShape::new(vec![inputs as u32]),
            output_shape: TensorShape::new(vec![outputs as u32]),
        }
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }
}

impl Node for Dense {
    fn name(&self) -> &'static str {
        "dense"
    }

    fn forward(&mut self, x: &Buffer) -> Buffer {
        let w = self.weights.value.as_slice();
        let mut y = self.biases.value.clone();
        for j in 0..self.outputs {
            let row = &w[j * self.inputs..(j + 1) * self.inputs];
            y[j] += row.iter().zip(x.iter()).map(|(w, x)| w * x).sum::<Scalar>();
        }
        y
    }

    /// Accumulates ∂L/∂W and ∂L/∂b into the parameters' gradients and
    /// returns ∂L/∂x = Wᵀ · dy.
    fn backward(&mut self, x: &Buffer, dy: &Buffer) -> Buffer {
        let mut dx = Buffer::zeros(self.inputs);
        let w = self.weights.value.as_slice();
        let dw = self.weights.grad.as_mut_slice();
        for j in 0..self.outputs {
            let g = dy[j];
            let base = j * self.inputs;
            for i in 0..self.inputs {
                dx[i] += w[base + i] * g;
                dw[base + i] += g * x[i];
            }
            self.biases.grad[j] += g;
        }
        dx
    }

    fn as_parameterised(&self) -> Option<&dyn ParameterisedNode> {
        Some(self)
    }

    fn as_parameterised_mut(&mut self) -> Option<&mut dyn ParameterisedNode> {
        Some(self)
    }
}

impl ParameterisedNode for Dense {
    fn get_w(&self) -> &Parameter {
        &self.weights
    }

    fn get_b(&self) -> &Parameter {
        &self.biases
    }

    fn get_w_mut(&mut self) -> &mut Parameter {
        &mut self.weights
    }

    fn get_b_mut(&mut self) -> &mut Parameter {
        &mut self.biases
    }

    fn input_shape(&self) -> &TensorShape {
        &self.input_shape
    }

    fn output_shape(&self) -> &TensorShape {
        &self.output_shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn layer() -> Dense {
        // W = [[1, 2, 3], [4, 5, 6]], b = [0.5, -0.5]
        Dense::from_parts(
            3,
            2,
            Buffer::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            Buffer::from_vec(vec![0.5, -0.5]),
        )
    }

    #[test]
    fn forward_is_affine() {
        let mut d = layer();
        let y = d.forward(&Buffer::from_vec(vec![1.0, 0.0, -1.0]));
        assert_relative_eq!(y[0], -1.5);
        assert_relative_eq!(y[1], -2.5);
    }

    #[test]
    fn backward_returns_input_gradient_and_accumulates() {
        let mut d = layer();
        let x = Buffer::from_vec(vec![1.0, 2.0, 3.0]);
        let dy = Buffer::from_vec(vec![1.0, -1.0]);
        d.forward(&x);
        let dx = d.backward(&x, &dy);
        assert_eq!(dx.as_slice(), &[-3.0, -3.0, -3.0]);
        assert_eq!(d.get_w().grad.as_slice(), &[1.0, 2.0, 3.0, -1.0, -2.0, -3.0]);
        assert_eq!(d.get_b().grad.as_slice(), &[1.0, -1.0]);

        d.backward(&x, &dy);
        assert_eq!(d.get_b().grad.as_slice(), &[2.0, -2.0]);
    }

    #[test]
    fn declared_shapes_follow_sizes() {
        let d = Dense::with_init(4, 3, Init::He, &mut StdRng::seed_from_u64(1));
        assert_eq!(d.input_shape(), &TensorShape::from([4]));
        assert_eq!(d.output_shape(), &TensorShape::from([3]));
        assert_eq!(d.get_w().size(), 12);
        assert_eq!(d.get_b().size(), 3);
    }

    #[test]
    fn exposes_parameter_capability() {
        let d = layer();
        assert!(d.as_parameterised().is_some());
    }

    #[test]
    #[should_panic]
    fn from_parts_rejects_wrong_weight_count() {
        Dense::from_parts(2, 2, Buffer::zeros(3), Buffer::zeros(2));
    }
}
