use serde::{Serialize, Deserialize};

use crate::math::buffer::Scalar;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    ReLU,
    Identity,
    /// Softmax is a vector-valued activation; each output depends on every
    /// input, so the `Activation` node handles it as a whole-vector operation.
    /// The element-wise `function()` and `derivative()` methods are never used
    /// for this variant.
    Softmax,
    Tanh,
    LeakyReLU { alpha: Scalar },
    Elu { alpha: Scalar },
}

impl ActivationFunction {
    /// True for activations that are applied independently to each element.
    pub fn is_elementwise(&self) -> bool {
        !matches!(self, ActivationFunction::Softmax)
    }

    /// Element-wise activation.
    pub fn function(&self, x: Scalar) -> Scalar {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            ActivationFunction::ReLU => x.max(0.0),
            ActivationFunction::Identity => x,
            ActivationFunction::Softmax => {
                panic!("ActivationFunction::Softmax has no element-wise form; \
                        use the Activation node which applies the full-vector softmax.")
            }
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
            ActivationFunction::Elu { alpha } => {
                if x > 0.0 { x } else { alpha * (x.exp() - 1.0) }
            }
        }
    }

    /// Gradient with respect to the input element, given the input `x`, the
    /// forward output `y = function(x)` and the incoming gradient `dy`.
    ///
    /// Sigmoid, tanh and elu are written in terms of `y` so the forward value
    /// is reused rather than recomputed.
    pub fn derivative(&self, x: Scalar, y: Scalar, dy: Scalar) -> Scalar {
        match self {
            // σ'(x) = σ(x) * (1 - σ(x))
            ActivationFunction::Sigmoid => y * (1.0 - y) * dy,
            ActivationFunction::ReLU => if x > 0.0 { dy } else { 0.0 },
            ActivationFunction::Identity => dy,
            ActivationFunction::Softmax => {
                panic!("ActivationFunction::Softmax has no element-wise derivative; \
                        use the Activation node which applies the softmax Jacobian.")
            }
            // tanh'(x) = 1 - tanh(x)^2
            ActivationFunction::Tanh => (1.0 - y * y) * dy,
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { dy } else { alpha * dy },
            // for x <= 0: α·e^x = y + α
            ActivationFunction::Elu { alpha } => {
                if x > 0.0 { dy } else { (y + alpha) * dy }
            }
        }
    }
}
