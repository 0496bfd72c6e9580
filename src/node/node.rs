use crate::math::{Buffer, Scalar, TensorShape};

/// A single differentiable stage of a `Sequence`.
///
/// Derivatives are hand-written per node. `backward` must be given the same
/// input the node saw in its most recent `forward`, because several nodes
/// (sigmoid, tanh, softmax, dropout) compute their gradient from state they
/// captured during that call.
///
/// Buffer lengths are not checked here; a mismatched buffer is a caller error
/// and panics on indexing.
pub trait Node {
    /// Short type name, used in logs.
    fn name(&self) -> &'static str;

    fn forward(&mut self, x: &Buffer) -> Buffer;

    /// Returns ∂L/∂x given the forward input `x` and ∂L/∂y.
    fn backward(&mut self, x: &Buffer, dy: &Buffer) -> Buffer;

    /// Switches between training and inference behaviour. Idempotent.
    fn set_state(&mut self, _is_training: bool) {}

    /// Capability query used to find nodes that own parameters.
    fn as_parameterised(&self) -> Option<&dyn ParameterisedNode> {
        None
    }

    fn as_parameterised_mut(&mut self) -> Option<&mut dyn ParameterisedNode> {
        None
    }
}

/// A node owning exactly one weight tensor and one bias tensor.
///
/// The declared shapes are fixed at construction and only used to validate
/// model files; they are never used for runtime shape inference.
pub trait ParameterisedNode: Node {
    fn get_w(&self) -> &Parameter;
    fn get_b(&self) -> &Parameter;
    fn get_w_mut(&mut self) -> &mut Parameter;
    fn get_b_mut(&mut self) -> &mut Parameter;
    fn input_shape(&self) -> &TensorShape;
    fn output_shape(&self) -> &TensorShape;
}

/// A trainable tensor and the gradient accumulated for it by `backward`.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub value: Buffer,
    pub grad: Buffer,
}

impl Parameter {
    pub fn new(value: Buffer) -> Parameter {
        let grad = Buffer::zeros(value.size());
        Parameter { value, grad }
    }

    pub fn size(&self) -> usize {
        self.value.size()
    }

    pub fn zero_grad(&mut self) {
        self.grad.fill(0.0);
    }
}

/// Applies `f` to every element of `x`.
pub fn activate<F>(x: &Buffer, f: F) -> Buffer
where
    F: Fn(Scalar) -> Scalar,
{
    Buffer::from_vec(x.iter().map(|&v| f(v)).collect())
}

/// Builds the input gradient element by element from `(x, y, dy)`.
pub fn derivative<F>(x: &Buffer, y: &Buffer, dy: &Buffer, f: F) -> Buffer
where
    F: Fn(Scalar, Scalar, Scalar) -> Scalar,
{
    assert_eq!(x.size(), y.size(), "forward output length does not match input length");
    assert_eq!(x.size(), dy.size(), "gradient length does not match input length");
    Buffer::from_vec(
        x.iter()
            .zip(y.iter())
            .zip(dy.iter())
            .map(|((&x, &y), &dy)| f(x, y, dy))
            .collect(),
    )
}
