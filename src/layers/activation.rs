use crate::activation::activation::ActivationFunction;
use crate::math::{Buffer, Scalar};
use crate::node::{activate, derivative, Node};

/// Parameter-free node applying an `ActivationFunction`.
///
/// The node keeps its last forward output, since the sigmoid, tanh, elu and
/// softmax gradients are expressed in terms of it. Calling `backward` without
/// an immediately preceding `forward` on the same input is undefined: the
/// stored output would belong to another call.
#[derive(Debug, Clone)]
pub struct Activation {
    pub function: ActivationFunction,
    y: Buffer,
}

impl Activation {
    pub fn new(function: ActivationFunction) -> Activation {
        Activation { function, y: Buffer::default() }
    }

    pub fn sigmoid() -> Activation {
        Activation::new(ActivationFunction::Sigmoid)
    }

    pub fn tanh() -> Activation {
        Activation::new(ActivationFunction::Tanh)
    }

    pub fn relu() -> Activation {
        Activation::new(ActivationFunction::ReLU)
    }

    pub fn leaky_relu(alpha: Scalar) -> Activation {
        Activation::new(ActivationFunction::LeakyReLU { alpha })
    }

    pub fn softmax() -> Activation {
        Activation::new(ActivationFunction::Softmax)
    }
}

impl Node for Activation {
    fn name(&self) -> &'static str {
        "activation"
    }

    fn forward(&mut self, x: &Buffer) -> Buffer {
        self.y = match self.function {
            ActivationFunction::Softmax => softmax_forward(x),
            f => activate(x, |v| f.function(v)),
        };
        self.y.clone()
    }

    fn backward(&mut self, x: &Buffer, dy: &Buffer) -> Buffer {
        match self.function {
            ActivationFunction::Softmax => softmax_backward(&self.y, dy),
            f => derivative(x, &self.y, dy, |x, y, dy| f.derivative(x, y, dy)),
        }
    }
}

/// Numerically stable softmax: the maximum is subtracted before exponentiating.
fn softmax_forward(x: &Buffer) -> Buffer {
    let max = x.iter().copied().fold(Scalar::NEG_INFINITY, Scalar::max);
    let exps: Vec<Scalar> = x.iter().map(|&v| (v - max).exp()).collect();
    let sum: Scalar = exps.iter().sum();
    Buffer::from_vec(exps.into_iter().map(|e| e / sum).collect())
}

/// Jacobian-vector product: dx_j = Σ_i dy_i · (i == j ? y_i(1 - y_i) : -y_i·y_j).
fn softmax_backward(y: &Buffer, dy: &Buffer) -> Buffer {
    let n = y.size();
    let mut dx = Buffer::zeros(n);
    for j in 0..n {
        let mut sum = 0.0;
        for i in 0..n {
            let dz = if i == j {
                y[i] * (1.0 - y[i])
            } else {
                -y[i] * y[j]
            };
            sum += dy[i] * dz;
        }
        dx[j] = sum;
    }
    dx
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn buf(v: &[Scalar]) -> Buffer {
        Buffer::from_slice(v)
    }

    #[test]
    fn sigmoid_forward_and_backward() {
        let mut node = Activation::sigmoid();
        let x = buf(&[0.0]);
        let y = node.forward(&x);
        assert_relative_eq!(y[0], 0.5);
        let dx = node.backward(&x, &buf(&[1.0]));
        assert_relative_eq!(dx[0], 0.25);
    }

    #[test]
    fn relu_forward_and_backward() {
        let mut node = Activation::relu();
        let x = buf(&[-1.0, 2.0]);
        let y = node.forward(&x);
        assert_eq!(y.as_slice(), &[0.0, 2.0]);
        let dx = node.backward(&x, &buf(&[1.0, 1.0]));
        assert_eq!(dx.as_slice(), &[0.0, 1.0]);
    }

    #[test]
    fn leaky_relu_scales_negative_gradient() {
        let mut node = Activation::leaky_relu(0.1);
        let x = buf(&[-2.0, 3.0]);
        let y = node.forward(&x);
        assert_relative_eq!(y[0], -0.2);
        let dx = node.backward(&x, &buf(&[1.0, 1.0]));
        assert_relative_eq!(dx[0], 0.1);
        assert_relative_eq!(dx[1], 1.0);
    }

    #[test]
    fn softmax_outputs_sum_to_one() {
        let mut node = Activation::softmax();
        let y = node.forward(&buf(&[1.0, 2.0, 3.0, -4.0]));
        assert!(y.iter().all(|&v| v >= 0.0));
        assert_relative_eq!(y.iter().sum::<Scalar>(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn softmax_is_shift_invariant() {
        let mut node = Activation::softmax();
        let a = node.forward(&buf(&[0.5, -1.0, 2.0]));
        let b = node.forward(&buf(&[100.5, 99.0, 102.0]));
        for (p, q) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(*p, *q, epsilon = 1e-5);
        }
    }

    #[test]
    fn softmax_survives_large_inputs() {
        let mut node = Activation::softmax();
        let y = node.forward(&buf(&[1000.0, 1000.0]));
        assert_relative_eq!(y[0], 0.5);
        assert_relative_eq!(y[1], 0.5);
    }

    #[test]
    fn softmax_backward_matches_finite_differences() {
        let x = [0.2, -0.7, 1.1];
        let dy = buf(&[0.3, -1.0, 0.5]);
        let mut node = Activation::softmax();
        node.forward(&buf(&x));
        let dx = node.backward(&buf(&x), &dy);

        // numeric gradient of L = Σ dy_i · softmax(x)_i
        let loss = |x: &[Scalar]| -> Scalar {
            softmax_forward(&buf(x)).iter().zip(dy.iter()).map(|(y, d)| y * d).sum()
        };
        let h = 1e-3;
        for j in 0..x.len() {
            let mut plus = x;
            let mut minus = x;
            plus[j] += h;
            minus[j] -= h;
            let numeric = (loss(&plus) - loss(&minus)) / (2.0 * h);
            assert_abs_diff_eq!(dx[j], numeric, epsilon = 1e-3);
        }
    }

    #[test]
    fn softmax_gradient_of_constant_loss_is_zero() {
        let mut node = Activation::softmax();
        let x = buf(&[0.1, 0.2, 0.3]);
        node.forward(&x);
        let dx = node.backward(&x, &buf(&[1.0, 1.0, 1.0]));
        for g in dx.iter() {
            assert_abs_diff_eq!(*g, 0.0, epsilon = 1e-6);
        }
    }
}
