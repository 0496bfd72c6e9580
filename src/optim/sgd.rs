use crate::math::Scalar;
use crate::network::sequence::Sequence;
use crate::node::Parameter;

pub struct Sgd {
    pub learning_rate: Scalar,
}

impl Sgd {
    pub fn new(learning_rate: Scalar) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies `value -= lr * grad` to every weight and bias of `seq`, then
    /// clears the gradients accumulated by `Sequence::backward`.
    pub fn step(&self, seq: &mut Sequence) {
        let lr = self.learning_rate;
        for layer in seq.parameterised_mut() {
            apply(layer.get_w_mut(), lr);
            apply(layer.get_b_mut(), lr);
        }
    }
}

fn apply(param: &mut Parameter, lr: Scalar) {
    for (v, g) in param.value.as_mut_slice().iter_mut().zip(param.grad.iter()) {
        *v -= lr * g;
    }
    param.zero_grad();
}
