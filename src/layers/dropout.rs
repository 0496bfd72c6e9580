use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::math::{Buffer, Scalar};
use crate::node::Node;

/// Inverted dropout.
///
/// In training mode each element is zeroed with probability `rate` and the
/// survivors are scaled by `1 / (1 - rate)`; the mask is kept for `backward`.
/// In inference mode the node is the identity in both directions.
#[derive(Debug, Clone)]
pub struct Dropout {
    rate: Scalar,
    is_training: bool,
    mask: Buffer,
    rng: StdRng,
}

impl Dropout {
    /// # Panics
    /// Panics unless `0 <= rate < 1`.
    pub fn new(rate: Scalar) -> Dropout {
        Dropout::with_rng(rate, StdRng::from_entropy())
    }

    pub fn with_seed(rate: Scalar, seed: u64) -> Dropout {
        Dropout::with_rng(rate, StdRng::seed_from_u64(seed))
    }

    fn with_rng(rate: Scalar, rng: StdRng) -> Dropout {
        assert!((0.0..1.0).contains(&rate), "dropout rate must be in [0, 1)");
        Dropout { rate, is_training: false, mask: Buffer::default(), rng }
    }

    pub fn rate(&self) -> Scalar {
        self.rate
    }
}

impl Node for Dropout {
    fn name(&self) -> &'static str {
        "dropout"
    }

    fn forward(&mut self, x: &Buffer) -> Buffer {
        if !self.is_training {
            return x.clone();
        }
        let keep = 1.0 - self.rate;
        let rate = self.rate;
        let rng = &mut self.rng;
        self.mask = Buffer::from_vec(
            (0..x.size())
                .map(|_| if rng.gen::<Scalar>() < rate { 0.0 } else { 1.0 / keep })
                .collect(),
        );
        Buffer::from_vec(x.iter().zip(self.mask.iter()).map(|(x, m)| x * m).collect())
    }

    fn backward(&mut self, _x: &Buffer, dy: &Buffer) -> Buffer {
        if !self.is_training {
            return dy.clone();
        }
        Buffer::from_vec(dy.iter().zip(self.mask.iter()).map(|(d, m)| d * m).collect())
    }

    fn set_state(&mut self, is_training: bool) {
        self.is_training = is_training;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn inference_is_identity() {
        let mut node = Dropout::with_seed(0.5, 1);
        node.set_state(false);
        let x = Buffer::from_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(node.forward(&x), x);
        assert_eq!(node.backward(&x, &x), x);
    }

    #[test]
    fn training_masks_and_rescales() {
        let mut node = Dropout::with_seed(0.5, 42);
        node.set_state(true);
        let x = Buffer::from_vec(vec![1.0; 64]);
        let y = node.forward(&x);
        assert!(y.iter().all(|&v| v == 0.0 || (v - 2.0).abs() < 1e-6));
        assert!(y.iter().any(|&v| v == 0.0));
        assert!(y.iter().any(|&v| v != 0.0));

        // gradient flows exactly where the forward pass let values through
        let dx = node.backward(&x, &Buffer::from_vec(vec![1.0; 64]));
        for (a, b) in y.iter().zip(dx.iter()) {
            assert_relative_eq!(*a, *b);
        }
    }

    #[test]
    #[should_panic]
    fn rejects_rate_of_one() {
        Dropout::new(1.0);
    }
}
