use crate::math::{Buffer, Scalar};

pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE: mean((predicted - expected)²)
    pub fn loss(predicted: &Buffer, expected: &Buffer) -> Scalar {
        let n = predicted.size() as Scalar;
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<Scalar>() / n
    }

    /// Per-output gradient fed to `Sequence::backward`: predicted - expected
    pub fn derivative(predicted: &Buffer, expected: &Buffer) -> Buffer {
        Buffer::from_vec(
            predicted.iter().zip(expected.iter())
                .map(|(a, b)| a - b)
                .collect()
        )
    }
}
