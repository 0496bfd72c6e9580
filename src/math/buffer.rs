use rand::prelude::*;
use std::f32::consts::PI;
use std::ops::{Index, IndexMut};

/// The single scalar width used for every tensor and for the model file.
pub type Scalar = f32;

/// A flat, fixed-length run of scalars. Shape lives with whoever owns the buffer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Buffer {
    data: Vec<Scalar>,
}

impl Buffer {
    pub fn zeros(size: usize) -> Buffer {
        Buffer { data: vec![0.0; size] }
    }

    pub fn from_vec(data: Vec<Scalar>) -> Buffer {
        Buffer { data }
    }

    pub fn from_slice(data: &[Scalar]) -> Buffer {
        Buffer { data: data.to_vec() }
    }

    /// Uniform samples in `[-limit, limit)`.
    pub fn uniform<R: Rng + ?Sized>(size: usize, limit: Scalar, rng: &mut R) -> Buffer {
        let data = (0..size)
            .map(|_| (rng.gen::<Scalar>() * 2.0 - 1.0) * limit)
            .collect();
        Buffer { data }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> Scalar {
        // (0, 1] keeps ln() finite.
        let u1: Scalar = 1.0 - rng.gen::<Scalar>();
        let u2: Scalar = 1.0 - rng.gen::<Scalar>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    fn normal<R: Rng + ?Sized>(size: usize, std_dev: Scalar, rng: &mut R) -> Buffer {
        let data = (0..size)
            .map(|_| Buffer::sample_standard_normal(rng) * std_dev)
            .collect();
        Buffer { data }
    }

    /// He initialization: N(0, sqrt(2 / fan_in)). Suited to ReLU-family layers.
    pub fn he<R: Rng + ?Sized>(size: usize, fan_in: usize, rng: &mut R) -> Buffer {
        Buffer::normal(size, (2.0 / fan_in.max(1) as Scalar).sqrt(), rng)
    }

    /// Xavier (Glorot) initialization: N(0, sqrt(1 / fan_in)).
    /// Suited to Sigmoid/Tanh/Identity layers.
    pub fn xavier<R: Rng + ?Sized>(size: usize, fan_in: usize, rng: &mut R) -> Buffer {
        Buffer::normal(size, (1.0 / fan_in.max(1) as Scalar).sqrt(), rng)
    }

    /// Element count.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[Scalar] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [Scalar] {
        &mut self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Scalar> {
        self.data.iter()
    }

    pub fn fill(&mut self, value: Scalar) {
        self.data.iter_mut().for_each(|x| *x = value);
    }

    pub fn into_vec(self) -> Vec<Scalar> {
        self.data
    }
}

impl From<Vec<Scalar>> for Buffer {
    fn from(data: Vec<Scalar>) -> Self {
        Buffer { data }
    }
}

impl Index<usize> for Buffer {
    type Output = Scalar;

    fn index(&self, i: usize) -> &Scalar {
        &self.data[i]
    }
}

impl IndexMut<usize> for Buffer {
    fn index_mut(&mut self, i: usize) -> &mut Scalar {
        &mut self.data[i]
    }
}
