use ndarray::{Array, Array1, ArrayViewMut1, Zip};
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::thread_rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EmbedError, Result};

/// A fixed-length embedding vector.
///
/// The length is set when the vector is built and never changes; arithmetic
/// returns new vectors and only indexed assignment (or the training update)
/// mutates one in place.
#[derive(Clone, Debug, PartialEq)]
pub struct Vector {
    data: Array1<f32>,
}

/// Right-hand side of an elementwise operation: another vector or a scalar
/// broadcast over every component.
#[derive(Clone, Copy, Debug)]
pub enum Operand<'a> {
    Vector(&'a Vector),
    Scalar(f32),
}

impl<'a> From<&'a Vector> for Operand<'a> {
    fn from(v: &'a Vector) -> Self {
        Operand::Vector(v)
    }
}

impl From<f32> for Operand<'_> {
    fn from(x: f32) -> Self {
        Operand::Scalar(x)
    }
}

impl Vector {

    /// Random vector with components drawn uniformly from [-0.5, 0.5).
    pub fn new(size: usize) -> Vector {
        Vector::random_using(size, &mut thread_rng())
    }

    pub fn random_using<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Vector {
        Self {
            data: Array::random_using(size, Uniform::new(-0.5, 0.5), rng),
        }
    }

    /// Wraps `data` as is, its length becomes the vector length.
    pub fn from_vec(data: Vec<f32>) -> Vector {
        Self { data: Array1::from(data) }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.data.to_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.data.iter()
    }

    pub(crate) fn as_array_mut(&mut self) -> ArrayViewMut1<'_, f32> {
        self.data.view_mut()
    }

    fn check_len(&self, other: &Vector) -> Result<()> {
        if self.len() != other.len() {
            return Err(EmbedError::LengthMismatch { left: self.len(), right: other.len() });
        }
        Ok(())
    }

    fn combine(&self, other: Operand, op: fn(f32, f32) -> f32) -> Result<Vector> {
        let data = match other {
            Operand::Vector(v) => {
                self.check_len(v)?;
                Zip::from(&self.data).and(&v.data).map_collect(|&x, &y| op(x, y))
            }
            Operand::Scalar(s) => self.data.mapv(|x| op(x, s)),
        };
        Ok(Vector { data })
    }

    pub fn add<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Vector> {
        self.combine(other.into(), |x, y| x + y)
    }

    pub fn subtract<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Vector> {
        self.combine(other.into(), |x, y| x - y)
    }

    pub fn multiply<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Vector> {
        self.combine(other.into(), |x, y| x * y)
    }

    pub fn divide<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Vector> {
        self.combine(other.into(), |x, y| x / y)
    }

    pub fn dot(&self, other: &Vector) -> Result<f32> {
        self.check_len(other)?;
        Ok(self.data.dot(&other.data))
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f32 {
        self.data.mapv(|a| a.powi(2)).sum().sqrt()
    }

    /// Fails with `ZeroNorm` if either side is the zero vector.
    pub fn cosine_similarity(&self, other: &Vector) -> Result<f32> {
        let dot = self.dot(other)?;
        let norms = self.norm() * other.norm();
        if norms == 0.0 {
            return Err(EmbedError::ZeroNorm);
        }
        Ok(dot / norms)
    }

    pub fn get(&self, index: usize) -> Result<f32> {
        self.data
            .get(index)
            .copied()
            .ok_or(EmbedError::IndexOutOfBounds { index, len: self.len() })
    }

    pub fn set(&mut self, index: usize, value: f32) -> Result<()> {
        let len = self.len();
        match self.data.get_mut(index) {
            Some(x) => {
                *x = value;
                Ok(())
            }
            None => Err(EmbedError::IndexOutOfBounds { index, len }),
        }
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Vector::from_vec(data)
    }
}

// persisted as a plain array of numbers
impl Serialize for Vector {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer {
            serializer.collect_seq(self.data.iter())
    }
}

impl<'de> Deserialize<'de> for Vector {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de> {
            let data = Vec::<f32>::deserialize(deserializer)?;
            Ok(Vector::from_vec(data))
    }
}
