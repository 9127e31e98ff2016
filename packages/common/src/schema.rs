//! Problem and solution documents.
//!
//! Points and edges are JSON 2-element arrays; the typed decoder rejects any
//! other arity, so validation here only covers what the type system cannot.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::ContentHash;

/// `[x, y]`
pub type Point = (i64, i64);

/// `[from, to]`, indices into the figure's vertex list.
pub type Edge = (i64, i64);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("edge {edge} references vertex {vertex}, but the figure has {vertex_count} vertices")]
    EdgeOutOfRange {
        edge: usize,
        vertex: i64,
        vertex_count: usize,
    },

    #[error("epsilon must be non-negative, got {0}")]
    NegativeEpsilon(i64),

    #[error("solution has {actual} vertices, but the figure has {expected}")]
    VertexCountMismatch { expected: usize, actual: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Figure {
    pub vertices: Vec<Point>,
    pub edges: Vec<Edge>,
}

/// A bonus placed in the hole of a problem, unlocking something on another problem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bonus {
    pub bonus: String,
    pub problem: i64,
    pub position: Point,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemData {
    pub hole: Vec<Point>,
    pub figure: Figure,
    pub epsilon: i64,
    #[serde(default)]
    pub bonuses: Vec<Bonus>,
}

impl ProblemData {
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.epsilon < 0 {
            return Err(SchemaError::NegativeEpsilon(self.epsilon));
        }

        let vertex_count = self.figure.vertices.len();
        for (edge, &(from, to)) in self.figure.edges.iter().enumerate() {
            for vertex in [from, to] {
                if vertex < 0 || vertex as usize >= vertex_count {
                    return Err(SchemaError::EdgeOutOfRange {
                        edge,
                        vertex,
                        vertex_count,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// A bonus a solution claims to use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedBonus {
    pub bonus: String,
    pub problem: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge: Option<Edge>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionData {
    pub vertices: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonuses: Option<Vec<UsedBonus>>,
}

impl SolutionData {
    pub fn validate(&self, problem: &ProblemData) -> Result<(), SchemaError> {
        let expected = problem.figure.vertices.len();
        if self.vertices.len() != expected {
            return Err(SchemaError::VertexCountMismatch {
                expected,
                actual: self.vertices.len(),
            });
        }
        Ok(())
    }

    /// Serialize to the canonical form and hash it.
    ///
    /// The payload goes through a `serde_json::Value` and is pretty-printed
    /// with two-space indentation, so key order and whitespace of whatever
    /// the caller originally sent never reach the digest.
    pub fn canonicalize(&self) -> Result<(Vec<u8>, ContentHash), serde_json::Error> {
        let value = serde_json::to_value(self)?;
        let bytes = serde_json::to_vec_pretty(&value)?;
        let hash = ContentHash::compute(&bytes);
        Ok((bytes, hash))
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
