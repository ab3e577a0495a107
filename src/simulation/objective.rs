//! Boundary between the cost model and an external search algorithm.
//!
//! Any continuous black-box optimizer (GA, DE, PSO, GWO, ...) only needs the
//! dimension, the per-coordinate bounds and a total objective function. The
//! optimizer itself is not part of this crate.

use super::network::NetworkCostModel;
use super::types::EvaluationError;

/// Minimization problem over a box-bounded real vector.
///
/// Implementations must be safe to evaluate concurrently from many threads.
pub trait Objective: Sync {
    fn dimensions(&self) -> usize;

    fn lower_bounds(&self) -> &[f64];

    fn upper_bounds(&self) -> &[f64];

    /// Cost of `genes`; every point inside the bounds yields a finite value.
    /// Errors only for vectors of the wrong length.
    fn evaluate(&self, genes: &[f64]) -> Result<f64, EvaluationError>;
}

impl Objective for NetworkCostModel {
    fn dimensions(&self) -> usize {
        NetworkCostModel::dimensions(self)
    }

    fn lower_bounds(&self) -> &[f64] {
        NetworkCostModel::lower_bounds(self)
    }

    fn upper_bounds(&self) -> &[f64] {
        NetworkCostModel::upper_bounds(self)
    }

    fn evaluate(&self, genes: &[f64]) -> Result<f64, EvaluationError> {
        self.fitness(genes)
    }
}
