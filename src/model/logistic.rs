//! L2-regularised binary logistic regression.
//!
//! Features are standardised internally, then the penalised log-loss
//!
//! ```text
//! mean(logloss(y, sigmoid(Zw + b))) + ||w||² / (2·C·n)
//! ```
//!
//! is minimised by full-batch gradient descent with a fixed `1/L` step, where
//! `L` bounds the gradient's Lipschitz constant. Training stops after
//! `max_iter` steps or once the largest gradient component falls below `tol`.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::ModelError;

/// Hyperparameters for [`LogisticRegression`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressionParams {
    pub max_iter: usize,
    /// Inverse regularisation strength
    pub c: f64,
    pub tol: f64,
}

impl Default for LogisticRegressionParams {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            c: 1.0,
            tol: 1e-4,
        }
    }
}

/// Untrained logistic regression
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegression {
    pub params: LogisticRegressionParams,
}

/// Trained logistic regression over standardised features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedLogisticRegression {
    pub params: LogisticRegressionParams,
    pub coefficients: Array1<f64>,
    pub intercept: f64,
    pub mean: Array1<f64>,
    pub scale: Array1<f64>,
    pub n_iter: usize,
    pub converged: bool,
}

impl LogisticRegression {
    pub fn new(params: LogisticRegressionParams) -> Self {
        Self { params }
    }

    pub fn fit(&self, x: &Array2<f64>, y: &[u8]) -> Result<FittedLogisticRegression, ModelError> {
        let (n, d) = x.dim();
        let n_f = n as f64;

        let mean = x
            .mean_axis(Axis(0))
            .ok_or(ModelError::EmptyTrainingSet)?;
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > 1e-12 { s } else { 1.0 });
        let z = (x - &mean) / &scale;
        let target = Array1::from_iter(y.iter().map(|&v| f64::from(v)));

        let reg = 1.0 / (self.params.c * n_f);
        let mean_sq_norm = z.map_axis(Axis(1), |row| row.dot(&row) + 1.0).sum() / n_f;
        let step = 1.0 / (0.25 * mean_sq_norm + reg);

        let mut w = Array1::<f64>::zeros(d);
        let mut b = 0.0;
        let mut n_iter = 0;
        let mut converged = false;

        while n_iter < self.params.max_iter {
            let p = (z.dot(&w) + b).mapv(sigmoid);
            let residual = &p - &target;
            let grad_w = z.t().dot(&residual) / n_f + &w * reg;
            let grad_b = residual.sum() / n_f;

            let grad_max = grad_w
                .iter()
                .fold(grad_b.abs(), |acc, g| acc.max(g.abs()));
            if grad_max < self.params.tol {
                converged = true;
                break;
            }

            w.scaled_add(-step, &grad_w);
            b -= step * grad_b;
            n_iter += 1;
        }

        if converged {
            debug!(n_iter, "logistic regression converged");
        } else {
            warn!(
                max_iter = self.params.max_iter,
                "logistic regression hit the iteration cap before converging"
            );
        }

        Ok(FittedLogisticRegression {
            params: self.params.clone(),
            coefficients: w,
            intercept: b,
            mean,
            scale,
            n_iter,
            converged,
        })
    }
}

impl FittedLogisticRegression {
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Probability of the positive class for every row
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>, ModelError> {
        if x.ncols() != self.n_features() {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features(),
                got: x.ncols(),
            });
        }
        let z = (x - &self.mean) / &self.scale;
        Ok((z.dot(&self.coefficients) + self.intercept)
            .mapv(sigmoid)
            .to_vec())
    }
}

fn sigmoid(v: f64) -> f64 {
    if v >= 0.0 {
        1.0 / (1.0 + (-v).exp())
    } else {
        let e = v.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_default_params() {
        let params = LogisticRegressionParams::default();
        assert_eq!(params.max_iter, 1000);
        assert_eq!(params.c, 1.0);
    }

    #[test]
    fn test_sigmoid_is_stable() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(-1000.0) >= 0.0);
        assert!(sigmoid(1000.0) <= 1.0);
    }

    #[test]
    fn test_learns_monotone_relationship() {
        // Large raw scale exercises the internal standardisation
        let x = Array2::from_shape_fn((60, 1), |(r, _)| r as f64 * 100.0);
        let y: Vec<u8> = (0..60).map(|r| u8::from(r >= 30)).collect();

        let fitted = LogisticRegression::new(LogisticRegressionParams::default())
            .fit(&x, &y)
            .unwrap();

        let probs = fitted.predict_proba(&array![[0.0], [5900.0]]).unwrap();
        assert!(probs[0] < 0.2, "low end: {}", probs[0]);
        assert!(probs[1] > 0.8, "high end: {}", probs[1]);
        assert!(fitted.coefficients[0] > 0.0);
    }

    #[test]
    fn test_constant_column_does_not_produce_nan() {
        let x = array![[1.0, 5.0], [2.0, 5.0], [3.0, 5.0], [4.0, 5.0]];
        let y = vec![0, 0, 1, 1];

        let fitted = LogisticRegression::new(LogisticRegressionParams::default())
            .fit(&x, &y)
            .unwrap();
        let probs = fitted.predict_proba(&x).unwrap();
        assert!(probs.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_iteration_cap_is_respected() {
        let x = Array2::from_shape_fn((20, 1), |(r, _)| r as f64);
        let y: Vec<u8> = (0..20).map(|r| u8::from(r >= 10)).collect();

        let fitted = LogisticRegression::new(LogisticRegressionParams {
            max_iter: 3,
            ..Default::default()
        })
        .fit(&x, &y)
        .unwrap();
        assert!(fitted.n_iter <= 3);
        assert!(!fitted.converged);
    }
}
