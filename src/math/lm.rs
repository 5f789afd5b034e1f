//! Levenberg–Marquardt nonlinear least squares.
//!
//! Minimizes `Σ r_i(p)²` where `r = y_obs - f(p)`. Each iteration solves the
//! damped linearized problem as an augmented least-squares system
//!
//! ```text
//! [ J          ]     [ r ]
//! [ sqrt(λ·D)  ] δ = [ 0 ]
//! ```
//!
//! with `D = diag(JᵀJ)` (Marquardt scaling), using the SVD solver from
//! `math::ols`. A step is accepted when the cost does not increase; λ is
//! divided by 10 on acceptance and multiplied by 10 on rejection.

use log::debug;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::KineticsError;
use crate::math::ols::{numerical_rank, solve_least_squares};

const LAMBDA_MIN: f64 = 1e-15;
const LAMBDA_MAX: f64 = 1e16;
/// Floor for the Marquardt scaling of a parameter with a vanishing column.
const DIAG_FLOOR: f64 = 1e-12;

/// A least-squares problem in the shape the solver expects.
pub trait LeastSquaresProblem {
    /// Label used in errors and logs.
    fn name(&self) -> &'static str;

    fn param_count(&self) -> usize;

    /// Residuals `y_obs - f(params)`, one per observation.
    fn residuals(&self, params: &DVector<f64>) -> DVector<f64>;

    /// Jacobian of the model `∂f_i/∂p_j` (`n × p`).
    fn jacobian(&self, params: &DVector<f64>) -> DMatrix<f64>;
}

/// Solver tolerances and limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverOptions {
    pub max_iterations: usize,
    /// Relative step-size tolerance.
    pub xtol: f64,
    /// Relative cost-reduction tolerance.
    pub ftol: f64,
    pub initial_lambda: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            xtol: 1e-10,
            ftol: 1e-12,
            initial_lambda: 1e-3,
        }
    }
}

/// Converged parameters.
#[derive(Debug, Clone)]
pub struct Solution {
    pub params: DVector<f64>,
    /// Sum of squared residuals at `params`.
    pub cost: f64,
    pub iterations: usize,
}

/// Run Levenberg–Marquardt from `initial`.
///
/// Fails with `Degenerate` when there are fewer observations than parameters
/// or the Jacobian is rank-deficient, and with `NonConvergence` when the
/// iteration limit is hit or no downhill step can be found.
pub fn levenberg_marquardt<P: LeastSquaresProblem>(
    problem: &P,
    initial: DVector<f64>,
    opts: &SolverOptions,
) -> Result<Solution, KineticsError> {
    let p = problem.param_count();
    let mut params = initial;
    let mut r = problem.residuals(&params);
    let n = r.len();

    if n < p {
        return Err(KineticsError::Degenerate {
            model: problem.name(),
            reason: format!("{n} observation(s) for {p} free parameter(s)"),
        });
    }

    let mut cost = r.norm_squared();
    if !cost.is_finite() {
        return Err(KineticsError::Degenerate {
            model: problem.name(),
            reason: "residuals are not finite at the initial guess".to_string(),
        });
    }
    ensure_full_rank(problem, &params)?;

    let mut lambda = opts.initial_lambda;

    for iteration in 1..=opts.max_iterations {
        let j = problem.jacobian(&params);
        let diag: Vec<f64> = (0..p)
            .map(|c| j.column(c).norm_squared().max(DIAG_FLOOR))
            .collect();

        let mut accepted = false;
        while lambda <= LAMBDA_MAX {
            let a = DMatrix::from_fn(n + p, p, |i, c| {
                if i < n {
                    j[(i, c)]
                } else if i - n == c {
                    (lambda * diag[c]).sqrt()
                } else {
                    0.0
                }
            });
            let b = DVector::from_fn(n + p, |i, _| if i < n { r[i] } else { 0.0 });

            let Some(delta) = solve_least_squares(&a, &b) else {
                lambda *= 10.0;
                continue;
            };

            let step_small = delta.norm() <= opts.xtol * (params.norm() + opts.xtol);
            let trial = &params + &delta;
            let r_trial = problem.residuals(&trial);
            let cost_trial = r_trial.norm_squared();

            if cost_trial.is_finite() && cost_trial <= cost {
                let reduction = cost - cost_trial;
                let previous = cost;
                params = trial;
                r = r_trial;
                cost = cost_trial;
                lambda = (lambda / 10.0).max(LAMBDA_MIN);
                accepted = true;

                debug!(
                    "{}: iter {iteration} cost={cost:.6e} lambda={lambda:.1e} params={:?}",
                    problem.name(),
                    params.as_slice()
                );

                if step_small || reduction <= opts.ftol * previous {
                    return finish(problem, params, cost, iteration);
                }
                break;
            }

            // Rejected, but the step was already negligible: we are at a minimum.
            if step_small {
                return finish(problem, params, cost, iteration);
            }
            lambda *= 10.0;
        }

        if !accepted {
            debug!("{}: damping overflow at iter {iteration}", problem.name());
            return Err(KineticsError::NonConvergence {
                model: problem.name(),
                iterations: iteration,
            });
        }
    }

    Err(KineticsError::NonConvergence {
        model: problem.name(),
        iterations: opts.max_iterations,
    })
}

fn finish<P: LeastSquaresProblem>(
    problem: &P,
    params: DVector<f64>,
    cost: f64,
    iterations: usize,
) -> Result<Solution, KineticsError> {
    if !params.iter().all(|v| v.is_finite()) {
        return Err(KineticsError::NonConvergence {
            model: problem.name(),
            iterations,
        });
    }
    ensure_full_rank(problem, &params)?;
    Ok(Solution {
        params,
        cost,
        iterations,
    })
}

fn ensure_full_rank<P: LeastSquaresProblem>(problem: &P, params: &DVector<f64>) -> Result<(), KineticsError> {
    let j = problem.jacobian(params);
    let rank = numerical_rank(&j);
    let p = problem.param_count();
    if rank < p {
        return Err(KineticsError::Degenerate {
            model: problem.name(),
            reason: format!("Jacobian has rank {rank}, need {p}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// y = a · exp(b · x), a classic nonlinear test problem.
    struct ExpDecay {
        x: Vec<f64>,
        y: Vec<f64>,
    }

    impl LeastSquaresProblem for ExpDecay {
        fn name(&self) -> &'static str {
            "exp-decay"
        }

        fn param_count(&self) -> usize {
            2
        }

        fn residuals(&self, params: &DVector<f64>) -> DVector<f64> {
            DVector::from_iterator(
                self.x.len(),
                self.x
                    .iter()
                    .zip(&self.y)
                    .map(|(&x, &y)| y - params[0] * (params[1] * x).exp()),
            )
        }

        fn jacobian(&self, params: &DVector<f64>) -> DMatrix<f64> {
            DMatrix::from_fn(self.x.len(), 2, |i, c| {
                let e = (params[1] * self.x[i]).exp();
                if c == 0 { e } else { params[0] * self.x[i] * e }
            })
        }
    }

    #[test]
    fn recovers_exponential_parameters() {
        let x: Vec<f64> = (0..10).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|&x| 3.0 * (-0.4 * x).exp()).collect();
        let problem = ExpDecay { x, y };

        let sol = levenberg_marquardt(&problem, DVector::from_vec(vec![1.0, -0.1]), &SolverOptions::default())
            .unwrap();
        assert!((sol.params[0] - 3.0).abs() < 1e-7, "a={}", sol.params[0]);
        assert!((sol.params[1] + 0.4).abs() < 1e-7, "b={}", sol.params[1]);
        assert!(sol.cost < 1e-12);
    }

    #[test]
    fn too_few_observations_is_degenerate() {
        let problem = ExpDecay {
            x: vec![1.0],
            y: vec![2.0],
        };
        let err = levenberg_marquardt(&problem, DVector::from_vec(vec![1.0, -0.1]), &SolverOptions::default())
            .unwrap_err();
        assert!(matches!(err, KineticsError::Degenerate { .. }));
    }

    #[test]
    fn iteration_limit_reports_non_convergence() {
        let x: Vec<f64> = (0..10).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|&x| 3.0 * (-0.4 * x).exp()).collect();
        let problem = ExpDecay { x, y };
        let opts = SolverOptions {
            max_iterations: 1,
            ..SolverOptions::default()
        };

        let err = levenberg_marquardt(&problem, DVector::from_vec(vec![1.0, -0.1]), &opts).unwrap_err();
        assert_eq!(
            err,
            KineticsError::NonConvergence {
                model: "exp-decay",
                iterations: 1
            }
        );
    }
}
