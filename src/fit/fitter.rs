//! Fitting routines for the two kinetic models.
//!
//! Given:
//! - times `t_i` (minutes)
//! - observed quantities `q_i`
//!
//! we fit:
//! - zero-order: `q = k · t` directly on the quantities
//! - first-order: `ln(scale - q) = ln(A0) - k · t` on the log-transformed quantities
//!
//! Both fits go through the same Levenberg–Marquardt entry point with fixed
//! initial guesses, and both report R² in the space they were fitted in.

use log::{debug, info};
use nalgebra::{DMatrix, DVector};

use crate::domain::{FirstOrderFit, KineticsReport, ModelKind, ObservationSet, ZeroOrderFit, DEFAULT_SCALE};
use crate::error::KineticsError;
use crate::math::{LeastSquaresProblem, SolverOptions, levenberg_marquardt, r2_score, sse};
use crate::models::{back_transform, fill_jacobian_row, predict, remaining_log};

/// Initial guess for the zero-order rate constant.
pub const ZERO_ORDER_INITIAL_K: f64 = 1.0;
/// Initial guess `(k, A0)` for the first-order model.
pub const FIRST_ORDER_INITIAL: [f64; 2] = [0.01, 100.0];

/// Fitting options shared by both models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    /// Total amount on the quantity axis; the first-order transform is
    /// `ln(scale - quantity)`.
    pub scale: f64,
    pub solver: SolverOptions,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            solver: SolverOptions::default(),
        }
    }
}

/// A kinetic model against one observed series, in the model's fitting space.
struct KineticsProblem<'a> {
    model: ModelKind,
    times: &'a [f64],
    observed: &'a [f64],
}

impl LeastSquaresProblem for KineticsProblem<'_> {
    fn name(&self) -> &'static str {
        self.model.display_name()
    }

    fn param_count(&self) -> usize {
        self.model.param_count()
    }

    fn residuals(&self, params: &DVector<f64>) -> DVector<f64> {
        DVector::from_iterator(
            self.times.len(),
            self.times
                .iter()
                .zip(self.observed)
                .map(|(&t, &y)| y - predict(self.model, t, params.as_slice())),
        )
    }

    fn jacobian(&self, params: &DVector<f64>) -> DMatrix<f64> {
        let p = self.model.param_count();
        let mut jac = DMatrix::<f64>::zeros(self.times.len(), p);
        let mut row = vec![0.0; p];
        for (i, &t) in self.times.iter().enumerate() {
            fill_jacobian_row(self.model, t, params.as_slice(), &mut row);
            for (j, &v) in row.iter().enumerate() {
                jac[(i, j)] = v;
            }
        }
        jac
    }
}

/// Fit `quantity = k · time`.
pub fn fit_zero_order(times: &[f64], quantities: &[f64], opts: &FitOptions) -> Result<ZeroOrderFit, KineticsError> {
    check_shape(times, quantities)?;

    let problem = KineticsProblem {
        model: ModelKind::ZeroOrder,
        times,
        observed: quantities,
    };
    let sol = levenberg_marquardt(
        &problem,
        DVector::from_vec(vec![ZERO_ORDER_INITIAL_K]),
        &opts.solver,
    )?;
    let k = sol.params[0];

    let predicted: Vec<f64> = times
        .iter()
        .map(|&t| predict(ModelKind::ZeroOrder, t, &[k]))
        .collect();
    let r2 = r2_score(quantities, &predicted);
    debug!("zero-order: k={k} r2={r2} iterations={}", sol.iterations);

    Ok(ZeroOrderFit {
        k,
        sse: sse(quantities, &predicted),
        predicted,
        r2,
        iterations: sol.iterations,
    })
}

/// Fit `ln(scale - quantity) = ln(A0) - k · time`.
///
/// R² is reported in log space, comparing `ln(scale - q)` with the model
/// output; `predicted` holds the back-transformed curve for display.
pub fn fit_first_order(times: &[f64], quantities: &[f64], opts: &FitOptions) -> Result<FirstOrderFit, KineticsError> {
    check_shape(times, quantities)?;

    let log_observed = quantities
        .iter()
        .enumerate()
        .map(|(i, &q)| {
            remaining_log(q, opts.scale).ok_or(KineticsError::InvalidInput {
                row: i + 1,
                quantity: q,
                scale: opts.scale,
            })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let problem = KineticsProblem {
        model: ModelKind::FirstOrder,
        times,
        observed: &log_observed,
    };
    let sol = levenberg_marquardt(&problem, DVector::from_row_slice(&FIRST_ORDER_INITIAL), &opts.solver)?;
    let (k, a0) = (sol.params[0], sol.params[1]);

    let log_predicted: Vec<f64> = times
        .iter()
        .map(|&t| predict(ModelKind::FirstOrder, t, &[k, a0]))
        .collect();
    let predicted: Vec<f64> = log_predicted.iter().map(|&y| back_transform(y, opts.scale)).collect();
    let r2 = r2_score(&log_observed, &log_predicted);
    debug!("first-order: k={k} a0={a0} r2={r2} iterations={}", sol.iterations);

    Ok(FirstOrderFit {
        k,
        a0,
        sse: sse(&log_observed, &log_predicted),
        log_observed,
        log_predicted,
        predicted,
        r2,
        iterations: sol.iterations,
    })
}

/// Fit both models to one observation set.
pub fn fit_kinetics(observations: &ObservationSet, opts: &FitOptions) -> Result<KineticsReport, KineticsError> {
    let times = observations.times();
    let quantities = observations.quantities();

    let zero_order = fit_zero_order(times, quantities, opts)?;
    let first_order = fit_first_order(times, quantities, opts)?;

    info!(
        "fitted n={} | zero-order k={:.4} r2={:.4} | first-order k={:.4} a0={:.4} r2={:.4}",
        observations.len(),
        zero_order.k,
        zero_order.r2,
        first_order.k,
        first_order.a0,
        first_order.r2,
    );

    Ok(KineticsReport {
        observations: observations.clone(),
        scale: opts.scale,
        zero_order,
        first_order,
    })
}

fn check_shape(times: &[f64], quantities: &[f64]) -> Result<(), KineticsError> {
    if times.len() != quantities.len() {
        return Err(KineticsError::LengthMismatch {
            times: times.len(),
            quantities: quantities.len(),
        });
    }
    if times.is_empty() {
        return Err(KineticsError::EmptyInput);
    }
    Ok(())
}
