//! Model evaluation for zero-order and first-order kinetics.
//!
//! The fitter relies on three primitive operations per model:
//! - predict the model output at a time `t` (for residuals/plots)
//! - fill a Jacobian row `∂f/∂p` at `t` (for Levenberg–Marquardt)
//! - map between quantity units and the first-order log space

use crate::domain::ModelKind;

/// Zero-order model: `q(t) = k · t`.
pub fn zero_order(t: f64, k: f64) -> f64 {
    k * t
}

/// First-order model in log space: `y(t) = ln(A0) - k · t`.
///
/// Returns NaN for `A0 <= 0`; the solver treats that as a rejected step.
pub fn first_order(t: f64, k: f64, a0: f64) -> f64 {
    a0.ln() - k * t
}

/// Log-space transform of an observed quantity: `ln(scale - q)`.
///
/// Returns `None` when `scale - q <= 0` (or the result is not finite).
pub fn remaining_log(quantity: f64, scale: f64) -> Option<f64> {
    let remaining = scale - quantity;
    if !(remaining > 0.0) {
        return None;
    }
    let y = remaining.ln();
    y.is_finite().then_some(y)
}

/// Back-transform of a log-space value to quantity units: `scale - exp(y)`.
pub fn back_transform(y: f64, scale: f64) -> f64 {
    scale - y.exp()
}

/// Predict the model output in its fitting space.
///
/// `params` is `[k]` for zero-order and `[k, A0]` for first-order.
pub fn predict(model: ModelKind, t: f64, params: &[f64]) -> f64 {
    match model {
        ModelKind::ZeroOrder => zero_order(t, params[0]),
        ModelKind::FirstOrder => first_order(t, params[0], params[1]),
    }
}

/// Predict in quantity units (first-order is back-transformed).
pub fn predict_quantity(model: ModelKind, t: f64, params: &[f64], scale: f64) -> f64 {
    match model {
        ModelKind::ZeroOrder => zero_order(t, params[0]),
        ModelKind::FirstOrder => back_transform(first_order(t, params[0], params[1]), scale),
    }
}

/// Fill a Jacobian row `∂f/∂p` at time `t`.
///
/// # Panics
/// Panics if `out` or `params` is shorter than `model.param_count()`.
pub fn fill_jacobian_row(model: ModelKind, t: f64, params: &[f64], out: &mut [f64]) {
    match model {
        ModelKind::ZeroOrder => {
            out[0] = t;
        }
        ModelKind::FirstOrder => {
            out[0] = -t;
            out[1] = 1.0 / params[1];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_order_round_trips_through_log_space() {
        let scale = 100.0;
        let q = 37.5;
        let y = remaining_log(q, scale).unwrap();
        assert!((back_transform(y, scale) - q).abs() < 1e-12);
    }

    #[test]
    fn remaining_log_rejects_full_dissolution() {
        assert_eq!(remaining_log(100.0, 100.0), None);
        assert_eq!(remaining_log(120.0, 100.0), None);
        assert_eq!(remaining_log(f64::NAN, 100.0), None);
        assert!(remaining_log(99.0, 100.0).is_some());
    }

    #[test]
    fn jacobian_matches_finite_difference() {
        let params = [0.03, 95.0];
        let t = 12.0;
        let mut row = [0.0; 2];
        fill_jacobian_row(ModelKind::FirstOrder, t, &params, &mut row);

        let h = 1e-6;
        let dk = (predict(ModelKind::FirstOrder, t, &[params[0] + h, params[1]])
            - predict(ModelKind::FirstOrder, t, &[params[0] - h, params[1]]))
            / (2.0 * h);
        let da0 = (predict(ModelKind::FirstOrder, t, &[params[0], params[1] + h])
            - predict(ModelKind::FirstOrder, t, &[params[0], params[1] - h]))
            / (2.0 * h);
        assert!((row[0] - dk).abs() < 1e-6);
        assert!((row[1] - da0).abs() < 1e-6);
    }

    #[test]
    fn predict_quantity_back_transforms_first_order() {
        // ln(100) - 0 * t -> 100 - 100 = 0 dissolved at any time.
        let q = predict_quantity(ModelKind::FirstOrder, 5.0, &[0.0, 100.0], 100.0);
        assert!(q.abs() < 1e-12);
        assert_eq!(predict_quantity(ModelKind::ZeroOrder, 4.0, &[2.5], 100.0), 10.0);
    }
}
