//! Demand model
//!
//! Price functions for each supported demand form, their differentiated
//! variants, and the inverse (quantity-from-price) relation. All functions
//! are total: degenerate quantities map to the form's sentinel price instead
//! of infinity or NaN, and degenerate prices invert to a zero quantity.

use crate::models::config::DemandSpec;

/// Market price at an effective quantity, per the configured form.
///
/// - linear: `P = max(0, a − b·Q)`
/// - constant elasticity: `P = A·Q^(−1/σ)`; `Q ≤ 0` maps to `A·1000`
/// - logit-like: `P = max(0, a − b·ln Q)`; `Q ≤ 0` maps to `10a`
/// - exponential: `P = A·e^(−b·Q)`
pub fn price(demand: &DemandSpec, quantity: f64) -> f64 {
    match *demand {
        DemandSpec::Linear { intercept, slope } => (intercept - slope * quantity).max(0.0),
        DemandSpec::ConstantElasticity { scale, elasticity } => {
            if quantity <= 0.0 {
                scale * 1000.0
            } else {
                scale * quantity.powf(-1.0 / elasticity)
            }
        }
        DemandSpec::Logit {
            intercept,
            price_coefficient,
        } => {
            if quantity <= 0.0 {
                10.0 * intercept
            } else {
                (intercept - price_coefficient * quantity.ln()).max(0.0)
            }
        }
        DemandSpec::Exponential { scale, decay_rate } => scale * (-decay_rate * quantity).exp(),
    }
}

/// Effective quantity for firm `firm` under differentiation: its own output
/// plus gamma times every competitor's.
pub fn effective_quantity(quantities: &[f64], firm: usize, gamma: f64) -> f64 {
    let mut effective = 0.0;
    for (j, &q) in quantities.iter().enumerate() {
        effective += if j == firm { q } else { gamma * q };
    }
    effective
}

/// Firm-specific price in a differentiated market: the form's price function
/// evaluated at the firm's effective quantity.
pub fn differentiated_price(
    demand: &DemandSpec,
    gamma: f64,
    quantities: &[f64],
    firm: usize,
) -> f64 {
    price(demand, effective_quantity(quantities, firm, gamma))
}

/// Quantity demanded at a price, per the inverse demand relation.
///
/// Degenerate inputs (non-positive prices for the multiplicative forms,
/// prices above the choke point) clamp to 0.
pub fn quantity_at_price(demand: &DemandSpec, price: f64) -> f64 {
    match *demand {
        DemandSpec::Linear { intercept, slope } => ((intercept - price) / slope).max(0.0),
        DemandSpec::ConstantElasticity { scale, elasticity } => {
            if price <= 0.0 {
                0.0
            } else {
                (scale / price).powf(elasticity)
            }
        }
        DemandSpec::Logit {
            intercept,
            price_coefficient,
        } => ((intercept - price) / price_coefficient).exp(),
        DemandSpec::Exponential { scale, decay_rate } => {
            if price <= 0.0 || price > scale {
                0.0
            } else {
                (scale / price).ln() / decay_rate
            }
        }
    }
}
