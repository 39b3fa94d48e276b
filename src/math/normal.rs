//! Normal density helpers and log-domain reductions.
//!
//! ```text
//! φ(x; μ, σ)    = exp(-(x-μ)² / 2σ²) / (σ √(2π))
//! ln φ(x; μ, σ) = -(x-μ)² / 2σ² - ln σ - ln √(2π)
//! ```

/// `ln(√(2π))`.
const LN_SQRT_2PI: f64 = 0.918_938_533_204_672_8;

/// Normal probability density at `x`.
pub fn normal_pdf(x: f64, mean: f64, sd: f64) -> f64 {
    let z = (x - mean) / sd;
    (-0.5 * z * z).exp() / (sd * std::f64::consts::TAU.sqrt())
}

/// Natural log of the normal density at `x`.
pub fn normal_ln_pdf(x: f64, mean: f64, sd: f64) -> f64 {
    let z = (x - mean) / sd;
    -0.5 * z * z - sd.ln() - LN_SQRT_2PI
}

/// Numerically stable `ln Σ exp(v)`.
///
/// Returns `-inf` for an empty input or when every term is `-inf`, and
/// propagates `NaN`/`+inf` unchanged.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    if !max.is_finite() {
        return max;
    }
    let sum: f64 = values.iter().map(|v| (v - max).exp()).sum();
    max + sum.ln()
}
