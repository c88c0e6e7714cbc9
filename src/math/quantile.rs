//! Empirical quantiles of simulated draws.

/// Linear-interpolated quantile `q ∈ [0, 1]` of `values` (sorted in place).
///
/// Returns `None` for an empty slice. NaNs sort last and are never selected
/// unless every value is NaN.
pub fn quantile_mut(values: &mut [f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let finite = values.iter().take_while(|v| !v.is_nan()).count();
    let values = if finite == 0 { &values[..] } else { &values[..finite] };

    let q = q.clamp(0.0, 1.0);
    let pos = q * (values.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(values[lo] + (values[hi] - values[lo]) * frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_interpolates_between_order_statistics() {
        let mut v = vec![4.0, 1.0, 3.0, 2.0, 5.0];
        assert_eq!(quantile_mut(&mut v, 0.0), Some(1.0));
        assert_eq!(quantile_mut(&mut v, 1.0), Some(5.0));
        assert_eq!(quantile_mut(&mut v, 0.5), Some(3.0));
        let q10 = quantile_mut(&mut v, 0.1).unwrap();
        assert!((q10 - 1.4).abs() < 1e-12);
    }

    #[test]
    fn quantile_of_empty_is_none() {
        assert_eq!(quantile_mut(&mut [], 0.5), None);
    }
}
