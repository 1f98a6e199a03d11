//! Range functions. Each receives the numbers parsed from a range, which may
//! include infinities; SUM/AVERAGE/MAX/MIN ignore non-finite values while
//! COUNT counts the finite ones.

fn finite(values: &[f64]) -> impl Iterator<Item = f64> + '_ {
    values.iter().copied().filter(|v| v.is_finite())
}

/// SUM - Sum of values, 0 when empty
pub fn sum(values: &[f64]) -> f64 {
    finite(values).sum()
}

/// AVERAGE - Mean of values, 0 when empty
pub fn average(values: &[f64]) -> f64 {
    let (total, count) = finite(values).fold((0.0, 0usize), |(t, c), v| (t + v, c + 1));
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// MAX - Largest value, 0 when empty
pub fn max(values: &[f64]) -> f64 {
    finite(values).reduce(f64::max).unwrap_or(0.0)
}

/// MIN - Smallest value, 0 when empty
pub fn min(values: &[f64]) -> f64 {
    finite(values).reduce(f64::min).unwrap_or(0.0)
}

/// COUNT - Number of finite values in the raw argument list
pub fn count(values: &[f64]) -> f64 {
    values.iter().filter(|v| v.is_finite()).count() as f64
}
