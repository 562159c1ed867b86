//! Slice helpers for the vectors flowing between layers.

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn squared_norm(v: &[f64]) -> f64 {
    dot(v, v)
}

/// `a += b`, element-wise.
pub fn add_assign(a: &mut [f64], b: &[f64]) {
    a.iter_mut().zip(b).for_each(|(x, y)| *x += y);
}

/// `a += alpha * b`, element-wise.
pub fn scaled_add(a: &mut [f64], alpha: f64, b: &[f64]) {
    a.iter_mut().zip(b).for_each(|(x, y)| *x += alpha * y);
}

/// Largest element, or `-inf` for an empty slice.
pub fn max(v: &[f64]) -> f64 {
    v.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Index of the maximum element in a slice.
pub fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// One-hot encoding of `class` over `width` outputs.
pub fn one_hot(class: usize, width: usize) -> Vec<f64> {
    let mut v = vec![0.0; width];
    if let Some(x) = v.get_mut(class) {
        *x = 1.0;
    }
    v
}
