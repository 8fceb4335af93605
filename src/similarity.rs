use std::collections::HashSet;

/// Jaccard similarity over case-insensitive string sets.
///
/// Both sets empty counts as full agreement (1.0); exactly one empty set is
/// total disagreement (0.0).
pub fn set_overlap(a: &[String], b: &[String]) -> f64 {
    let left = normalize_set(a);
    let right = normalize_set(b);

    if left.is_empty() && right.is_empty() {
        return 1.0;
    }
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let intersection = left.intersection(&right).count();
    let union = left.union(&right).count();
    intersection as f64 / union as f64
}

/// Fraction of `needs` present in `pool` (case-insensitive). Empty `needs`
/// means no requirements and scores 1.0.
pub fn fraction_satisfied(needs: &[String], pool: &[String]) -> f64 {
    let needs = normalize_set(needs);
    if needs.is_empty() {
        return 1.0;
    }
    let pool = normalize_set(pool);
    let satisfied = needs.iter().filter(|need| pool.contains(*need)).count();
    satisfied as f64 / needs.len() as f64
}

/// `1 - |x - y| / max` for values on a `[1, max]` scale.
pub fn numeric_similarity(x: f64, y: f64, max: f64) -> f64 {
    if max <= 0.0 {
        return 0.0;
    }
    clamp01(1.0 - (x - y).abs() / max)
}

pub fn trait_similarity(x: u8, y: u8) -> f64 {
    numeric_similarity(x as f64, y as f64, 10.0)
}

/// Adjacency-scaled match on an ordered categorical scale: identical labels
/// score 1.0 and each step of distance costs 0.2. A label missing from the
/// scale falls back to the neutral 0.5.
pub fn ordered_scale_similarity(scale: &[&str], a: &str, b: &str) -> f64 {
    let index_a = scale_index(scale, a);
    let index_b = scale_index(scale, b);
    match (index_a, index_b) {
        (Some(i), Some(j)) => {
            let distance = i.abs_diff(j) as f64;
            clamp01(1.0 - 0.2 * distance)
        }
        _ => 0.5,
    }
}

fn scale_index(scale: &[&str], value: &str) -> Option<usize> {
    let needle = value.trim().to_lowercase();
    scale.iter().position(|label| *label == needle)
}

pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.max(0.0).min(1.0)
}

fn normalize_set(values: &[String]) -> HashSet<String> {
    values
        .iter()
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
        .collect()
}
