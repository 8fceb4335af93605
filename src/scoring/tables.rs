//! Categorical lookup tables for the deterministic scorer.
//!
//! Every table documents its exact value set and falls back to the neutral
//! 0.5 for key pairs it does not know. All tables are authored symmetric so
//! the scorer stays order-independent.

/// Want-kids states recognized by the compatibility matrix.
/// Free-form strings parse case-insensitively; anything else is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WantsKids {
    Yes,
    No,
    Maybe,
    Someday,
    HaveAndWantMore,
    HaveAndDone,
    Unknown,
}

impl WantsKids {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "yes" | "wants_kids" | "definitely" => WantsKids::Yes,
            "no" | "never" | "does_not_want_kids" => WantsKids::No,
            "maybe" | "open" | "unsure" => WantsKids::Maybe,
            "someday" | "eventually" | "not_yet" => WantsKids::Someday,
            "have_and_want_more" | "has_kids_wants_more" => WantsKids::HaveAndWantMore,
            "have_and_done" | "has_kids_done" => WantsKids::HaveAndDone,
            _ => WantsKids::Unknown,
        }
    }
}

/// 6x6 want-kids compatibility matrix. Entries are listed once per unordered
/// pair and looked up in both orders; unknown states hit the 0.5 default.
pub fn wants_kids_compat(a: WantsKids, b: WantsKids) -> f64 {
    entry(a, b).or_else(|| entry(b, a)).unwrap_or(0.5)
}

fn entry(a: WantsKids, b: WantsKids) -> Option<f64> {
    use WantsKids::*;
    let value = match (a, b) {
        (Yes, Yes) => 1.0,
        (Yes, Someday) => 0.85,
        (Yes, Maybe) => 0.7,
        (Yes, HaveAndWantMore) => 0.9,
        (Yes, HaveAndDone) => 0.3,
        (Yes, No) => 0.05,
        (No, No) => 1.0,
        (No, Maybe) => 0.4,
        (No, Someday) => 0.15,
        (No, HaveAndWantMore) => 0.1,
        (No, HaveAndDone) => 0.8,
        (Maybe, Maybe) => 0.8,
        (Maybe, Someday) => 0.75,
        (Maybe, HaveAndWantMore) => 0.6,
        (Maybe, HaveAndDone) => 0.55,
        (Someday, Someday) => 1.0,
        (Someday, HaveAndWantMore) => 0.8,
        (Someday, HaveAndDone) => 0.3,
        (HaveAndWantMore, HaveAndWantMore) => 1.0,
        (HaveAndWantMore, HaveAndDone) => 0.45,
        (HaveAndDone, HaveAndDone) => 1.0,
        _ => return None,
    };
    Some(value)
}

/// Five-point social style scale, introvert to extrovert.
pub const SOCIAL_STYLE_SCALE: &[&str] = &[
    "very_introverted",
    "somewhat_introverted",
    "ambivert",
    "somewhat_extroverted",
    "very_extroverted",
];

/// Five-point public-display-of-affection comfort scale.
pub const PDA_COMFORT_SCALE: &[&str] = &[
    "very_uncomfortable",
    "uncomfortable",
    "neutral",
    "comfortable",
    "very_comfortable",
];

/// Sleep schedule: early_bird | night_owl | flexible.
/// Exact match 1.0, either side flexible 0.8, mismatch 0.4.
pub fn sleep_compat(a: &str, b: &str) -> f64 {
    let (a, b) = (norm(a), norm(b));
    if a == b {
        1.0
    } else if a == "flexible" || b == "flexible" {
        0.8
    } else {
        0.4
    }
}

const EXERCISE_SCALE: &[&str] = &["daily", "regularly", "sometimes", "rarely"];

/// Exercise: daily | regularly | sometimes | rarely.
/// Exact 1.0, adjacent 0.7, otherwise 0.4.
pub fn exercise_compat(a: &str, b: &str) -> f64 {
    graded(EXERCISE_SCALE, &norm(a), &norm(b), 0.7, 0.4)
}

const ALCOHOL_SCALE: &[&str] = &["never", "socially", "regularly"];

/// Alcohol: never | socially | regularly. Exact 1.0, adjacent 0.6, else 0.3.
pub fn alcohol_compat(a: &str, b: &str) -> f64 {
    graded(ALCOHOL_SCALE, &norm(a), &norm(b), 0.6, 0.3)
}

/// Drugs: never | occasionally | regularly. The strictest field: exact match
/// 1.0, anything else 0.3.
pub fn drugs_compat(a: &str, b: &str) -> f64 {
    if norm(a) == norm(b) {
        1.0
    } else {
        0.3
    }
}

/// Location plans: settled | open_to_moving | nomadic.
/// Exact 1.0, either side open_to_moving 0.8, mismatch 0.5.
pub fn location_compat(a: &str, b: &str) -> f64 {
    let (a, b) = (norm(a), norm(b));
    if a == b {
        1.0
    } else if a == "open_to_moving" || b == "open_to_moving" {
        0.8
    } else {
        0.5
    }
}

/// Pets: has_pets | wants_pets | no_pets | allergic.
/// Exact 1.0; has/wants pairing 0.9; allergic against has_pets 0.3; else 0.5.
pub fn pets_compat(a: &str, b: &str) -> f64 {
    let (a, b) = (norm(a), norm(b));
    if a == b {
        return 1.0;
    }
    let pair = |x: &str, y: &str| (a == x && b == y) || (a == y && b == x);
    if pair("has_pets", "wants_pets") {
        0.9
    } else if pair("has_pets", "allergic") {
        0.3
    } else {
        0.5
    }
}

fn graded(scale: &[&str], a: &str, b: &str, adjacent: f64, distant: f64) -> f64 {
    if a == b {
        return 1.0;
    }
    let (Some(i), Some(j)) = (
        scale.iter().position(|label| *label == a),
        scale.iter().position(|label| *label == b),
    ) else {
        return distant;
    };
    if i.abs_diff(j) == 1 {
        adjacent
    } else {
        distant
    }
}

fn norm(value: &str) -> String {
    value.trim().to_lowercase()
}
