use serde::{Deserialize, Serialize};

use crate::scoring::tables::{
    alcohol_compat, drugs_compat, exercise_compat, location_compat, pets_compat, sleep_compat,
    wants_kids_compat, WantsKids, PDA_COMFORT_SCALE, SOCIAL_STYLE_SCALE,
};
use crate::scoring::weights::FactorWeights;
use crate::similarity::{
    fraction_satisfied, ordered_scale_similarity, set_overlap, trait_similarity,
};
use crate::user::UserProfile;

/// Sub-score when an optional profile section is absent on either side.
pub const NEUTRAL: f64 = 0.5;

/// Per-factor breakdown, each entry rounded to an integer 0-100 for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub values: u32,
    pub lifestyle: u32,
    pub relationship_style: u32,
    pub family_plans: u32,
    pub interests: u32,
    pub personality: u32,
    pub social: u32,
    pub intimacy: u32,
    pub love_philosophy: u32,
    pub partner_preferences: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityScore {
    pub overall: u32,
    pub breakdown: ScoreBreakdown,
}

/// Deterministic weighted compatibility score for two profiles. Pure and
/// symmetric: every sub-score function is itself symmetric, so
/// `score(a, b) == score(b, a)` including every breakdown entry.
pub fn score(a: &UserProfile, b: &UserProfile, weights: &FactorWeights) -> CompatibilityScore {
    let values = values_score(a, b);
    let lifestyle = lifestyle_score(a, b);
    let relationship_style = relationship_style_score(a, b);
    let family_plans = family_plans_score(a, b);
    let interests = interests_score(a, b);
    let personality = personality_score(a, b);
    let social = social_score(a, b);
    let intimacy = intimacy_score(a, b);
    let love_philosophy = love_philosophy_score(a, b);
    let partner_preferences = partner_preferences_score(a, b);

    let weighted = values * weights.values
        + lifestyle * weights.lifestyle
        + relationship_style * weights.relationship_style
        + family_plans * weights.family_plans
        + interests * weights.interests
        + personality * weights.personality
        + social * weights.social
        + intimacy * weights.intimacy
        + love_philosophy * weights.love_philosophy
        + partner_preferences * weights.partner_preferences;

    CompatibilityScore {
        overall: to_display(weighted),
        breakdown: ScoreBreakdown {
            values: to_display(values),
            lifestyle: to_display(lifestyle),
            relationship_style: to_display(relationship_style),
            family_plans: to_display(family_plans),
            interests: to_display(interests),
            personality: to_display(personality),
            social: to_display(social),
            intimacy: to_display(intimacy),
            love_philosophy: to_display(love_philosophy),
            partner_preferences: to_display(partner_preferences),
        },
    }
}

pub fn values_score(a: &UserProfile, b: &UserProfile) -> f64 {
    set_overlap(&a.values, &b.values)
}

pub fn interests_score(a: &UserProfile, b: &UserProfile) -> f64 {
    set_overlap(&a.interests, &b.interests)
}

pub fn lifestyle_score(a: &UserProfile, b: &UserProfile) -> f64 {
    let left = &a.lifestyle;
    let right = &b.lifestyle;
    let checks = [
        sleep_compat(&left.sleep_schedule, &right.sleep_schedule),
        exercise_compat(&left.exercise, &right.exercise),
        alcohol_compat(&left.alcohol, &right.alcohol),
        drugs_compat(&left.drugs, &right.drugs),
        location_compat(&left.location, &right.location),
        pets_compat(&left.pets, &right.pets),
    ];
    average(&checks)
}

pub fn relationship_style_score(a: &UserProfile, b: &UserProfile) -> f64 {
    let left = &a.relationship_style;
    let right = &b.relationship_style;
    let checks = [
        categorical_match(&left.love_language, &right.love_language, 0.6),
        categorical_match(
            &left.communication_frequency,
            &right.communication_frequency,
            0.5,
        ),
        categorical_match(&left.conflict_style, &right.conflict_style, 0.6),
        categorical_match(&left.financial_approach, &right.financial_approach, 0.5),
        trait_similarity(left.alone_time_need, right.alone_time_need),
    ];
    average(&checks)
}

pub fn family_plans_score(a: &UserProfile, b: &UserProfile) -> f64 {
    let kids = wants_kids_compat(
        WantsKids::parse(&a.family_plans.wants_kids),
        WantsKids::parse(&b.family_plans.wants_kids),
    );
    let closeness = trait_similarity(
        a.family_plans.family_closeness,
        b.family_plans.family_closeness,
    );
    average(&[kids, closeness])
}

pub fn personality_score(a: &UserProfile, b: &UserProfile) -> f64 {
    let left = a.traits.as_array();
    let right = b.traits.as_array();
    let total: f64 = left
        .iter()
        .zip(right.iter())
        .map(|(x, y)| trait_similarity(*x, *y))
        .sum();
    total / left.len() as f64
}

pub fn social_score(a: &UserProfile, b: &UserProfile) -> f64 {
    let (Some(left), Some(right)) = (a.social_profile.as_ref(), b.social_profile.as_ref()) else {
        return NEUTRAL;
    };
    let checks = [
        ordered_scale_similarity(SOCIAL_STYLE_SCALE, &left.social_style, &right.social_style),
        trait_similarity(left.go_out_frequency, right.go_out_frequency),
        trait_similarity(
            left.friend_approval_importance,
            right.friend_approval_importance,
        ),
    ];
    average(&checks)
}

pub fn intimacy_score(a: &UserProfile, b: &UserProfile) -> f64 {
    let (Some(left), Some(right)) = (a.intimacy_profile.as_ref(), b.intimacy_profile.as_ref())
    else {
        return NEUTRAL;
    };
    let mut checks = vec![
        trait_similarity(
            left.physical_intimacy_importance,
            right.physical_intimacy_importance,
        ),
        trait_similarity(
            left.physical_attraction_importance,
            right.physical_attraction_importance,
        ),
        ordered_scale_similarity(PDA_COMFORT_SCALE, &left.pda_comfort, &right.pda_comfort),
    ];
    if !left.triggers.is_empty() && !right.triggers.is_empty() {
        checks.push(set_overlap(&left.triggers, &right.triggers));
    }
    average(&checks)
}

pub fn love_philosophy_score(a: &UserProfile, b: &UserProfile) -> f64 {
    let (Some(left), Some(right)) = (a.love_philosophy.as_ref(), b.love_philosophy.as_ref())
    else {
        return NEUTRAL;
    };
    let mut checks = vec![categorical_match(
        &left.believes_in_soulmates,
        &right.believes_in_soulmates,
        0.6,
    )];
    if !left.romantic_gestures.is_empty() && !right.romantic_gestures.is_empty() {
        checks.push(set_overlap(&left.romantic_gestures, &right.romantic_gestures));
    }
    if !left.love_recognition_signs.is_empty() && !right.love_recognition_signs.is_empty() {
        checks.push(set_overlap(
            &left.love_recognition_signs,
            &right.love_recognition_signs,
        ));
    }
    average(&checks)
}

pub fn partner_preferences_score(a: &UserProfile, b: &UserProfile) -> f64 {
    let (Some(left), Some(right)) = (
        a.partner_preferences.as_ref(),
        b.partner_preferences.as_ref(),
    ) else {
        return NEUTRAL;
    };
    let pool_b: Vec<String> = b.values.iter().chain(b.interests.iter()).cloned().collect();
    let pool_a: Vec<String> = a.values.iter().chain(a.interests.iter()).cloned().collect();
    let forward = fraction_satisfied(&left.must_haves, &pool_b);
    let backward = fraction_satisfied(&right.must_haves, &pool_a);
    average(&[forward, backward])
}

fn categorical_match(a: &str, b: &str, partial: f64) -> f64 {
    if a.trim().to_lowercase() == b.trim().to_lowercase() {
        1.0
    } else {
        partial
    }
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return NEUTRAL;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn to_display(value: f64) -> u32 {
    (value * 100.0).round().clamp(0.0, 100.0) as u32
}
