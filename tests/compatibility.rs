use pairmatch::scoring::tables::{wants_kids_compat, WantsKids};
use pairmatch::similarity::{
    fraction_satisfied, numeric_similarity, ordered_scale_similarity, set_overlap,
};
use pairmatch::user::{
    FamilyPlans, IntimacyProfile, Lifestyle, LovePhilosophy, PartnerPreferences,
    RelationshipStyle, SocialProfile, Traits, UserProfile,
};
use pairmatch::{score, FactorWeights};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn base_profile(user_id: &str) -> UserProfile {
    UserProfile {
        user_id: user_id.to_string(),
        values: strings(&["honesty", "loyalty"]),
        interests: strings(&["hiking", "cooking"]),
        dealbreakers: Vec::new(),
        traits: Traits::default(),
        relationship_style: RelationshipStyle {
            love_language: "quality_time".to_string(),
            communication_frequency: "daily".to_string(),
            conflict_style: "talk_it_out".to_string(),
            financial_approach: "balanced".to_string(),
            alone_time_need: 5,
        },
        family_plans: FamilyPlans {
            wants_kids: "yes".to_string(),
            family_closeness: 7,
        },
        lifestyle: Lifestyle {
            sleep_schedule: "early_bird".to_string(),
            exercise: "regularly".to_string(),
            alcohol: "socially".to_string(),
            drugs: "never".to_string(),
            location: "settled".to_string(),
            pets: "wants_pets".to_string(),
        },
        social_profile: None,
        intimacy_profile: None,
        love_philosophy: None,
        partner_preferences: None,
    }
}

fn full_profile(user_id: &str) -> UserProfile {
    let mut profile = base_profile(user_id);
    profile.social_profile = Some(SocialProfile {
        social_style: "ambivert".to_string(),
        go_out_frequency: 6,
        friend_approval_importance: 7,
    });
    profile.intimacy_profile = Some(IntimacyProfile {
        physical_intimacy_importance: 7,
        physical_attraction_importance: 6,
        pda_comfort: "comfortable".to_string(),
        triggers: strings(&["criticism"]),
    });
    profile.love_philosophy = Some(LovePhilosophy {
        believes_in_soulmates: "yes".to_string(),
        romantic_gestures: strings(&["letters", "cooking dinner"]),
        love_recognition_signs: strings(&["attention"]),
    });
    profile.partner_preferences = Some(PartnerPreferences {
        must_haves: strings(&["honesty"]),
    });
    profile
}

#[test]
fn weights_sum_to_one() {
    let weights = FactorWeights::default();
    assert!((weights.sum() - 1.0).abs() < 1e-12);
}

#[test]
fn jaccard_boundary_cases() {
    assert_eq!(set_overlap(&[], &[]), 1.0);
    assert_eq!(set_overlap(&strings(&["a"]), &[]), 0.0);
    let third = set_overlap(&strings(&["a", "b"]), &strings(&["b", "c"]));
    assert!((third - 1.0 / 3.0).abs() < 1e-9);
}

#[test]
fn jaccard_is_case_insensitive() {
    let full = set_overlap(&strings(&["Hiking", "COOKING"]), &strings(&["hiking", "cooking"]));
    assert_eq!(full, 1.0);
}

#[test]
fn numeric_similarity_basics() {
    assert_eq!(numeric_similarity(5.0, 5.0, 10.0), 1.0);
    assert!((numeric_similarity(1.0, 10.0, 10.0) - 0.1).abs() < 1e-9);
}

#[test]
fn ordered_scale_adjacency() {
    let scale = &["a", "b", "c", "d", "e"];
    assert_eq!(ordered_scale_similarity(scale, "a", "a"), 1.0);
    assert!((ordered_scale_similarity(scale, "a", "b") - 0.8).abs() < 1e-9);
    assert!((ordered_scale_similarity(scale, "a", "e") - 0.2).abs() < 1e-9);
    assert_eq!(ordered_scale_similarity(scale, "a", "mystery"), 0.5);
}

#[test]
fn fraction_satisfied_handles_empty_needs() {
    assert_eq!(fraction_satisfied(&[], &strings(&["a"])), 1.0);
    let half = fraction_satisfied(&strings(&["a", "b"]), &strings(&["a", "c"]));
    assert!((half - 0.5).abs() < 1e-9);
}

#[test]
fn wants_kids_matrix_is_symmetric_with_default() {
    let states = [
        WantsKids::Yes,
        WantsKids::No,
        WantsKids::Maybe,
        WantsKids::Someday,
        WantsKids::HaveAndWantMore,
        WantsKids::HaveAndDone,
    ];
    for a in states {
        for b in states {
            assert_eq!(wants_kids_compat(a, b), wants_kids_compat(b, a));
        }
    }
    assert_eq!(wants_kids_compat(WantsKids::Unknown, WantsKids::Yes), 0.5);
    assert_eq!(wants_kids_compat(WantsKids::Yes, WantsKids::Yes), 1.0);
    assert_eq!(wants_kids_compat(WantsKids::Yes, WantsKids::No), 0.05);
}

#[test]
fn score_is_symmetric_in_every_entry() {
    let mut a = full_profile("a");
    let mut b = full_profile("b");
    a.values = strings(&["honesty", "adventure", "faith"]);
    b.values = strings(&["honesty", "stability"]);
    a.traits.introversion = 2;
    b.traits.introversion = 9;
    b.family_plans.wants_kids = "maybe".to_string();
    b.lifestyle.sleep_schedule = "night_owl".to_string();
    b.intimacy_profile.as_mut().unwrap().pda_comfort = "neutral".to_string();

    let forward = score(&a, &b, &FactorWeights::default());
    let backward = score(&b, &a, &FactorWeights::default());
    assert_eq!(forward.overall, backward.overall);
    assert_eq!(forward.breakdown, backward.breakdown);
}

#[test]
fn missing_optional_sections_degrade_to_neutral() {
    let bare = base_profile("a");
    let rich = full_profile("b");

    let result = score(&bare, &rich, &FactorWeights::default());
    assert_eq!(result.breakdown.social, 50);
    assert_eq!(result.breakdown.intimacy, 50);
    assert_eq!(result.breakdown.love_philosophy, 50);
    assert_eq!(result.breakdown.partner_preferences, 50);
}

#[test]
fn identical_core_profiles_land_in_high_band() {
    // Ceiling smoke test: matching values, traits, lifestyle, and family
    // plans with all optional sections absent.
    let a = base_profile("user1");
    let b = base_profile("user2");

    let result = score(&a, &b, &FactorWeights::default());
    assert!(result.overall >= 80, "expected >= 80, got {}", result.overall);
    assert_eq!(result.overall, 87);
    assert_eq!(result.breakdown.values, 100);
    assert_eq!(result.breakdown.family_plans, 100);
    assert_eq!(result.breakdown.personality, 100);
}

#[test]
fn opposed_family_plans_drag_the_score_down() {
    let a = base_profile("a");
    let mut b = base_profile("b");
    b.family_plans.wants_kids = "no".to_string();

    let matched = score(&a, &base_profile("c"), &FactorWeights::default());
    let opposed = score(&a, &b, &FactorWeights::default());
    assert!(opposed.overall < matched.overall);
    assert!(opposed.breakdown.family_plans < matched.breakdown.family_plans);
}

#[test]
fn unknown_lifestyle_labels_fall_back_to_partial_credit() {
    let mut a = base_profile("a");
    let mut b = base_profile("b");
    a.lifestyle.sleep_schedule = "whenever".to_string();
    b.lifestyle.sleep_schedule = "sporadic".to_string();

    let result = score(&a, &b, &FactorWeights::default());
    // The scorer stays total: odd labels cost partial credit, never error.
    assert!(result.breakdown.lifestyle < 100);
    assert!(result.breakdown.lifestyle > 0);
}
