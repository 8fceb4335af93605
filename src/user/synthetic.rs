use chrono::{NaiveDate, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::user::profile::{
    FamilyPlans, IntimacyProfile, Lifestyle, LovePhilosophy, PartnerPreferences,
    RelationshipStyle, SocialProfile, Traits, UserProfile,
};
use crate::user::User;

const GENDERS: &[&str] = &["man", "woman", "non-binary"];
const SEXUALITIES: &[&str] = &["straight", "gay", "lesbian", "bisexual", "pansexual"];
const VALUE_POOL: &[&str] = &[
    "honesty", "loyalty", "kindness", "ambition", "family", "adventure", "faith", "humor",
    "growth", "stability", "creativity", "independence",
];
const INTEREST_POOL: &[&str] = &[
    "hiking", "cooking", "travel", "reading", "live music", "climbing", "board games", "yoga",
    "photography", "gardening", "cycling", "films",
];
const LOVE_LANGUAGES: &[&str] = &[
    "words_of_affirmation", "quality_time", "acts_of_service", "physical_touch", "gifts",
];
const COMMUNICATION: &[&str] = &["constant", "daily", "every_few_days", "weekly"];
const CONFLICT: &[&str] = &["talk_it_out", "cool_off_first", "avoidant", "direct"];
const FINANCES: &[&str] = &["saver", "spender", "balanced", "separate_finances"];
const WANTS_KIDS: &[&str] = &["yes", "no", "maybe", "someday", "have_and_want_more", "have_and_done"];
const SLEEP: &[&str] = &["early_bird", "night_owl", "flexible"];
const EXERCISE: &[&str] = &["daily", "regularly", "sometimes", "rarely"];
const ALCOHOL: &[&str] = &["never", "socially", "regularly"];
const DRUGS: &[&str] = &["never", "occasionally", "regularly"];
const LOCATION: &[&str] = &["settled", "open_to_moving", "nomadic"];
const PETS: &[&str] = &["has_pets", "wants_pets", "no_pets", "allergic"];
const SOCIAL_STYLES: &[&str] = &[
    "very_introverted", "somewhat_introverted", "ambivert", "somewhat_extroverted",
    "very_extroverted",
];
const PDA: &[&str] = &[
    "very_uncomfortable", "uncomfortable", "neutral", "comfortable", "very_comfortable",
];
const SOULMATES: &[&str] = &["yes", "no", "unsure"];

/// Deterministic demo population for the `seed` command and local serving.
/// Real users and profiles arrive from the external onboarding/extraction
/// surfaces; this stands in for them.
pub fn generate_synthetic_population(count: usize, seed: u64) -> Vec<(User, UserProfile)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut population = Vec::with_capacity(count);

    for idx in 0..count {
        let user_id = format!("user_{:03}", idx + 1);
        let mut user = User::new(user_id.clone(), format!("Demo User {}", idx + 1));
        user.gender = Some(sample(&mut rng, GENDERS));
        user.sexuality = Some(sample(&mut rng, SEXUALITIES));
        user.birthdate = random_birthdate(&mut rng);
        user.age_range_min = Some(rng.gen_range(21..28));
        user.age_range_max = Some(rng.gen_range(35..55));
        user.age_range_dealbreaker = rng.gen::<f64>() < 0.3;
        user.profile_audit_completed_at = Some(Utc::now());

        let profile = random_profile(&mut rng, &user_id);
        population.push((user, profile));
    }

    population
}

fn random_profile(rng: &mut StdRng, user_id: &str) -> UserProfile {
    UserProfile {
        user_id: user_id.to_string(),
        values: sample_many(rng, VALUE_POOL, 3, 6),
        interests: sample_many(rng, INTEREST_POOL, 3, 6),
        dealbreakers: sample_many(rng, &["smoking", "dishonesty", "no ambition"], 0, 2),
        traits: random_traits(rng),
        relationship_style: RelationshipStyle {
            love_language: sample(rng, LOVE_LANGUAGES),
            communication_frequency: sample(rng, COMMUNICATION),
            conflict_style: sample(rng, CONFLICT),
            financial_approach: sample(rng, FINANCES),
            alone_time_need: rng.gen_range(1..=10),
        },
        family_plans: FamilyPlans {
            wants_kids: sample(rng, WANTS_KIDS),
            family_closeness: rng.gen_range(1..=10),
        },
        lifestyle: Lifestyle {
            sleep_schedule: sample(rng, SLEEP),
            exercise: sample(rng, EXERCISE),
            alcohol: sample(rng, ALCOHOL),
            drugs: sample(rng, DRUGS),
            location: sample(rng, LOCATION),
            pets: sample(rng, PETS),
        },
        social_profile: maybe(rng, 0.8, |rng| SocialProfile {
            social_style: sample(rng, SOCIAL_STYLES),
            go_out_frequency: rng.gen_range(1..=10),
            friend_approval_importance: rng.gen_range(1..=10),
        }),
        intimacy_profile: maybe(rng, 0.7, |rng| IntimacyProfile {
            physical_intimacy_importance: rng.gen_range(1..=10),
            physical_attraction_importance: rng.gen_range(1..=10),
            pda_comfort: sample(rng, PDA),
            triggers: sample_many(rng, &["criticism", "silence", "jealousy"], 0, 2),
        }),
        love_philosophy: maybe(rng, 0.7, |rng| LovePhilosophy {
            believes_in_soulmates: sample(rng, SOULMATES),
            romantic_gestures: sample_many(rng, &["letters", "surprise trips", "cooking dinner"], 1, 3),
            love_recognition_signs: sample_many(rng, &["attention", "acts", "words"], 1, 3),
        }),
        partner_preferences: maybe(rng, 0.6, |rng| PartnerPreferences {
            must_haves: sample_many(rng, VALUE_POOL, 1, 3),
        }),
    }
}

fn random_traits(rng: &mut StdRng) -> Traits {
    Traits {
        introversion: rng.gen_range(1..=10),
        adventurousness: rng.gen_range(1..=10),
        ambition: rng.gen_range(1..=10),
        emotional_openness: rng.gen_range(1..=10),
        traditional_values: rng.gen_range(1..=10),
        independence_need: rng.gen_range(1..=10),
        romantic_style: rng.gen_range(1..=10),
        social_energy: rng.gen_range(1..=10),
        communication_style: rng.gen_range(1..=10),
        attachment_style: rng.gen_range(1..=10),
        planning_style: rng.gen_range(1..=10),
    }
}

fn random_birthdate(rng: &mut StdRng) -> Option<NaiveDate> {
    let year = rng.gen_range(1970..=2004);
    let month = rng.gen_range(1..=12);
    let day = rng.gen_range(1..=28);
    NaiveDate::from_ymd_opt(year, month, day)
}

fn sample(rng: &mut StdRng, pool: &[&str]) -> String {
    pool[rng.gen_range(0..pool.len())].to_string()
}

fn sample_many(rng: &mut StdRng, pool: &[&str], min: usize, max: usize) -> Vec<String> {
    let take = rng.gen_range(min..=max.min(pool.len()));
    let mut indices: Vec<usize> = (0..pool.len()).collect();
    let mut picked = Vec::with_capacity(take);
    for _ in 0..take {
        let slot = rng.gen_range(0..indices.len());
        picked.push(pool[indices.swap_remove(slot)].to_string());
    }
    picked
}

fn maybe<T>(rng: &mut StdRng, probability: f64, build: impl FnOnce(&mut StdRng) -> T) -> Option<T> {
    if rng.gen::<f64>() < probability {
        Some(build(rng))
    } else {
        None
    }
}
