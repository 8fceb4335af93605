pub mod profile;
pub mod store;
pub mod synthetic;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use profile::{
    FamilyPlans, IntimacyProfile, Lifestyle, LovePhilosophy, PartnerPreferences, ProfileStore,
    RelationshipStyle, SocialProfile, Traits, UserProfile,
};
pub use store::{RegenGate, UserStore};
pub use synthetic::generate_synthetic_population;

/// Demographic and preference record owned by external onboarding surfaces.
/// The matching core reads it and only ever writes
/// `last_profile_regenerated_at` (through the cooldown gate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub sexuality: Option<String>,
    #[serde(default)]
    pub birthdate: Option<NaiveDate>,
    #[serde(default)]
    pub age_range_min: Option<u8>,
    #[serde(default)]
    pub age_range_max: Option<u8>,
    #[serde(default)]
    pub age_range_dealbreaker: bool,
    #[serde(default)]
    pub profile_audit_completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_profile_regenerated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            gender: None,
            sexuality: None,
            birthdate: None,
            age_range_min: None,
            age_range_max: None,
            age_range_dealbreaker: false,
            profile_audit_completed_at: None,
            last_profile_regenerated_at: None,
        }
    }

    /// Age in whole years on `today`, if a birthdate is known. A birthdate in
    /// the future yields `None` and is treated as unknown by callers.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.birthdate.and_then(|birthdate| today.years_since(birthdate))
    }
}
