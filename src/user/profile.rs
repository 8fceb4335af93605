use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Structured extraction of one person's dating-relevant attributes.
/// Produced wholesale by the external extraction pipeline; the matching core
/// never partially mutates it. At most one profile exists per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub dealbreakers: Vec<String>,
    pub traits: Traits,
    pub relationship_style: RelationshipStyle,
    pub family_plans: FamilyPlans,
    pub lifestyle: Lifestyle,
    #[serde(default)]
    pub social_profile: Option<SocialProfile>,
    #[serde(default)]
    pub intimacy_profile: Option<IntimacyProfile>,
    #[serde(default)]
    pub love_philosophy: Option<LovePhilosophy>,
    #[serde(default)]
    pub partner_preferences: Option<PartnerPreferences>,
}

/// Eleven personality dimensions, each on a 1-10 scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Traits {
    pub introversion: u8,
    pub adventurousness: u8,
    pub ambition: u8,
    pub emotional_openness: u8,
    pub traditional_values: u8,
    pub independence_need: u8,
    pub romantic_style: u8,
    pub social_energy: u8,
    pub communication_style: u8,
    pub attachment_style: u8,
    pub planning_style: u8,
}

impl Traits {
    pub fn as_array(&self) -> [u8; 11] {
        [
            self.introversion,
            self.adventurousness,
            self.ambition,
            self.emotional_openness,
            self.traditional_values,
            self.independence_need,
            self.romantic_style,
            self.social_energy,
            self.communication_style,
            self.attachment_style,
            self.planning_style,
        ]
    }
}

impl Default for Traits {
    fn default() -> Self {
        Self {
            introversion: 5,
            adventurousness: 5,
            ambition: 5,
            emotional_openness: 5,
            traditional_values: 5,
            independence_need: 5,
            romantic_style: 5,
            social_energy: 5,
            communication_style: 5,
            attachment_style: 5,
            planning_style: 5,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipStyle {
    pub love_language: String,
    pub communication_frequency: String,
    pub conflict_style: String,
    pub financial_approach: String,
    /// 1-10 scale.
    pub alone_time_need: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FamilyPlans {
    /// Categorical want-kids state, see `scoring::tables::WantsKids`.
    pub wants_kids: String,
    /// Desired closeness with family of origin, 1-10.
    pub family_closeness: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lifestyle {
    pub sleep_schedule: String,
    pub exercise: String,
    pub alcohol: String,
    pub drugs: String,
    pub location: String,
    pub pets: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialProfile {
    /// Five-point ordered scale from very_introverted to very_extroverted.
    pub social_style: String,
    /// 1-10 scale.
    pub go_out_frequency: u8,
    /// 1-10 scale.
    pub friend_approval_importance: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntimacyProfile {
    /// 1-10 scale.
    pub physical_intimacy_importance: u8,
    /// 1-10 scale.
    pub physical_attraction_importance: u8,
    /// Five-point ordered scale from very_uncomfortable to very_comfortable.
    pub pda_comfort: String,
    #[serde(default)]
    pub triggers: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LovePhilosophy {
    pub believes_in_soulmates: String,
    #[serde(default)]
    pub romantic_gestures: Vec<String>,
    #[serde(default)]
    pub love_recognition_signs: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartnerPreferences {
    #[serde(default)]
    pub must_haves: Vec<String>,
}

pub struct ProfileStore {
    path: PathBuf,
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl ProfileStore {
    pub async fn load(path: PathBuf) -> Result<Self, String> {
        let profiles = if path.exists() {
            let data = tokio::fs::read_to_string(&path)
                .await
                .map_err(|err| format!("failed to read profiles: {}", err))?;
            if data.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&data)
                    .map_err(|err| format!("failed to parse profiles: {}", err))?
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            profiles: RwLock::new(profiles),
        })
    }

    pub async fn get(&self, user_id: &str) -> Option<UserProfile> {
        let guard = self.profiles.read().await;
        guard.get(user_id).cloned()
    }

    pub async fn contains(&self, user_id: &str) -> bool {
        let guard = self.profiles.read().await;
        guard.contains_key(user_id)
    }

    pub async fn upsert(&self, profile: UserProfile) -> Result<UserProfile, String> {
        let mut guard = self.profiles.write().await;
        guard.insert(profile.user_id.clone(), profile.clone());
        self.persist(&guard).await?;
        Ok(profile)
    }

    async fn persist(&self, profiles: &HashMap<String, UserProfile>) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent).await?;
        }
        let payload = serde_json::to_string_pretty(profiles)
            .map_err(|err| format!("failed to serialize profiles: {}", err))?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, payload)
            .await
            .map_err(|err| format!("failed to write profiles: {}", err))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|err| format!("failed to finalize profiles: {}", err))?;
        Ok(())
    }
}

pub(crate) async fn ensure_dir(path: &Path) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|err| format!("failed to create data dir: {}", err))
}
