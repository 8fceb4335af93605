use serde::{Deserialize, Serialize};

/// Fixed weights of the ten compatibility factors. The defaults sum to
/// exactly 1.0, which is asserted in tests; re-weighting is a single-point
/// change here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorWeights {
    pub values: f64,
    pub lifestyle: f64,
    pub relationship_style: f64,
    pub family_plans: f64,
    pub interests: f64,
    pub personality: f64,
    pub social: f64,
    pub intimacy: f64,
    pub love_philosophy: f64,
    pub partner_preferences: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            values: 0.15,
            lifestyle: 0.12,
            relationship_style: 0.12,
            family_plans: 0.15,
            interests: 0.08,
            personality: 0.12,
            social: 0.08,
            intimacy: 0.08,
            love_philosophy: 0.05,
            partner_preferences: 0.05,
        }
    }
}

impl FactorWeights {
    pub fn sum(&self) -> f64 {
        self.values
            + self.lifestyle
            + self.relationship_style
            + self.family_plans
            + self.interests
            + self.personality
            + self.social
            + self.intimacy
            + self.love_philosophy
            + self.partner_preferences
    }
}
