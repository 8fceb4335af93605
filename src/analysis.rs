use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Semaphore};
use tokio::task::JoinSet;

use crate::config::MatchConfig;
use crate::eligibility::is_eligible_pair;
use crate::error::MatchError;
use crate::llm::{generate_with_retry, CategoryScores, NarrativeModel, NarrativeReport};
use crate::scoring::{score, CompatibilityScore};
use crate::store::{pair_key, AnalysisStore};
use crate::user::{ProfileStore, RegenGate, User, UserProfile, UserStore};

/// Narrative compatibility analysis for one unordered pair. Member ids are
/// stored in canonical order (lexicographically smaller first) and the record
/// is never updated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub analysis_id: String,
    pub user_a: String,
    pub user_b: String,
    pub pair_key: String,
    pub summary: String,
    pub green_flags: Vec<String>,
    pub yellow_flags: Vec<String>,
    pub red_flags: Vec<String>,
    pub category_scores: CategoryScores,
    /// Sum of the ten category scores, max 100.
    pub raw_score: u32,
    /// Raw score after the red-flag penalty.
    pub overall_score: u32,
    pub generated_at: DateTime<Utc>,
}

impl Analysis {
    pub fn from_report(
        u1: &str,
        u2: &str,
        report: NarrativeReport,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let (user_a, user_b) = if u1 <= u2 { (u1, u2) } else { (u2, u1) };
        let key = pair_key(user_a, user_b);
        let raw_score = report.category_scores.total();
        let overall_score = apply_red_flag_penalty(raw_score, report.red_flags.len());
        Self {
            analysis_id: format!("cmp_{:x}", stable_hash64(&key)),
            user_a: user_a.to_string(),
            user_b: user_b.to_string(),
            pair_key: key,
            summary: report.summary,
            green_flags: report.green_flags,
            yellow_flags: report.yellow_flags,
            red_flags: report.red_flags,
            category_scores: report.category_scores,
            raw_score,
            overall_score,
            generated_at,
        }
    }

    pub fn counterpart(&self, user_id: &str) -> &str {
        if self.user_a == user_id {
            &self.user_b
        } else {
            &self.user_a
        }
    }
}

/// Multiplicative red-flag penalty: the first flag costs x0.6, each further
/// flag x0.75. Deliberately path-dependent; do not linearize.
pub fn apply_red_flag_penalty(raw_score: u32, red_flag_count: usize) -> u32 {
    if red_flag_count == 0 {
        return raw_score;
    }
    let penalty = 0.6 * 0.75f64.powi(red_flag_count as i32 - 1);
    (raw_score as f64 * penalty).round() as u32
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanoutReport {
    pub analyzed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FanoutEvent {
    pub event: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchStatus {
    pub is_analyzing: bool,
    pub has_any_analyses: bool,
}

/// Read-path population restriction; policy supplied by the caller, never
/// hard-coded into the orchestrator.
pub type SegmentFilter = dyn Fn(&User) -> bool + Send + Sync;

#[derive(Clone)]
pub struct MatchEngine {
    config: Arc<MatchConfig>,
    users: Arc<UserStore>,
    profiles: Arc<ProfileStore>,
    analyses: Arc<AnalysisStore>,
    model: Option<Arc<dyn NarrativeModel>>,
}

impl MatchEngine {
    pub fn new(
        config: MatchConfig,
        users: Arc<UserStore>,
        profiles: Arc<ProfileStore>,
        analyses: Arc<AnalysisStore>,
        model: Option<Arc<dyn NarrativeModel>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            users,
            profiles,
            analyses,
            model,
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    /// Synchronous deterministic score for two users' profiles.
    pub async fn score_pair(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> Result<CompatibilityScore, MatchError> {
        let profile_a = self
            .profiles
            .get(user_a)
            .await
            .ok_or_else(|| MatchError::MissingProfile(user_a.to_string()))?;
        let profile_b = self
            .profiles
            .get(user_b)
            .await
            .ok_or_else(|| MatchError::MissingProfile(user_b.to_string()))?;
        Ok(score(&profile_a, &profile_b, &self.config.weights))
    }

    /// Narrative analysis for one pair. Idempotent: an existing analysis for
    /// the unordered pair is returned unchanged without calling the model.
    pub async fn analyze(&self, user_a: &str, user_b: &str) -> Result<Analysis, MatchError> {
        if let Some(existing) = self.analyses.get_by_pair(user_a, user_b).await {
            return Ok(existing);
        }

        let (first, first_profile) = self.fetch_pair_member(user_a).await?;
        let (second, second_profile) = self.fetch_pair_member(user_b).await?;

        let model = self.model.as_ref().ok_or(MatchError::ModelUnavailable)?;
        let comparison = build_comparison(&first, &first_profile, &second, &second_profile);
        let report = generate_with_retry(
            model.as_ref(),
            &comparison,
            self.config.llm.max_retries,
            Duration::from_millis(self.config.llm.retry_base_ms),
        )
        .await?;

        let analysis = Analysis::from_report(user_a, user_b, report, Utc::now());
        // A concurrent writer may have won the race; keep its record.
        let (stored, created) = self
            .analyses
            .insert_if_absent(analysis)
            .await
            .map_err(MatchError::Store)?;
        if !created {
            tracing::debug!(pair = %stored.pair_key, "discarded duplicate analysis");
        }
        Ok(stored)
    }

    /// Runs one narrative analysis per eligible candidate for `user_id`,
    /// bounded by the configured concurrency limit. Per-pair failures are
    /// logged and excluded from the success count; the batch never aborts.
    pub async fn analyze_all_for_user(
        &self,
        user_id: &str,
        segment: Option<Arc<SegmentFilter>>,
        progress: Option<broadcast::Sender<FanoutEvent>>,
    ) -> Result<FanoutReport, MatchError> {
        let me = self
            .users
            .get(user_id)
            .await
            .ok_or_else(|| MatchError::MissingUser(user_id.to_string()))?;
        let today = Utc::now().date_naive();

        let mut candidates = Vec::new();
        for candidate in self.users.list().await {
            if candidate.user_id == me.user_id {
                continue;
            }
            if let Some(filter) = segment.as_ref() {
                if !filter(&candidate) {
                    continue;
                }
            }
            if !is_eligible_pair(&me, &candidate, today) {
                continue;
            }
            if !self.profiles.contains(&candidate.user_id).await {
                continue;
            }
            candidates.push(candidate.user_id);
        }

        let total = candidates.len();
        emit(&progress, "start", &format!("analyzing {} candidates", total));

        let semaphore = Arc::new(Semaphore::new(self.config.fanout.max_concurrent_analyses));
        let mut tasks = JoinSet::new();
        for candidate_id in candidates {
            let engine = self.clone();
            let semaphore = semaphore.clone();
            let progress = progress.clone();
            let me_id = user_id.to_string();
            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return false,
                };
                match engine.analyze(&me_id, &candidate_id).await {
                    Ok(analysis) => {
                        tracing::debug!(
                            pair = %analysis.pair_key,
                            score = analysis.overall_score,
                            "analysis complete"
                        );
                        emit(&progress, "analyzed", &candidate_id);
                        true
                    }
                    Err(err) => {
                        tracing::warn!(candidate = %candidate_id, error = %err, "analysis failed");
                        emit(&progress, "failed", &candidate_id);
                        false
                    }
                }
            });
        }

        let mut analyzed = 0usize;
        while let Some(result) = tasks.join_next().await {
            if matches!(result, Ok(true)) {
                analyzed += 1;
            }
        }

        emit(
            &progress,
            "done",
            &format!("{} of {} analyzed", analyzed, total),
        );
        Ok(FanoutReport { analyzed, total })
    }

    /// Stored analyses for the user, re-filtered through the eligibility
    /// predicate at read time so stale pairs are suppressed rather than
    /// deleted, sorted by overall score descending.
    pub async fn matches_for_user(&self, user_id: &str) -> Result<Vec<Analysis>, MatchError> {
        let me = self
            .users
            .get(user_id)
            .await
            .ok_or_else(|| MatchError::MissingUser(user_id.to_string()))?;
        let today = Utc::now().date_naive();

        let mut matches = Vec::new();
        for analysis in self.analyses.list_for_user(user_id).await {
            let counterpart = analysis.counterpart(user_id).to_string();
            let Some(them) = self.users.get(&counterpart).await else {
                continue;
            };
            if is_eligible_pair(&me, &them, today) {
                matches.push(analysis);
            }
        }
        matches.sort_by(|a, b| b.overall_score.cmp(&a.overall_score));
        Ok(matches)
    }

    /// Match-generation status for a user: "analyzing" only when the audit is
    /// complete, a profile exists, nothing has been stored yet, and at least
    /// one eligible candidate exists.
    pub async fn generation_status(&self, user_id: &str) -> Result<MatchStatus, MatchError> {
        let me = self
            .users
            .get(user_id)
            .await
            .ok_or_else(|| MatchError::MissingUser(user_id.to_string()))?;
        let audit_done = me.profile_audit_completed_at.is_some();
        let has_profile = self.profiles.contains(user_id).await;
        let analyses = self.analyses.list_for_user(user_id).await;
        let has_any_analyses = !analyses.is_empty();

        let mut has_candidate = false;
        if audit_done && has_profile && !has_any_analyses {
            let today = Utc::now().date_naive();
            for candidate in self.users.list().await {
                if candidate.user_id == me.user_id {
                    continue;
                }
                if is_eligible_pair(&me, &candidate, today)
                    && self.profiles.contains(&candidate.user_id).await
                {
                    has_candidate = true;
                    break;
                }
            }
        }

        Ok(MatchStatus {
            is_analyzing: audit_done && has_profile && !has_any_analyses && has_candidate,
            has_any_analyses,
        })
    }

    /// Regeneration cooldown gate. On success the user's
    /// `last_profile_regenerated_at` is already stamped to `now`; the caller
    /// may proceed to re-run extraction.
    pub async fn try_begin_regeneration(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), MatchError> {
        let cooldown = ChronoDuration::hours(self.config.regeneration.cooldown_hours);
        match self
            .users
            .gate_regeneration(user_id, now, cooldown)
            .await
            .map_err(MatchError::Store)?
        {
            RegenGate::Allowed => Ok(()),
            RegenGate::Denied { remaining_secs } => Err(MatchError::Cooldown { remaining_secs }),
            RegenGate::UnknownUser => Err(MatchError::MissingUser(user_id.to_string())),
        }
    }

    async fn fetch_pair_member(&self, user_id: &str) -> Result<(User, UserProfile), MatchError> {
        let user = self
            .users
            .get(user_id)
            .await
            .ok_or_else(|| MatchError::MissingUser(user_id.to_string()))?;
        let profile = self
            .profiles
            .get(user_id)
            .await
            .ok_or_else(|| MatchError::MissingProfile(user_id.to_string()))?;
        Ok((user, profile))
    }
}

fn emit(progress: &Option<broadcast::Sender<FanoutEvent>>, event: &str, message: &str) {
    if let Some(sender) = progress {
        let _ = sender.send(FanoutEvent {
            event: event.to_string(),
            message: message.to_string(),
        });
    }
}

/// Plain-text comparison of two profiles handed to the narrative model. The
/// exact wording is not contractual; the model only needs both sides'
/// structured attributes spelled out.
pub fn build_comparison(
    user_a: &User,
    profile_a: &UserProfile,
    user_b: &User,
    profile_b: &UserProfile,
) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Compare these two dating profiles.\n");
    append_profile(&mut text, "Person A", user_a, profile_a);
    let _ = writeln!(text);
    append_profile(&mut text, "Person B", user_b, profile_b);
    text
}

fn append_profile(text: &mut String, label: &str, user: &User, profile: &UserProfile) {
    let _ = writeln!(text, "{} ({})", label, user.display_name);
    if let Some(age) = user.age_on(Utc::now().date_naive()) {
        let _ = writeln!(text, "Age: {}", age);
    }
    let _ = writeln!(text, "Values: {}", profile.values.join(", "));
    let _ = writeln!(text, "Interests: {}", profile.interests.join(", "));
    let _ = writeln!(text, "Dealbreakers: {}", profile.dealbreakers.join(", "));
    let _ = writeln!(
        text,
        "Wants kids: {} (family closeness {}/10)",
        profile.family_plans.wants_kids, profile.family_plans.family_closeness
    );
    let style = &profile.relationship_style;
    let _ = writeln!(
        text,
        "Relationship style: love language {}, communicates {}, conflict {}, finances {}, alone time {}/10",
        style.love_language,
        style.communication_frequency,
        style.conflict_style,
        style.financial_approach,
        style.alone_time_need
    );
    let lifestyle = &profile.lifestyle;
    let _ = writeln!(
        text,
        "Lifestyle: sleep {}, exercise {}, alcohol {}, drugs {}, location {}, pets {}",
        lifestyle.sleep_schedule,
        lifestyle.exercise,
        lifestyle.alcohol,
        lifestyle.drugs,
        lifestyle.location,
        lifestyle.pets
    );
    let traits = profile.traits.as_array();
    let _ = writeln!(text, "Trait vector (1-10): {:?}", traits);
    if let Some(social) = profile.social_profile.as_ref() {
        let _ = writeln!(
            text,
            "Social: {} | goes out {}/10 | friend approval {}/10",
            social.social_style, social.go_out_frequency, social.friend_approval_importance
        );
    }
    if let Some(intimacy) = profile.intimacy_profile.as_ref() {
        let _ = writeln!(
            text,
            "Intimacy: importance {}/10, attraction importance {}/10, PDA {}",
            intimacy.physical_intimacy_importance,
            intimacy.physical_attraction_importance,
            intimacy.pda_comfort
        );
    }
    if let Some(philosophy) = profile.love_philosophy.as_ref() {
        let _ = writeln!(
            text,
            "Love philosophy: soulmates {}, gestures {}, recognizes love by {}",
            philosophy.believes_in_soulmates,
            philosophy.romantic_gestures.join(", "),
            philosophy.love_recognition_signs.join(", ")
        );
    }
    if let Some(preferences) = profile.partner_preferences.as_ref() {
        let _ = writeln!(text, "Must-haves: {}", preferences.must_haves.join(", "));
    }
}

fn stable_hash64(value: &str) -> u64 {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}
