use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pairmatch::llm::generate_with_retry;
use pairmatch::user::{
    FamilyPlans, Lifestyle, ProfileStore, RelationshipStyle, Traits, UserProfile,
};
use pairmatch::{
    Analysis, AnalysisStore, CategoryScores, LlmError, MatchConfig, MatchEngine, MatchError,
    NarrativeModel, NarrativeReport, User, UserStore,
};

fn report_with_red_flags(red: usize) -> NarrativeReport {
    NarrativeReport {
        summary: "A thoughtful, steady pairing with shared long-term goals.".to_string(),
        green_flags: vec!["shared values".to_string(), "aligned family plans".to_string()],
        yellow_flags: vec!["different sleep schedules".to_string()],
        red_flags: (0..red).map(|idx| format!("concern {}", idx + 1)).collect(),
        category_scores: CategoryScores {
            core_values: 8,
            lifestyle_alignment: 8,
            relationship_goals: 8,
            communication_style: 8,
            emotional_compatibility: 8,
            family_planning: 8,
            social_lifestyle: 8,
            conflict_resolution: 8,
            intimacy_alignment: 8,
            growth_mindset: 8,
        },
    }
}

struct MockModel {
    calls: AtomicUsize,
    fail_when_contains: Option<String>,
    transient_failures_left: AtomicU32,
    red_flags: usize,
}

impl MockModel {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_when_contains: None,
            transient_failures_left: AtomicU32::new(0),
            red_flags: 0,
        }
    }

    fn failing_for(marker: &str) -> Self {
        Self {
            fail_when_contains: Some(marker.to_string()),
            ..Self::new()
        }
    }

    fn flaky(transient_failures: u32) -> Self {
        Self {
            transient_failures_left: AtomicU32::new(transient_failures),
            ..Self::new()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NarrativeModel for MockModel {
    async fn generate(&self, comparison: &str) -> Result<NarrativeReport, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(marker) = self.fail_when_contains.as_ref() {
            if comparison.contains(marker) {
                return Err(LlmError::Fatal("rejected by test model".to_string()));
            }
        }
        let left = self.transient_failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.transient_failures_left.fetch_sub(1, Ordering::SeqCst);
            return Err(LlmError::Transient("simulated 503".to_string()));
        }
        Ok(report_with_red_flags(self.red_flags))
    }
}

fn minimal_profile(user_id: &str) -> UserProfile {
    UserProfile {
        user_id: user_id.to_string(),
        values: vec!["honesty".to_string()],
        interests: vec!["hiking".to_string()],
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
            family_closeness: 6,
        },
        lifestyle: Lifestyle::default(),
        social_profile: None,
        intimacy_profile: None,
        love_philosophy: None,
        partner_preferences: None,
    }
}

async fn engine_with_model(model: Arc<MockModel>) -> (MatchEngine, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let users = Arc::new(
        UserStore::load(dir.path().join("users.json"))
            .await
            .expect("user store"),
    );
    let profiles = Arc::new(
        ProfileStore::load(dir.path().join("profiles.json"))
            .await
            .expect("profile store"),
    );
    let analyses = Arc::new(
        AnalysisStore::load(dir.path().join("analyses.json"))
            .await
            .expect("analysis store"),
    );
    let engine = MatchEngine::new(
        MatchConfig::default(),
        users,
        profiles,
        analyses,
        Some(model as Arc<dyn NarrativeModel>),
    );
    (engine, dir)
}

async fn add_member(engine: &MatchEngine, user_id: &str, display_name: &str) {
    let mut user = User::new(user_id, display_name);
    user.profile_audit_completed_at = Some(Utc::now());
    engine.users().upsert(user).await.expect("upsert user");
    engine
        .profiles()
        .upsert(minimal_profile(user_id))
        .await
        .expect("upsert profile");
}

#[tokio::test]
async fn analyze_is_idempotent_per_unordered_pair() {
    let model = Arc::new(MockModel::new());
    let (engine, _dir) = engine_with_model(model.clone()).await;
    add_member(&engine, "alice", "Alice").await;
    add_member(&engine, "bob", "Bob").await;

    let first = engine.analyze("alice", "bob").await.expect("first analyze");
    let second = engine.analyze("bob", "alice").await.expect("reversed analyze");

    assert_eq!(first.analysis_id, second.analysis_id);
    assert_eq!(first.pair_key, "alice|bob");
    assert_eq!(model.call_count(), 1);
}

#[tokio::test]
async fn analyze_requires_both_profiles() {
    let model = Arc::new(MockModel::new());
    let (engine, _dir) = engine_with_model(model).await;
    add_member(&engine, "alice", "Alice").await;
    let bare = User::new("ghost", "Ghost");
    engine.users().upsert(bare).await.expect("upsert user");

    let err = engine.analyze("alice", "ghost").await.unwrap_err();
    assert!(matches!(err, MatchError::MissingProfile(ref id) if id == "ghost"));

    let err = engine.analyze("alice", "nobody").await.unwrap_err();
    assert!(matches!(err, MatchError::MissingUser(_)));
}

#[test]
fn red_flag_penalty_matches_the_model() {
    use pairmatch::analysis::apply_red_flag_penalty;

    assert_eq!(apply_red_flag_penalty(80, 0), 80);
    assert_eq!(apply_red_flag_penalty(80, 1), 48);
    assert_eq!(apply_red_flag_penalty(80, 2), 36);

    let mut previous = u32::MAX;
    for flags in 0..6 {
        let adjusted = apply_red_flag_penalty(80, flags);
        assert!(adjusted <= previous);
        previous = adjusted;
    }
}

#[tokio::test]
async fn analysis_applies_red_flag_penalty_to_stored_score() {
    let model = Arc::new(MockModel {
        red_flags: 1,
        ..MockModel::new()
    });
    let (engine, _dir) = engine_with_model(model).await;
    add_member(&engine, "alice", "Alice").await;
    add_member(&engine, "bob", "Bob").await;

    let analysis = engine.analyze("alice", "bob").await.expect("analyze");
    assert_eq!(analysis.raw_score, 80);
    assert_eq!(analysis.overall_score, 48);
}

#[tokio::test]
async fn fanout_tolerates_per_pair_failures() {
    let model = Arc::new(MockModel::failing_for("Apollo"));
    let (engine, _dir) = engine_with_model(model).await;
    add_member(&engine, "me", "Morgan").await;
    add_member(&engine, "c1", "Quinn").await;
    add_member(&engine, "c2", "Riley").await;
    add_member(&engine, "c3", "Apollo").await;
    add_member(&engine, "c4", "Jordan").await;
    add_member(&engine, "c5", "Casey").await;

    let report = engine
        .analyze_all_for_user("me", None, None)
        .await
        .expect("fanout");
    assert_eq!(report.total, 5);
    assert_eq!(report.analyzed, 4);

    let stored = engine.matches_for_user("me").await.expect("matches");
    assert_eq!(stored.len(), 4);
    assert!(stored.iter().all(|analysis| analysis.counterpart("me") != "c3"));
}

#[tokio::test]
async fn retried_fanout_skips_completed_pairs() {
    let model = Arc::new(MockModel::new());
    let (engine, _dir) = engine_with_model(model.clone()).await;
    add_member(&engine, "me", "Morgan").await;
    add_member(&engine, "c1", "Quinn").await;
    add_member(&engine, "c2", "Riley").await;

    let first = engine.analyze_all_for_user("me", None, None).await.expect("fanout");
    assert_eq!(first.analyzed, 2);
    let calls_after_first = model.call_count();

    let second = engine.analyze_all_for_user("me", None, None).await.expect("fanout");
    assert_eq!(second.analyzed, 2);
    // Existing analyses are idempotent hits; the model is not consulted again.
    assert_eq!(model.call_count(), calls_after_first);
}

#[tokio::test]
async fn segment_filter_narrows_the_candidate_set() {
    let model = Arc::new(MockModel::new());
    let (engine, _dir) = engine_with_model(model).await;
    add_member(&engine, "me", "Morgan").await;
    add_member(&engine, "c1", "Quinn").await;
    add_member(&engine, "c2", "Riley").await;

    let only_c2: Arc<pairmatch::analysis::SegmentFilter> =
        Arc::new(|user: &User| user.user_id == "c2");
    let report = engine
        .analyze_all_for_user("me", Some(only_c2), None)
        .await
        .expect("fanout");
    assert_eq!(report.total, 1);
    assert_eq!(report.analyzed, 1);
}

#[tokio::test]
async fn transient_failures_are_retried_with_backoff() {
    let flaky = MockModel::flaky(2);
    let report = generate_with_retry(&flaky, "comparison", 3, Duration::from_millis(1))
        .await
        .expect("eventual success");
    assert_eq!(report.category_scores.total(), 80);
    assert_eq!(flaky.call_count(), 3);
}

#[tokio::test]
async fn fatal_failures_are_not_retried() {
    let fatal = MockModel::failing_for("comparison");
    let err = generate_with_retry(&fatal, "comparison", 3, Duration::from_millis(1))
        .await
        .unwrap_err();
    assert!(!err.is_transient());
    assert_eq!(fatal.call_count(), 1);
}

#[tokio::test]
async fn exhausted_retries_surface_the_transient_error() {
    let flaky = MockModel::flaky(10);
    let err = generate_with_retry(&flaky, "comparison", 2, Duration::from_millis(1))
        .await
        .unwrap_err();
    assert!(err.is_transient());
    assert_eq!(flaky.call_count(), 3);
}

#[tokio::test]
async fn store_keeps_one_record_per_pair_under_racing_writers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = AnalysisStore::load(dir.path().join("analyses.json"))
        .await
        .expect("store");

    let first = Analysis::from_report("alice", "bob", report_with_red_flags(0), Utc::now());
    let second = Analysis::from_report("bob", "alice", report_with_red_flags(2), Utc::now());

    let (winner, created) = store.insert_if_absent(first).await.expect("insert");
    assert!(created);
    let (kept, created) = store.insert_if_absent(second).await.expect("insert");
    assert!(!created);
    assert_eq!(kept.analysis_id, winner.analysis_id);
    assert_eq!(kept.overall_score, winner.overall_score);
    assert_eq!(store.list_for_user("alice").await.len(), 1);
}

#[tokio::test]
async fn generation_status_tracks_the_pipeline() {
    let model = Arc::new(MockModel::new());
    let (engine, _dir) = engine_with_model(model).await;
    add_member(&engine, "me", "Morgan").await;
    add_member(&engine, "c1", "Quinn").await;

    let before = engine.generation_status("me").await.expect("status");
    assert!(before.is_analyzing);
    assert!(!before.has_any_analyses);

    engine.analyze_all_for_user("me", None, None).await.expect("fanout");

    let after = engine.generation_status("me").await.expect("status");
    assert!(!after.is_analyzing);
    assert!(after.has_any_analyses);
}

#[tokio::test]
async fn read_path_refilters_stale_matches() {
    let model = Arc::new(MockModel::new());
    let (engine, _dir) = engine_with_model(model).await;
    add_member(&engine, "me", "Morgan").await;
    add_member(&engine, "them", "Quinn").await;

    engine.analyze("me", "them").await.expect("analyze");
    assert_eq!(engine.matches_for_user("me").await.expect("matches").len(), 1);

    // The viewer later tightens their age dealbreaker; the stored analysis
    // is suppressed, not deleted.
    let mut me = engine.users().get("me").await.expect("me");
    me.age_range_dealbreaker = true;
    me.age_range_min = Some(25);
    me.age_range_max = Some(30);
    engine.users().upsert(me).await.expect("upsert");

    let mut them = engine.users().get("them").await.expect("them");
    them.birthdate = NaiveDate::from_ymd_opt(1960, 1, 1);
    engine.users().upsert(them).await.expect("upsert");

    assert!(engine.matches_for_user("me").await.expect("matches").is_empty());

    // The record itself was never deleted; analyze still finds it.
    let kept = engine.analyze("me", "them").await.expect("record retained");
    assert_eq!(kept.pair_key, "me|them");
}

#[tokio::test]
async fn regeneration_cooldown_gates_repeat_requests() {
    let model = Arc::new(MockModel::new());
    let (engine, _dir) = engine_with_model(model).await;
    add_member(&engine, "me", "Morgan").await;

    let now = Utc::now();
    engine
        .try_begin_regeneration("me", now)
        .await
        .expect("first regeneration");

    let err = engine.try_begin_regeneration("me", now).await.unwrap_err();
    match err {
        MatchError::Cooldown { remaining_secs } => assert!(remaining_secs > 0),
        other => panic!("expected cooldown, got {}", other),
    }

    // After the window, the gate opens again.
    let later = now + ChronoDuration::hours(25);
    engine
        .try_begin_regeneration("me", later)
        .await
        .expect("post-cooldown regeneration");

    let err = engine.try_begin_regeneration("missing", now).await.unwrap_err();
    assert!(matches!(err, MatchError::MissingUser(_)));
}
