use serde::{Deserialize, Serialize};

use pairmatch::{Analysis, CompatibilityScore, FanoutReport, MatchStatus, ScoreBreakdown};

#[derive(Debug, Deserialize)]
pub struct ApiPairRequest {
    pub user_a: String,
    pub user_b: String,
}

#[derive(Debug, Serialize)]
pub struct ApiScoreResponse {
    pub overall: u32,
    pub breakdown: ScoreBreakdown,
}

impl ApiScoreResponse {
    pub fn from_score(score: CompatibilityScore) -> Self {
        Self {
            overall: score.overall,
            breakdown: score.breakdown,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiAnalysisResponse {
    pub analysis_id: String,
    pub user_a: String,
    pub user_b: String,
    pub summary: String,
    pub green_flags: Vec<String>,
    pub yellow_flags: Vec<String>,
    pub red_flags: Vec<String>,
    pub raw_score: u32,
    pub overall_score: u32,
    pub generated_at: String,
}

impl ApiAnalysisResponse {
    pub fn from_analysis(analysis: Analysis) -> Self {
        Self {
            analysis_id: analysis.analysis_id,
            user_a: analysis.user_a,
            user_b: analysis.user_b,
            summary: analysis.summary,
            green_flags: analysis.green_flags,
            yellow_flags: analysis.yellow_flags,
            red_flags: analysis.red_flags,
            raw_score: analysis.raw_score,
            overall_score: analysis.overall_score,
            generated_at: analysis.generated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiFanoutRequest {
    pub user_id: String,
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiFanoutResponse {
    pub analyzed: usize,
    pub total: usize,
    pub request_id: String,
}

impl ApiFanoutResponse {
    pub fn from_report(report: FanoutReport, request_id: String) -> Self {
        Self {
            analyzed: report.analyzed,
            total: report.total,
            request_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiStatusResponse {
    pub is_analyzing: bool,
    pub has_any_analyses: bool,
}

impl ApiStatusResponse {
    pub fn from_status(status: MatchStatus) -> Self {
        Self {
            is_analyzing: status.is_analyzing,
            has_any_analyses: status.has_any_analyses,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiRegenerateRequest {
    pub user_id: String,
}
