use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

use crate::analysis::Analysis;
use crate::user::profile::ensure_dir;

/// Canonical order-independent key for an unordered pair of users:
/// identities sorted lexicographically, joined with `|`.
pub fn pair_key(u1: &str, u2: &str) -> String {
    if u1 <= u2 {
        format!("{}|{}", u1, u2)
    } else {
        format!("{}|{}", u2, u1)
    }
}

/// Append-only pairwise analysis store: exactly zero or one `Analysis` per
/// unordered pair. The map is keyed by the canonical pair key and all writes
/// go through `insert_if_absent` under a single lock, so two concurrent
/// fan-outs racing on the same pair cannot both insert.
pub struct AnalysisStore {
    path: PathBuf,
    analyses: Mutex<HashMap<String, Analysis>>,
}

impl AnalysisStore {
    pub async fn load(path: PathBuf) -> Result<Self, String> {
        let analyses = if path.exists() {
            let data = tokio::fs::read_to_string(&path)
                .await
                .map_err(|err| format!("failed to read analyses: {}", err))?;
            if data.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&data)
                    .map_err(|err| format!("failed to parse analyses: {}", err))?
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            analyses: Mutex::new(analyses),
        })
    }

    pub async fn get_by_pair(&self, u1: &str, u2: &str) -> Option<Analysis> {
        let guard = self.analyses.lock().await;
        guard.get(&pair_key(u1, u2)).cloned()
    }

    /// Atomic insert-if-absent on the canonical pair key. Returns the stored
    /// record plus whether this call created it; a losing concurrent writer
    /// gets the winner's record back instead of an error.
    pub async fn insert_if_absent(&self, analysis: Analysis) -> Result<(Analysis, bool), String> {
        let mut guard = self.analyses.lock().await;
        if let Some(existing) = guard.get(&analysis.pair_key) {
            return Ok((existing.clone(), false));
        }
        guard.insert(analysis.pair_key.clone(), analysis.clone());
        self.persist(&guard).await?;
        Ok((analysis, true))
    }

    /// All analyses involving the user, in either pair role.
    pub async fn list_for_user(&self, user_id: &str) -> Vec<Analysis> {
        let guard = self.analyses.lock().await;
        guard
            .values()
            .filter(|analysis| analysis.user_a == user_id || analysis.user_b == user_id)
            .cloned()
            .collect()
    }

    async fn persist(&self, analyses: &HashMap<String, Analysis>) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent).await?;
        }
        let payload = serde_json::to_string_pretty(analyses)
            .map_err(|err| format!("failed to serialize analyses: {}", err))?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, payload)
            .await
            .map_err(|err| format!("failed to write analyses: {}", err))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|err| format!("failed to finalize analyses: {}", err))?;
        Ok(())
    }
}
