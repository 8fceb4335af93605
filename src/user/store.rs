use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

use crate::user::profile::ensure_dir;
use crate::user::User;

/// Outcome of the regeneration cooldown gate.
#[derive(Debug, Clone)]
pub enum RegenGate {
    /// The cooldown window has passed; `last_profile_regenerated_at` was
    /// stamped to `now` in the same critical section.
    Allowed,
    Denied { remaining_secs: i64 },
    UnknownUser,
}

pub struct UserStore {
    path: PathBuf,
    users: RwLock<HashMap<String, User>>,
}

impl UserStore {
    pub async fn load(path: PathBuf) -> Result<Self, String> {
        let users = if path.exists() {
            let data = tokio::fs::read_to_string(&path)
                .await
                .map_err(|err| format!("failed to read users: {}", err))?;
            if data.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&data).map_err(|err| format!("failed to parse users: {}", err))?
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            users: RwLock::new(users),
        })
    }

    pub async fn list(&self) -> Vec<User> {
        let guard = self.users.read().await;
        guard.values().cloned().collect()
    }

    pub async fn get(&self, user_id: &str) -> Option<User> {
        let guard = self.users.read().await;
        guard.get(user_id).cloned()
    }

    pub async fn upsert(&self, user: User) -> Result<User, String> {
        let mut guard = self.users.write().await;
        guard.insert(user.user_id.clone(), user.clone());
        self.persist(&guard).await?;
        Ok(user)
    }

    /// Atomic check-and-set for the regeneration cooldown: the read of
    /// `last_profile_regenerated_at`, the comparison against `now`, and the
    /// new stamp all happen under one write lock, so two concurrent
    /// regeneration requests cannot both pass the gate.
    pub async fn gate_regeneration(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Result<RegenGate, String> {
        let mut guard = self.users.write().await;
        let Some(user) = guard.get_mut(user_id) else {
            return Ok(RegenGate::UnknownUser);
        };

        if let Some(last) = user.last_profile_regenerated_at {
            let elapsed = now - last;
            if elapsed < cooldown {
                let remaining_secs = (cooldown - elapsed).num_seconds().max(1);
                return Ok(RegenGate::Denied { remaining_secs });
            }
        }

        user.last_profile_regenerated_at = Some(now);
        self.persist(&guard).await?;
        Ok(RegenGate::Allowed)
    }

    async fn persist(&self, users: &HashMap<String, User>) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent).await?;
        }
        let payload = serde_json::to_string_pretty(users)
            .map_err(|err| format!("failed to serialize users: {}", err))?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, payload)
            .await
            .map_err(|err| format!("failed to write users: {}", err))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|err| format!("failed to finalize users: {}", err))?;
        Ok(())
    }
}
