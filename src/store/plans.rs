//! One-shot seeding of subscription-plan documents.
//!
//! Plans are written as JSON documents under the data directory, one
//! file per plan id within a named collection. Re-running a seed
//! overwrites the same ids in place. The serving path does not read
//! these documents back.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::models::plan::{seed_plans, PlanConfig};

pub const PLAN_CONFIGS: &str = "plan_configs";
pub const SUBSCRIPTION_PLANS: &str = "subscription_plans";

pub struct PlanStore {
    root: PathBuf,
}

impl PlanStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Write every seed plan into `collection`, overwriting existing
    /// documents. Returns the plan ids written, in seed order.
    pub async fn seed_collection(&self, collection: &str) -> Result<Vec<String>> {
        let dir = self.root.join(collection);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create {}", dir.display()))?;

        let mut written = Vec::new();
        for plan in seed_plans() {
            let path = dir.join(format!("{}.json", plan.plan_id));
            let body = serde_json::to_vec_pretty(&plan)
                .with_context(|| format!("failed to serialize plan {}", plan.plan_id))?;
            tokio::fs::write(&path, body)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(collection, plan = %plan.plan_id, "seeded plan document");
            written.push(plan.plan_id);
        }
        Ok(written)
    }

    /// Seed both collections.
    pub async fn seed_all(&self) -> Result<()> {
        self.seed_collection(PLAN_CONFIGS).await?;
        self.seed_collection(SUBSCRIPTION_PLANS).await?;
        Ok(())
    }

    /// Read one seeded document back. Returns `None` when the document
    /// does not exist.
    #[allow(dead_code)]
    pub async fn read(&self, collection: &str, id: &str) -> Result<Option<PlanConfig>> {
        let path = self.root.join(collection).join(format!("{id}.json"));
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        let plan = serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Some(plan))
    }
}
