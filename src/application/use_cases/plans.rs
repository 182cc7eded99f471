use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::subscription_window::SubscriptionWindow,
};

// ============================================================================
// Profiles
// ============================================================================

/// Catalogue entry. Prices are whole naira.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanProfile {
    pub id: Uuid,
    pub title: String,
    pub price: i64,
    pub duration_in_days: Option<i32>,
    pub features: Vec<String>,
    pub button_text: Option<String>,
    pub discount: i32,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPlanProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub payment_id: Option<Uuid>,
    pub start_date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct UpsertUserPlan {
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub payment_id: Option<Uuid>,
    pub window: SubscriptionWindow,
}

// ============================================================================
// Repository Traits
// ============================================================================

#[async_trait]
pub trait PlanRepo: Send + Sync {
    async fn list(&self) -> AppResult<Vec<PlanProfile>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<PlanProfile>>;
    async fn find_by_title(&self, title: &str) -> AppResult<Option<PlanProfile>>;
}

/// One row per user; `upsert` replaces any previous assignment in place.
#[async_trait]
pub trait UserPlanRepo: Send + Sync {
    async fn upsert(&self, input: UpsertUserPlan) -> AppResult<UserPlanProfile>;
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<UserPlanProfile>>;
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct PlanUseCases {
    plans: Arc<dyn PlanRepo>,
}

impl PlanUseCases {
    pub fn new(plans: Arc<dyn PlanRepo>) -> Self {
        Self { plans }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> AppResult<Vec<PlanProfile>> {
        self.plans.list().await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> AppResult<PlanProfile> {
        self.plans
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Plan not found".into()))
    }
}
