//! In-memory mocks for the plan and payment storage traits, plus a scripted
//! payment gateway.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::payment_gateway::{ChargeRequest, PaymentGateway},
        use_cases::{
            payment::{GatewayUpdate, NewPayment, PaymentProfile, PaymentRepo},
            plans::{PlanProfile, PlanRepo, UpsertUserPlan, UserPlanProfile, UserPlanRepo},
        },
    },
    domain::entities::payment_status::PaymentStatus,
};

// ============================================================================
// InMemoryPlanRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryPlanRepo {
    pub plans: Mutex<HashMap<Uuid, PlanProfile>>,
}

impl InMemoryPlanRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plans(plans: Vec<PlanProfile>) -> Self {
        Self {
            plans: Mutex::new(plans.into_iter().map(|p| (p.id, p)).collect()),
        }
    }
}

#[async_trait]
impl PlanRepo for InMemoryPlanRepo {
    async fn list(&self) -> AppResult<Vec<PlanProfile>> {
        let mut plans: Vec<PlanProfile> = self.plans.lock().unwrap().values().cloned().collect();
        plans.sort_by_key(|p| p.price);
        Ok(plans)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<PlanProfile>> {
        Ok(self.plans.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_title(&self, title: &str) -> AppResult<Option<PlanProfile>> {
        Ok(self
            .plans
            .lock()
            .unwrap()
            .values()
            .find(|p| p.title == title)
            .cloned())
    }
}

// ============================================================================
// InMemoryUserPlanRepo
// ============================================================================

/// Keyed by user id: one row per user, like the unique index on `user_plans`.
/// Set `fail_writes` to make `upsert` a database error.
#[derive(Default)]
pub struct InMemoryUserPlanRepo {
    pub user_plans: Mutex<HashMap<Uuid, UserPlanProfile>>,
    pub fail_writes: AtomicBool,
}

impl InMemoryUserPlanRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: Uuid) -> Option<UserPlanProfile> {
        self.user_plans.lock().unwrap().get(&user_id).cloned()
    }

    pub fn count(&self) -> usize {
        self.user_plans.lock().unwrap().len()
    }
}

#[async_trait]
impl UserPlanRepo for InMemoryUserPlanRepo {
    async fn upsert(&self, input: UpsertUserPlan) -> AppResult<UserPlanProfile> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database("Database operation failed".into()));
        }
        let mut user_plans = self.user_plans.lock().unwrap();
        let id = user_plans
            .get(&input.user_id)
            .map(|existing| existing.id)
            .unwrap_or_else(Uuid::new_v4);
        let row = UserPlanProfile {
            id,
            user_id: input.user_id,
            plan_id: input.plan_id,
            payment_id: input.payment_id,
            start_date: input.window.start_date,
            end_date: input.window.end_date,
        };
        user_plans.insert(input.user_id, row.clone());
        Ok(row)
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<UserPlanProfile>> {
        Ok(self.get(user_id))
    }
}

// ============================================================================
// InMemoryPaymentRepo
// ============================================================================

/// Keyed by `tx_ref`. Set `fail_writes` to make every write a database error.
#[derive(Default)]
pub struct InMemoryPaymentRepo {
    pub payments: Mutex<HashMap<String, PaymentProfile>>,
    pub fail_writes: AtomicBool,
}

impl InMemoryPaymentRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, payment: PaymentProfile) {
        self.payments
            .lock()
            .unwrap()
            .insert(payment.tx_ref.clone(), payment);
    }

    pub fn get(&self, tx_ref: &str) -> Option<PaymentProfile> {
        self.payments.lock().unwrap().get(tx_ref).cloned()
    }

    pub fn count(&self) -> usize {
        self.payments.lock().unwrap().len()
    }

    fn check_writable(&self) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database("Database operation failed".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentRepo for InMemoryPaymentRepo {
    async fn create(&self, input: NewPayment) -> AppResult<PaymentProfile> {
        self.check_writable()?;
        let mut payments = self.payments.lock().unwrap();
        if payments.contains_key(&input.tx_ref) {
            return Err(AppError::Conflict(
                "A record with this value already exists".into(),
            ));
        }
        let now = Utc::now().naive_utc();
        let payment = PaymentProfile {
            id: Uuid::new_v4(),
            tx_ref: input.tx_ref,
            amount: input.amount,
            email: input.email,
            plan_id: input.plan_id,
            user_id: input.user_id,
            status: PaymentStatus::Pending,
            gateway_transaction_id: None,
            gateway_reference: None,
            gateway_data: None,
            created_at: Some(now),
            updated_at: Some(now),
        };
        payments.insert(payment.tx_ref.clone(), payment.clone());
        Ok(payment)
    }

    async fn find_by_tx_ref(&self, tx_ref: &str) -> AppResult<Option<PaymentProfile>> {
        Ok(self.get(tx_ref))
    }

    async fn apply_gateway_update(
        &self,
        payment_id: Uuid,
        update: GatewayUpdate,
    ) -> AppResult<bool> {
        self.check_writable()?;
        let mut payments = self.payments.lock().unwrap();
        let Some(payment) = payments
            .values_mut()
            .find(|p| p.id == payment_id && p.status == PaymentStatus::Pending)
        else {
            return Ok(false);
        };
        payment.status = update.status;
        payment.gateway_transaction_id = update.transaction_id;
        payment.gateway_reference = update.reference;
        payment.gateway_data = Some(update.data);
        payment.updated_at = Some(Utc::now().naive_utc());
        Ok(true)
    }
}

// ============================================================================
// StubPaymentGateway
// ============================================================================

/// Accepts every charge unless `refuse_charges` is set; verification echoes
/// the reference back.
#[derive(Default)]
pub struct StubPaymentGateway {
    pub charges: Mutex<Vec<ChargeRequest>>,
    pub refuse_charges: AtomicBool,
}

impl StubPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_charge(&self) -> Option<ChargeRequest> {
        self.charges.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PaymentGateway for StubPaymentGateway {
    async fn create_charge(&self, request: &ChargeRequest) -> AppResult<serde_json::Value> {
        if self.refuse_charges.load(Ordering::SeqCst) {
            return Ok(serde_json::json!({
                "status": "error",
                "message": "Merchant account is not active",
            }));
        }
        self.charges.lock().unwrap().push(request.clone());
        Ok(serde_json::json!({
            "status": "success",
            "message": "Hosted Link",
            "data": { "link": format!("https://checkout.test/pay/{}", request.tx_ref) },
        }))
    }

    async fn verify_by_reference(&self, tx_ref: &str) -> AppResult<serde_json::Value> {
        Ok(serde_json::json!({
            "status": "success",
            "data": { "tx_ref": tx_ref, "status": "successful" },
        }))
    }
}
