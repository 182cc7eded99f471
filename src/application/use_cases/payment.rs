use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use subtle::ConstantTimeEq;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::payment_gateway::{
            ChargeCustomer, ChargeCustomizations, ChargeMeta, ChargeRequest, GATEWAY_SUCCESS,
            PaymentGateway,
        },
        use_cases::{
            auth::UserRepo,
            plans::{PlanRepo, UpsertUserPlan, UserPlanRepo},
        },
        validators::{is_valid_email, non_blank, normalize_email},
    },
    domain::entities::{
        gateway_webhook::{ChargeCompleted, GatewayWebhook},
        payment_status::PaymentStatus,
        subscription_window::SubscriptionWindow,
    },
};

const CHECKOUT_TITLE: &str = "Afrilearn";

// ============================================================================
// Profiles
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProfile {
    pub id: Uuid,
    pub tx_ref: String,
    pub amount: i64,
    pub email: String,
    pub plan_id: Uuid,
    pub user_id: Uuid,
    pub status: PaymentStatus,
    pub gateway_transaction_id: Option<String>,
    pub gateway_reference: Option<String>,
    pub gateway_data: Option<serde_json::Value>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub tx_ref: String,
    pub amount: i64,
    pub email: String,
    pub plan_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct GatewayUpdate {
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub reference: Option<String>,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct InitiatePayment {
    pub plan_id: Uuid,
    pub amount: i64,
    pub email: String,
    pub user_id: Uuid,
    pub phone_number: String,
    pub first_name: String,
}

// ============================================================================
// Repository Trait
// ============================================================================

#[async_trait]
pub trait PaymentRepo: Send + Sync {
    async fn create(&self, input: NewPayment) -> AppResult<PaymentProfile>;
    async fn find_by_tx_ref(&self, tx_ref: &str) -> AppResult<Option<PaymentProfile>>;
    /// Applies the update only while the payment is still `PENDING`.
    /// Returns whether a row changed.
    async fn apply_gateway_update(&self, payment_id: Uuid, update: GatewayUpdate)
    -> AppResult<bool>;
}

// ============================================================================
// Webhook outcome
// ============================================================================

/// What a webhook delivery did. Every variant is acknowledged to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Ignored { event: String },
    UnknownPayment { tx_ref: String },
    AlreadyProcessed { tx_ref: String, status: PaymentStatus },
    Updated {
        tx_ref: String,
        status: PaymentStatus,
        subscribed_to: Option<String>,
    },
    /// Reconciliation failed after the signature was accepted; logged, not surfaced.
    Swallowed { retryable: bool },
}

impl WebhookOutcome {
    pub fn message(&self) -> String {
        match self {
            WebhookOutcome::Updated {
                subscribed_to: Some(title),
                ..
            } => format!("Subscription to {} successful", title),
            WebhookOutcome::Updated { .. } => "Webhook processed".to_string(),
            _ => "Webhook Received".to_string(),
        }
    }
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct PaymentSettings {
    /// Base URL of the web client, without trailing slash.
    pub frontend_url: String,
    pub currency: String,
    pub webhook_hash: SecretString,
    /// Assign the plan for any mapped status instead of only on SUCCESS.
    pub assign_plan_on_any_status: bool,
}

#[derive(Clone)]
pub struct PaymentUseCases {
    payments: Arc<dyn PaymentRepo>,
    plans: Arc<dyn PlanRepo>,
    user_plans: Arc<dyn UserPlanRepo>,
    users: Arc<dyn UserRepo>,
    gateway: Arc<dyn PaymentGateway>,
    settings: PaymentSettings,
}

impl PaymentUseCases {
    pub fn new(
        payments: Arc<dyn PaymentRepo>,
        plans: Arc<dyn PlanRepo>,
        user_plans: Arc<dyn UserPlanRepo>,
        users: Arc<dyn UserRepo>,
        gateway: Arc<dyn PaymentGateway>,
        settings: PaymentSettings,
    ) -> Self {
        Self {
            payments,
            plans,
            user_plans,
            users,
            gateway,
            settings,
        }
    }

    #[instrument(skip(self, input), fields(plan_id = %input.plan_id, user_id = %input.user_id))]
    pub async fn initiate(&self, input: InitiatePayment) -> AppResult<serde_json::Value> {
        let plan = self
            .plans
            .find_by_id(input.plan_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Plan not found".into()))?;

        if input.amount != plan.price {
            return Err(AppError::InvalidInput(format!(
                "Invalid amount. Expected ₦{}, but got ₦{}",
                plan.price, input.amount
            )));
        }

        let email = normalize_email(&input.email);
        if !is_valid_email(&email) {
            return Err(AppError::InvalidInput("Invalid email address".into()));
        }

        let tx_ref = generate_tx_ref();
        self.payments
            .create(NewPayment {
                tx_ref: tx_ref.clone(),
                amount: input.amount,
                email: email.clone(),
                plan_id: plan.id,
                user_id: input.user_id,
            })
            .await?;

        let request = ChargeRequest {
            tx_ref: tx_ref.clone(),
            amount: input.amount,
            currency: self.settings.currency.clone(),
            redirect_url: format!("{}/payment/success", self.settings.frontend_url),
            customer: ChargeCustomer {
                email,
                phone_number: input.phone_number,
                name: input.first_name,
            },
            customizations: ChargeCustomizations {
                title: CHECKOUT_TITLE.to_string(),
                description: format!("Purchase of {}", plan.title),
            },
            meta: ChargeMeta {
                plan_id: plan.id,
                user_id: input.user_id,
            },
        };

        let response = self.gateway.create_charge(&request).await?;
        if response.get("status").and_then(|s| s.as_str()) != Some(GATEWAY_SUCCESS) {
            tracing::error!(
                tx_ref = %tx_ref,
                gateway_message = ?response.get("message"),
                "Gateway refused to initialize payment"
            );
            return Err(AppError::PaymentGateway(
                "Failed to initialize payment".into(),
            ));
        }

        tracing::info!(tx_ref = %tx_ref, "Payment initiated");
        Ok(response)
    }

    /// Read-through to the gateway; local state is left alone.
    #[instrument(skip(self))]
    pub async fn verify(&self, tx_ref: &str) -> AppResult<serde_json::Value> {
        let Some(tx_ref) = non_blank(Some(tx_ref)) else {
            return Err(AppError::NotFound("Missing transaction reference".into()));
        };
        self.gateway.verify_by_reference(tx_ref).await
    }

    /// Only a bad signature or an unparseable body is an error here. Anything
    /// that fails after that is logged and acknowledged so the gateway does
    /// not keep redelivering.
    #[instrument(skip_all)]
    pub async fn handle_webhook(
        &self,
        body: &str,
        signature: Option<&str>,
    ) -> AppResult<WebhookOutcome> {
        if !self.signature_matches(signature) {
            tracing::warn!("Invalid webhook signature received");
            return Err(AppError::InvalidSignature);
        }

        let webhook = GatewayWebhook::parse(body).map_err(AppError::InvalidInput)?;
        tracing::debug!(event = webhook.event_type(), "Webhook accepted");

        let (charge, raw) = match webhook {
            GatewayWebhook::ChargeCompleted { charge, raw } => (charge, raw),
            GatewayWebhook::Other { event } => {
                tracing::debug!(event = %event, "Ignoring webhook event");
                return Ok(WebhookOutcome::Ignored { event });
            }
        };

        let tx_ref = charge.tx_ref.clone();
        match self.reconcile_charge(charge, raw).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                let retryable = e.is_retryable();
                tracing::error!(
                    error = %e,
                    tx_ref = %tx_ref,
                    retryable,
                    "Webhook reconciliation failed, acknowledging anyway"
                );
                Ok(WebhookOutcome::Swallowed { retryable })
            }
        }
    }

    fn signature_matches(&self, signature: Option<&str>) -> bool {
        let expected = self.settings.webhook_hash.expose_secret();
        match signature {
            Some(presented) if !expected.is_empty() => {
                presented.as_bytes().ct_eq(expected.as_bytes()).into()
            }
            _ => false,
        }
    }

    async fn reconcile_charge(
        &self,
        charge: ChargeCompleted,
        raw: serde_json::Value,
    ) -> AppResult<WebhookOutcome> {
        let Some(payment) = self.payments.find_by_tx_ref(&charge.tx_ref).await? else {
            tracing::warn!(tx_ref = %charge.tx_ref, "Payment not found for reference");
            return Ok(WebhookOutcome::UnknownPayment {
                tx_ref: charge.tx_ref,
            });
        };

        if payment.status.is_terminal() {
            if self.plan_assignment_missing(&payment).await? {
                tracing::info!(
                    tx_ref = %payment.tx_ref,
                    "Settled payment has no plan assignment, retrying it"
                );
                let status = payment.status;
                return self.assign_plan(payment, status).await;
            }
            tracing::info!(
                tx_ref = %payment.tx_ref,
                status = %payment.status,
                "Payment already settled, ignoring redelivery"
            );
            return Ok(WebhookOutcome::AlreadyProcessed {
                tx_ref: payment.tx_ref,
                status: payment.status,
            });
        }

        let status = PaymentStatus::from_gateway_status(&charge.status);
        let applied = self
            .payments
            .apply_gateway_update(
                payment.id,
                GatewayUpdate {
                    status,
                    transaction_id: charge.transaction_id(),
                    reference: charge.flw_ref.clone(),
                    data: raw,
                },
            )
            .await?;
        if !applied {
            // A concurrent delivery settled it first.
            return Ok(WebhookOutcome::AlreadyProcessed {
                tx_ref: payment.tx_ref,
                status,
            });
        }
        tracing::info!(tx_ref = %payment.tx_ref, status = %status, "Payment status updated");

        if !self.grants_plan(status) {
            return Ok(WebhookOutcome::Updated {
                tx_ref: payment.tx_ref,
                status,
                subscribed_to: None,
            });
        }

        self.assign_plan(payment, status).await
    }

    fn grants_plan(&self, status: PaymentStatus) -> bool {
        status.is_successful() || self.settings.assign_plan_on_any_status
    }

    /// True when a settled payment should have produced a plan but the user's
    /// current assignment predates it. That happens when the upsert failed
    /// after the status was saved; a later payment's assignment is left alone.
    async fn plan_assignment_missing(&self, payment: &PaymentProfile) -> AppResult<bool> {
        if !self.grants_plan(payment.status) {
            return Ok(false);
        }
        let current = self.user_plans.find_by_user(payment.user_id).await?;
        Ok(match current {
            None => true,
            Some(current) if current.payment_id == Some(payment.id) => false,
            Some(current) => payment
                .updated_at
                .is_some_and(|settled_at| current.start_date < settled_at),
        })
    }

    async fn assign_plan(
        &self,
        payment: PaymentProfile,
        status: PaymentStatus,
    ) -> AppResult<WebhookOutcome> {
        let (user, plan) = tokio::try_join!(
            self.users.find_by_id(payment.user_id),
            self.plans.find_by_id(payment.plan_id),
        )?;
        let (Some(user), Some(plan)) = (user, plan) else {
            tracing::warn!(tx_ref = %payment.tx_ref, "User or plan not found from payment");
            return Ok(WebhookOutcome::Updated {
                tx_ref: payment.tx_ref,
                status,
                subscribed_to: None,
            });
        };

        self.user_plans
            .upsert(UpsertUserPlan {
                user_id: user.id,
                plan_id: plan.id,
                payment_id: Some(payment.id),
                window: SubscriptionWindow::starting_at(
                    Utc::now().naive_utc(),
                    plan.duration_in_days,
                ),
            })
            .await?;

        tracing::info!(user_id = %user.id, plan = %plan.title, "User subscribed");
        Ok(WebhookOutcome::Updated {
            tx_ref: payment.tx_ref,
            status,
            subscribed_to: Some(plan.title),
        })
    }
}

/// `tx_` followed by 32 hex characters.
pub fn generate_tx_ref() -> String {
    format!("tx_{}", Uuid::new_v4().simple())
}
