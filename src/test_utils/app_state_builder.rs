//! `TestAppStateBuilder` builds a real `AppState` over in-memory mocks.
//!
//! The returned [`TestApp`] keeps handles to every mock so tests can seed
//! data, flip failure switches and inspect side effects.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;
use time::Duration;
use url::Url;

use crate::{
    adapters::http::app_state::AppState,
    application::use_cases::{auth::UserProfile, payment::PaymentProfile, plans::PlanProfile},
    infra::{
        config::AppConfig,
        password::Argon2PasswordHasher,
        setup::{Repos, build_app_state},
    },
    test_utils::{
        InMemoryPasswordResetTokenRepo, InMemoryPaymentRepo, InMemoryPlanRepo,
        InMemoryRefreshTokenRepo, InMemoryUserPlanRepo, InMemoryUserRepo, RecordingNotifier,
        StubPaymentGateway,
    },
};

pub const TEST_WEBHOOK_HASH: &str = "test-webhook-hash";
pub const TEST_FRONTEND_URL: &str = "https://afrilearn.test";

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".to_string(),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
        access_token_secret: SecretString::new("test-access-secret".into()),
        refresh_token_secret: SecretString::new("test-refresh-secret".into()),
        access_token_ttl: Duration::minutes(15),
        refresh_token_ttl: Duration::days(7),
        verification_code_ttl_minutes: 10,
        password_reset_ttl_minutes: 15,
        frontend_url: Url::parse(TEST_FRONTEND_URL).expect("valid test url"),
        resend_api_key: SecretString::new("test-resend-key".into()),
        email_from: "Afrilearn <noreply@afrilearn.test>".to_string(),
        flw_base_url: Url::parse("https://gateway.test/v3").expect("valid test url"),
        flw_secret_key: SecretString::new("test-gateway-key".into()),
        flw_webhook_hash: SecretString::new(TEST_WEBHOOK_HASH.into()),
        payment_currency: "NGN".to_string(),
        free_plan_title: "Free Plan".to_string(),
        assign_plan_on_any_status: false,
    }
}

/// App state plus the mocks behind it.
pub struct TestApp {
    pub state: AppState,
    pub users: Arc<InMemoryUserRepo>,
    pub refresh_tokens: Arc<InMemoryRefreshTokenRepo>,
    pub reset_tokens: Arc<InMemoryPasswordResetTokenRepo>,
    pub plans: Arc<InMemoryPlanRepo>,
    pub user_plans: Arc<InMemoryUserPlanRepo>,
    pub payments: Arc<InMemoryPaymentRepo>,
    pub notifier: Arc<RecordingNotifier>,
    pub gateway: Arc<StubPaymentGateway>,
}

#[derive(Default)]
pub struct TestAppStateBuilder {
    users: Vec<UserProfile>,
    plans: Vec<PlanProfile>,
    payments: Vec<PaymentProfile>,
    assign_plan_on_any_status: bool,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: UserProfile) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_plan(mut self, plan: PlanProfile) -> Self {
        self.plans.push(plan);
        self
    }

    pub fn with_payment(mut self, payment: PaymentProfile) -> Self {
        self.payments.push(payment);
        self
    }

    pub fn with_assign_plan_on_any_status(mut self, enabled: bool) -> Self {
        self.assign_plan_on_any_status = enabled;
        self
    }

    pub fn build(self) -> TestApp {
        let users = Arc::new(InMemoryUserRepo::with_users(self.users));
        let refresh_tokens = Arc::new(InMemoryRefreshTokenRepo::new());
        let reset_tokens = Arc::new(InMemoryPasswordResetTokenRepo::new());
        let plans = Arc::new(InMemoryPlanRepo::with_plans(self.plans));
        let user_plans = Arc::new(InMemoryUserPlanRepo::new());
        let payments = Arc::new(InMemoryPaymentRepo::new());
        for payment in self.payments {
            payments.insert(payment);
        }
        let notifier = Arc::new(RecordingNotifier::new());
        let gateway = Arc::new(StubPaymentGateway::new());

        let mut config = test_config();
        config.assign_plan_on_any_status = self.assign_plan_on_any_status;

        let state = build_app_state(
            config,
            Repos {
                users: users.clone(),
                refresh_tokens: refresh_tokens.clone(),
                reset_tokens: reset_tokens.clone(),
                plans: plans.clone(),
                user_plans: user_plans.clone(),
                payments: payments.clone(),
            },
            notifier.clone(),
            Arc::new(Argon2PasswordHasher),
            gateway.clone(),
        );

        TestApp {
            state,
            users,
            refresh_tokens,
            reset_tokens,
            plans,
            user_plans,
            payments,
            notifier,
            gateway,
        }
    }
}
