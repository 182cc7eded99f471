use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{
        email::resend::ResendNotifier, http::app_state::AppState,
        persistence::PostgresPersistence,
    },
    application::jwt::TokenIssuer,
    infra::{
        config::AppConfig, db::init_db, error::InfraError,
        flutterwave_client::FlutterwaveClient, http_client::try_build_client,
        password::Argon2PasswordHasher,
    },
    use_cases::{
        auth::{
            AuthSettings, AuthUseCases, Notifier, PasswordHasher, PasswordResetTokenRepo,
            RefreshTokenRepo, UserRepo,
        },
        payment::{PaymentRepo, PaymentSettings, PaymentUseCases},
        plans::{PlanRepo, PlanUseCases, UserPlanRepo},
        user::UserUseCases,
    },
};

pub async fn init_app_state() -> Result<AppState, InfraError> {
    let config = AppConfig::from_env();

    let postgres = Arc::new(PostgresPersistence::new(init_db(&config.database_url).await?));
    let http = try_build_client().map_err(InfraError::HttpClient)?;

    let notifier: Arc<dyn Notifier> = Arc::new(ResendNotifier::new(
        http.clone(),
        config.resend_api_key.clone(),
        config.email_from.clone(),
        config.frontend_base(),
        config.verification_code_ttl_minutes,
        config.password_reset_ttl_minutes,
    ));
    let gateway = Arc::new(FlutterwaveClient::new(
        http,
        config.gateway_base(),
        config.flw_secret_key.clone(),
    ));

    Ok(build_app_state(
        config,
        Repos {
            users: postgres.clone(),
            refresh_tokens: postgres.clone(),
            reset_tokens: postgres.clone(),
            plans: postgres.clone(),
            user_plans: postgres.clone(),
            payments: postgres,
        },
        notifier,
        Arc::new(Argon2PasswordHasher),
        gateway,
    ))
}

/// Storage handles the use cases need. Postgres in production, in-memory in tests.
pub struct Repos {
    pub users: Arc<dyn UserRepo>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepo>,
    pub reset_tokens: Arc<dyn PasswordResetTokenRepo>,
    pub plans: Arc<dyn PlanRepo>,
    pub user_plans: Arc<dyn UserPlanRepo>,
    pub payments: Arc<dyn PaymentRepo>,
}

pub fn build_app_state(
    config: AppConfig,
    repos: Repos,
    notifier: Arc<dyn Notifier>,
    hasher: Arc<dyn PasswordHasher>,
    gateway: Arc<dyn crate::application::ports::payment_gateway::PaymentGateway>,
) -> AppState {
    let tokens = Arc::new(TokenIssuer::new(
        config.access_token_secret.clone(),
        config.refresh_token_secret.clone(),
        config.access_token_ttl,
        config.refresh_token_ttl,
    ));

    let auth_use_cases = AuthUseCases::new(
        repos.users.clone(),
        repos.refresh_tokens,
        repos.reset_tokens,
        repos.plans.clone(),
        repos.user_plans.clone(),
        notifier.clone(),
        hasher,
        tokens.clone(),
        AuthSettings {
            frontend_url: config.frontend_base(),
            verification_code_ttl: chrono::Duration::minutes(config.verification_code_ttl_minutes),
            password_reset_ttl: chrono::Duration::minutes(config.password_reset_ttl_minutes),
            free_plan_title: config.free_plan_title.clone(),
        },
    );

    let user_use_cases = UserUseCases::new(
        repos.users.clone(),
        notifier,
        chrono::Duration::minutes(config.verification_code_ttl_minutes),
    );

    let plan_use_cases = PlanUseCases::new(repos.plans.clone());

    let payment_use_cases = PaymentUseCases::new(
        repos.payments,
        repos.plans,
        repos.user_plans,
        repos.users,
        gateway,
        PaymentSettings {
            frontend_url: config.frontend_base(),
            currency: config.payment_currency.clone(),
            webhook_hash: config.flw_webhook_hash.clone(),
            assign_plan_on_any_status: config.assign_plan_on_any_status,
        },
    );

    AppState {
        config: Arc::new(config),
        tokens,
        auth_use_cases: Arc::new(auth_use_cases),
        user_use_cases: Arc::new(user_use_cases),
        plan_use_cases: Arc::new(plan_use_cases),
        payment_use_cases: Arc::new(payment_use_cases),
    }
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "afrilearn_api=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer().with_target(false).with_level(true).pretty();

    // File (structured JSON logs); console-only if the file can't be created.
    let json_layer = File::create("app.log").ok().map(|file| {
        fmt::layer()
            .json()
            .with_writer(file)
            .with_current_span(true)
            .with_span_list(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
