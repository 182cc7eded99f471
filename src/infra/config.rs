use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use time::Duration;
use url::Url;

pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    pub access_token_secret: SecretString,
    pub refresh_token_secret: SecretString,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub verification_code_ttl_minutes: i64,
    pub password_reset_ttl_minutes: i64,
    /// Web client origin; base for reset links and payment redirects.
    pub frontend_url: Url,
    pub resend_api_key: SecretString,
    pub email_from: String,
    pub flw_base_url: Url,
    pub flw_secret_key: SecretString,
    /// Pre-shared value the gateway sends in the `verif-hash` header.
    pub flw_webhook_hash: SecretString,
    pub payment_currency: String,
    pub free_plan_title: String,
    /// When true, a webhook assigns the plan for any mapped status, not only SUCCESS.
    pub assign_plan_on_any_status: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url: String = get_env("DATABASE_URL");
        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");

        let access_token_secret = SecretString::new(get_env::<String>("ACCESS_TOKEN_SECRET").into());
        let refresh_token_secret =
            SecretString::new(get_env::<String>("REFRESH_TOKEN_SECRET").into());
        let access_token_ttl_secs: i64 = get_env_default("ACCESS_TOKEN_TTL_SECS", 900);
        let refresh_token_ttl_days: i64 = get_env_default("REFRESH_TOKEN_TTL_DAYS", 7);
        let verification_code_ttl_minutes: i64 = get_env_default("VERIFICATION_CODE_TTL_MINUTES", 10);
        let password_reset_ttl_minutes: i64 = get_env_default("PASSWORD_RESET_TTL_MINUTES", 15);

        let frontend_url: Url = get_env("FRONTEND_URL");
        let resend_api_key = SecretString::new(get_env::<String>("RESEND_API_KEY").into());
        let email_from: String = get_env("EMAIL_FROM");

        let flw_base_url: Url = get_env_default(
            "FLW_BASE_URL",
            "https://api.flutterwave.com/v3".parse().unwrap(),
        );
        let flw_secret_key = SecretString::new(get_env::<String>("FLW_SECRET_KEY").into());
        let flw_webhook_hash = SecretString::new(get_env::<String>("FLW_WEBHOOK_HASH").into());
        let payment_currency: String = get_env_default("PAYMENT_CURRENCY", "NGN".to_string());
        let free_plan_title: String = get_env_default("FREE_PLAN_TITLE", "Free Plan".to_string());
        let assign_plan_on_any_status: bool = get_env_default("ASSIGN_PLAN_ON_ANY_STATUS", false);

        Self {
            database_url,
            bind_addr,
            cors_origin,
            access_token_secret,
            refresh_token_secret,
            access_token_ttl: Duration::seconds(access_token_ttl_secs),
            refresh_token_ttl: Duration::days(refresh_token_ttl_days),
            verification_code_ttl_minutes,
            password_reset_ttl_minutes,
            frontend_url,
            resend_api_key,
            email_from,
            flw_base_url,
            flw_secret_key,
            flw_webhook_hash,
            payment_currency,
            free_plan_title,
            assign_plan_on_any_status,
        }
    }

    /// `frontend_url` without the trailing slash `Url` adds to bare origins.
    pub fn frontend_base(&self) -> String {
        self.frontend_url.as_str().trim_end_matches('/').to_string()
    }

    /// `flw_base_url` without a trailing slash, ready for path joins.
    pub fn gateway_base(&self) -> String {
        self.flw_base_url.as_str().trim_end_matches('/').to_string()
    }
}
