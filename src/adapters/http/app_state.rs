use std::sync::Arc;

use crate::{
    application::jwt::TokenIssuer,
    infra::config::AppConfig,
    use_cases::{
        auth::AuthUseCases, payment::PaymentUseCases, plans::PlanUseCases, user::UserUseCases,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenIssuer>,
    pub auth_use_cases: Arc<AuthUseCases>,
    pub user_use_cases: Arc<UserUseCases>,
    pub plan_use_cases: Arc<PlanUseCases>,
    pub payment_use_cases: Arc<PaymentUseCases>,
}
