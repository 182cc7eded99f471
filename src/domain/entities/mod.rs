pub mod gateway_webhook;
pub mod payment_status;
pub mod subscription_window;
pub mod user_role;
