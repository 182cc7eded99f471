//! Test data factories.
//!
//! Each factory returns a complete, valid object. Use the closure to override
//! specific fields.

use chrono::{Duration, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::{
    application::use_cases::{auth::UserProfile, payment::PaymentProfile, plans::PlanProfile},
    domain::entities::{payment_status::PaymentStatus, user_role::UserRole},
    infra::password::hash_password,
};

pub const TEST_PASSWORD: &str = "correct-horse";

pub fn test_datetime() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Verified user with a complete profile and password [`TEST_PASSWORD`].
pub fn create_test_user(overrides: impl FnOnce(&mut UserProfile)) -> UserProfile {
    let id = Uuid::new_v4();
    let mut user = UserProfile {
        id,
        email: format!("user-{}@x.com", id.simple()),
        password_hash: hash_password(TEST_PASSWORD).expect("hash test password"),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        role: UserRole::User,
        email_verified: true,
        verification_code: None,
        verification_code_expires: None,
        phone_number: None,
        age_range: None,
        gender: None,
        country: Some("Nigeria".to_string()),
        target_language: Some("Yoruba".to_string()),
        reason_for_learning: None,
        created_at: Some(test_datetime()),
        updated_at: Some(test_datetime()),
    };
    overrides(&mut user);
    user
}

/// Paid 30-day plan.
pub fn create_test_plan(overrides: impl FnOnce(&mut PlanProfile)) -> PlanProfile {
    let mut plan = PlanProfile {
        id: Uuid::new_v4(),
        title: "Monthly Plan".to_string(),
        price: 13000,
        duration_in_days: Some(30),
        features: vec!["All lessons".to_string(), "Quizzes".to_string()],
        button_text: Some("Subscribe".to_string()),
        discount: 0,
        created_at: Some(test_datetime()),
    };
    overrides(&mut plan);
    plan
}

/// Pending payment for `user_id` and `plan_id`, as left behind by checkout.
pub fn create_test_payment(
    user_id: Uuid,
    plan_id: Uuid,
    overrides: impl FnOnce(&mut PaymentProfile),
) -> PaymentProfile {
    let mut payment = PaymentProfile {
        id: Uuid::new_v4(),
        tx_ref: format!("tx_{}", Uuid::new_v4().simple()),
        amount: 13000,
        email: "payer@x.com".to_string(),
        plan_id,
        user_id,
        status: PaymentStatus::Pending,
        gateway_transaction_id: None,
        gateway_reference: None,
        gateway_data: None,
        created_at: Some(test_datetime() - Duration::minutes(1)),
        updated_at: Some(test_datetime() - Duration::minutes(1)),
    };
    overrides(&mut payment);
    payment
}
