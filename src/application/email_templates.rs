use url::Url;

const BRAND_NAME: &str = "Afrilearn";

fn origin_label(frontend_url: &str) -> String {
    Url::parse(frontend_url)
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_string()))
        .unwrap_or_else(|| frontend_url.to_string())
}

pub fn primary_button(url: &str, label: &str) -> String {
    format!(
        r#"<a href="{url}" style="display:inline-block;padding:12px 18px;background-color:#28a745;color:#ffffff;text-decoration:none;border-radius:8px;font-weight:600;">{label}</a>"#
    )
}

pub fn verification_code_email(
    frontend_url: &str,
    name: &str,
    code: &str,
    ttl_minutes: i64,
) -> (String, String) {
    let subject = "Verify Your Email".to_string();
    let headline = format!("Hello {}", name);
    let lead = format!(
        "Thanks for signing up on <strong>{}</strong>. Please use the code below to verify your email address.",
        BRAND_NAME
    );
    let body = format!(
        r#"<div style="font-size:24px;font-weight:bold;letter-spacing:0.2em;background:#f3f4f6;padding:12px 20px;border-radius:6px;display:inline-block;">{code}</div>
<p style="margin:16px 0 0;color:#374151;">This code expires in <strong>{ttl_minutes} minutes</strong>. Enter it on the website to complete your registration.</p>"#
    );
    let html = wrap_email(
        frontend_url,
        &headline,
        &lead,
        &body,
        "you signed up for an account",
    );
    (subject, html)
}

pub fn welcome_email(frontend_url: &str, name: &str) -> (String, String) {
    let subject = format!("Welcome to {}!", BRAND_NAME);
    let headline = format!("Hello {}", name);
    let lead = format!(
        "Welcome to <strong>{}</strong>. We are excited to have you here.",
        BRAND_NAME
    );
    let dashboard = format!("{}/dashboard", frontend_url.trim_end_matches('/'));
    let body = format!(
        r#"<p style="margin:0 0 16px;color:#374151;">Learn African languages with live instruction and AI-powered practice, at your own pace.</p>{}"#,
        primary_button(&dashboard, "Go to Dashboard")
    );
    let html = wrap_email(
        frontend_url,
        &headline,
        &lead,
        &body,
        "you completed your profile",
    );
    (subject, html)
}

pub fn reset_password_email(frontend_url: &str, reset_link: &str, ttl_minutes: i64) -> (String, String) {
    let subject = "Reset Your Password".to_string();
    let lead = format!(
        "We received a request to reset the password for your {} account.",
        BRAND_NAME
    );
    let body = format!(
        r#"{button}<p style="margin:12px 0 0;color:#374151;">Or paste this link into your browser: {reset_link}</p>
<p style="margin:12px 0 0;color:#374151;">The link expires in <strong>{ttl_minutes} minutes</strong>.</p>"#,
        button = primary_button(reset_link, "Reset password"),
    );
    let html = wrap_email(
        frontend_url,
        "Password reset request",
        &lead,
        &body,
        "someone asked to reset your password",
    );
    (subject, html)
}

pub fn wrap_email(
    frontend_url: &str,
    headline: &str,
    lead: &str,
    body_html: &str,
    reason: &str,
) -> String {
    let origin = origin_label(frontend_url);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <body style="background:#f7f7f7;margin:0;padding:24px;font-family:Arial,Helvetica,sans-serif;">
    <div style="max-width:560px;margin:0 auto;background:#ffffff;border:1px solid #e5e7eb;border-radius:12px;padding:24px;">
      <div style="font-size:12px;letter-spacing:0.08em;text-transform:uppercase;color:#6b7280;">{brand} - {origin}</div>
      <h1 style="margin:12px 0 8px;font-size:22px;color:#111827;">{headline}</h1>
      <p style="margin:0 0 12px;font-size:15px;color:#111827;line-height:1.6;">{lead}</p>
      {body_html}
      <div style="margin-top:20px;padding-top:16px;border-top:1px solid #e5e7eb;">
        <p style="margin:0 0 6px;font-size:13px;color:#4b5563;">Why you got this email: {reason}.</p>
        <p style="margin:0;font-size:13px;color:#4b5563;">If you didn't request this, you can safely ignore it.</p>
      </div>
      <p style="margin:14px 0 0;font-size:12px;color:#9ca3af;">The {brand} Team</p>
    </div>
  </body>
</html>
"#,
        brand = BRAND_NAME,
    )
}
