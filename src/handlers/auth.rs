//! Public authentication endpoints: per-role register/login portals and
//! the password-reset pair. Required-field checks happen here so the
//! client sees the legacy messages instead of a deserialization error.

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::database::manager::DatabaseManager;
use crate::domain::Role;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::services::account_service::{self, Registration, FORGOT_PASSWORD_MESSAGE};
use crate::services::mailer::LogMailer;

pub fn router() -> Router {
    Router::new()
        .route("/api/auth/tenant/register", post(register_tenant))
        .route("/api/auth/tenant/login", post(login_tenant))
        .route("/api/auth/landlord/register", post(register_landlord))
        .route("/api/auth/landlord/login", post(login_landlord))
        .route("/api/auth/admin/login", post(login_admin))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/reset-password/:token", post(reset_password))
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Deserialize)]
struct RegisterPayload {
    email: Option<String>,
    password: Option<String>,
    full_name: Option<String>,
    phone_number: Option<String>,
}

async fn register(role: Role, payload: RegisterPayload) -> ApiResult<impl IntoResponse> {
    let (Some(email), Some(password), Some(full_name)) = (
        present(payload.email),
        present(payload.password),
        present(payload.full_name),
    ) else {
        return Err(ApiError::bad_request("Email, password và họ tên là bắt buộc."));
    };

    let pool = DatabaseManager::pool().await?;
    let outcome = account_service::register(
        pool,
        role,
        Registration {
            email,
            password,
            full_name,
            phone_number: payload.phone_number,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("Đăng ký {} thành công", role),
            "user": outcome.user,
            "token": outcome.token,
        })),
    ))
}

async fn register_tenant(ApiJson(payload): ApiJson<RegisterPayload>) -> ApiResult<impl IntoResponse> {
    register(Role::Tenant, payload).await
}

async fn register_landlord(ApiJson(payload): ApiJson<RegisterPayload>) -> ApiResult<impl IntoResponse> {
    register(Role::Landlord, payload).await
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    email: Option<String>,
    password: Option<String>,
}

async fn login(expected_role: Role, payload: LoginPayload) -> ApiResult<impl IntoResponse> {
    let (Some(email), Some(password)) = (present(payload.email), present(payload.password)) else {
        return Err(ApiError::bad_request("Email và password là bắt buộc"));
    };

    let pool = DatabaseManager::pool().await?;
    let outcome = account_service::login(pool, &email, &password, expected_role).await?;

    Ok(Json(json!({
        "message": "Đăng nhập thành công",
        "user": outcome.user,
        "token": outcome.token,
    })))
}

async fn login_tenant(ApiJson(payload): ApiJson<LoginPayload>) -> ApiResult<impl IntoResponse> {
    login(Role::Tenant, payload).await
}

async fn login_landlord(ApiJson(payload): ApiJson<LoginPayload>) -> ApiResult<impl IntoResponse> {
    login(Role::Landlord, payload).await
}

async fn login_admin(ApiJson(payload): ApiJson<LoginPayload>) -> ApiResult<impl IntoResponse> {
    login(Role::Admin, payload).await
}

#[derive(Debug, Deserialize)]
struct ForgotPasswordPayload {
    email: Option<String>,
}

async fn forgot_password(
    ApiJson(payload): ApiJson<ForgotPasswordPayload>,
) -> ApiResult<impl IntoResponse> {
    let Some(email) = present(payload.email) else {
        // An absent email is indistinguishable from an unknown one.
        return Ok(Json(json!({ "message": FORGOT_PASSWORD_MESSAGE })));
    };

    let pool = DatabaseManager::pool().await?;
    let sent = account_service::forgot_password(pool, &LogMailer, &email).await?;

    let message = if sent {
        "Mã đặt lại mật khẩu đã được gửi đến email của bạn."
    } else {
        FORGOT_PASSWORD_MESSAGE
    };
    Ok(Json(json!({ "message": message })))
}

#[derive(Debug, Deserialize)]
struct ResetPasswordPayload {
    password: Option<String>,
}

async fn reset_password(
    Path(token): Path<String>,
    ApiJson(payload): ApiJson<ResetPasswordPayload>,
) -> ApiResult<impl IntoResponse> {
    let Some(password) = present(payload.password) else {
        return Err(ApiError::bad_request("Password là bắt buộc"));
    };

    let pool = DatabaseManager::pool().await?;
    account_service::reset_password(pool, &token, &password).await?;

    Ok(Json(json!({ "message": "Mật khẩu đã được đặt lại thành công." })))
}
