//! Admin-only endpoints: admin account creation and the user/contract
//! oversight listings.

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::contract::{Contract, ContractFilters};
use crate::database::models::user::User;
use crate::domain::{policy, ContractStatus, Role};
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::handlers::profile::role_profile;
use crate::middleware::{jwt_auth, AuthUser};
use crate::services::account_service::{self, Registration};

pub fn router() -> Router {
    Router::new()
        .route("/api/admins/create", post(create_admin))
        .route("/api/admins/users", get(list_users))
        .route("/api/admins/users/:id", get(user_detail))
        .route("/api/admins/contracts", get(list_contracts))
        .layer(axum_middleware::from_fn(jwt_auth))
}

#[derive(Debug, Deserialize)]
struct CreateAdminPayload {
    email: Option<String>,
    password: Option<String>,
    full_name: Option<String>,
    phone_number: Option<String>,
    department: Option<String>,
}

async fn create_admin(
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CreateAdminPayload>,
) -> ApiResult<impl IntoResponse> {
    policy::can_create_admin(user.caller())?;

    let (Some(email), Some(password), Some(full_name)) = (
        payload.email.filter(|v| !v.trim().is_empty()),
        payload.password.filter(|v| !v.trim().is_empty()),
        payload.full_name.filter(|v| !v.trim().is_empty()),
    ) else {
        return Err(ApiError::bad_request("Email, password và họ tên là bắt buộc."));
    };

    let pool = DatabaseManager::pool().await?;
    let admin = account_service::create_admin(
        pool,
        Registration {
            email,
            password,
            full_name,
            phone_number: payload.phone_number,
        },
        payload.department.as_deref(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Tạo tài khoản admin thành công.",
            "user": admin,
        })),
    ))
}

#[derive(Debug, Deserialize)]
struct UsersQuery {
    role: Option<Role>,
}

async fn list_users(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<UsersQuery>,
) -> ApiResult<impl IntoResponse> {
    policy::can_list_users(user.caller())?;

    let pool = DatabaseManager::pool().await?;
    let users = User::list(pool, query.role).await?;

    Ok(Json(json!({
        "message": "Lấy danh sách người dùng thành công",
        "total": users.len(),
        "users": users,
    })))
}

async fn user_detail(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    policy::can_view_user_detail(user.caller())?;

    let pool = DatabaseManager::pool().await?;
    let target = User::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Người dùng không tồn tại"))?;

    let profile = role_profile(pool, &target).await?;

    Ok(Json(json!({
        "message": "Lấy thông tin người dùng thành công",
        "user": profile,
    })))
}

#[derive(Debug, Deserialize)]
struct AdminContractsQuery {
    status: Option<ContractStatus>,
    post_id: Option<Uuid>,
}

async fn list_contracts(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AdminContractsQuery>,
) -> ApiResult<impl IntoResponse> {
    policy::can_list_all_contracts(user.caller())?;

    let filters = ContractFilters {
        status: query.status,
        post_id: query.post_id,
    };
    let pool = DatabaseManager::pool().await?;
    let contracts = Contract::find_all(pool, &filters).await?;

    Ok(Json(json!({
        "message": "Lấy danh sách hợp đồng thành công",
        "total": contracts.len(),
        "contracts": contracts,
    })))
}
