//! Current-user profile: the users row merged with the role-specific
//! profile columns into one flat object.

use axum::{
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use sqlx::PgPool;

use crate::database::manager::DatabaseManager;
use crate::database::models::profile::{
    AdminProfile, LandlordProfile, LandlordProfilePatch, TenantProfile, TenantProfilePatch,
};
use crate::database::models::user::User;
use crate::domain::{rules, Role};
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::middleware::{jwt_auth, AuthUser};

pub fn router() -> Router {
    Router::new()
        .route("/api/profile", get(get_profile))
        .route("/api/profile/edit-profile", put(update_profile))
        .layer(axum_middleware::from_fn(jwt_auth))
}

fn merge_into(base: &mut Map<String, Value>, extra: Value) {
    if let Value::Object(fields) = extra {
        for (key, value) in fields {
            // The owning user's id and timestamps win over the profile row's.
            if key == "user_id" || key == "created_at" || key == "updated_at" {
                continue;
            }
            base.insert(key, value);
        }
    }
}

/// Flatten a user and their role-specific profile into one response object.
pub async fn role_profile(pool: &PgPool, user: &User) -> ApiResult<Value> {
    let mut base = match serde_json::to_value(user) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };

    match user.role {
        Role::Tenant => {
            if let Some(profile) = TenantProfile::find_by_user_id(pool, user.id).await? {
                if let Ok(extra) = serde_json::to_value(&profile) {
                    merge_into(&mut base, extra);
                }
            }
        }
        Role::Landlord => {
            if let Some(profile) = LandlordProfile::find_by_user_id(pool, user.id).await? {
                if let Ok(extra) = serde_json::to_value(&profile) {
                    merge_into(&mut base, extra);
                }
            }
        }
        Role::Admin => {
            if let Some(profile) = AdminProfile::find_by_user_id(pool, user.id).await? {
                if let Ok(extra) = serde_json::to_value(&profile) {
                    merge_into(&mut base, extra);
                }
            }
        }
    }

    Ok(Value::Object(base))
}

async fn get_profile(Extension(auth): Extension<AuthUser>) -> ApiResult<impl IntoResponse> {
    let pool = DatabaseManager::pool().await?;
    let user = User::find_by_id(pool, auth.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Không tìm thấy người dùng"))?;

    let profile = role_profile(pool, &user).await?;

    Ok(Json(json!({
        "message": "Lấy thông tin profile thành công",
        "profile": profile,
    })))
}

#[derive(Debug, Deserialize)]
struct UpdateProfilePayload {
    full_name: Option<String>,
    phone_number: Option<String>,
    // tenant
    target_province_code: Option<String>,
    target_ward_code: Option<String>,
    budget_min: Option<Decimal>,
    budget_max: Option<Decimal>,
    gender: Option<String>,
    dob: Option<String>,
    bio: Option<String>,
    // landlord
    identity_card: Option<String>,
    address_detail: Option<String>,
    // admin
    department: Option<String>,
}

async fn update_profile(
    Extension(auth): Extension<AuthUser>,
    ApiJson(payload): ApiJson<UpdateProfilePayload>,
) -> ApiResult<impl IntoResponse> {
    let dob = payload.dob.as_deref().map(rules::parse_date).transpose()?;

    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    if let Some(full_name) = &payload.full_name {
        User::update_full_name(&mut *tx, auth.id, full_name).await?;
    }

    match auth.role {
        Role::Tenant => {
            let patch = TenantProfilePatch {
                phone_number: payload.phone_number,
                target_province_code: payload.target_province_code,
                target_ward_code: payload.target_ward_code,
                budget_min: payload.budget_min,
                budget_max: payload.budget_max,
                gender: payload.gender,
                dob,
                bio: payload.bio,
            };
            TenantProfile::update(&mut *tx, auth.id, &patch).await?;
        }
        Role::Landlord => {
            let patch = LandlordProfilePatch {
                phone_number: payload.phone_number,
                identity_card: payload.identity_card,
                address_detail: payload.address_detail,
                gender: payload.gender,
                dob,
                bio: payload.bio,
            };
            LandlordProfile::update(&mut *tx, auth.id, &patch).await?;
        }
        Role::Admin => {
            AdminProfile::update(
                &mut *tx,
                auth.id,
                payload.department.as_deref(),
                payload.phone_number.as_deref(),
            )
            .await?;
        }
    }

    tx.commit().await?;

    let user = User::find_by_id(pool, auth.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Không tìm thấy người dùng"))?;
    let profile = role_profile(pool, &user).await?;

    Ok(Json(json!({
        "message": "Cập nhật profile thành công",
        "profile": profile,
    })))
}
