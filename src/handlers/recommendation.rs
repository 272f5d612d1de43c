//! Tenant recommendations derived from the stored search preferences.

use axum::{
    middleware as axum_middleware, response::IntoResponse, routing::get, Extension, Json, Router,
};
use serde_json::json;

use crate::database::manager::DatabaseManager;
use crate::database::models::profile::TenantProfile;
use crate::database::models::rental_post::RentalPost;
use crate::domain::policy;
use crate::error::ApiResult;
use crate::middleware::{jwt_auth, AuthUser};

pub fn router() -> Router {
    Router::new()
        .route("/api/rental-posts/recommendations/my", get(get_recommendations))
        .layer(axum_middleware::from_fn(jwt_auth))
}

async fn get_recommendations(Extension(user): Extension<AuthUser>) -> ApiResult<impl IntoResponse> {
    policy::can_get_recommendations(user.caller())?;

    let pool = DatabaseManager::pool().await?;
    let recommendations = match TenantProfile::find_by_user_id(pool, user.id).await? {
        Some(profile) => RentalPost::recommended_for(pool, &profile).await?,
        // No stored preferences is not an error, just nothing to suggest from.
        None => Vec::new(),
    };

    if recommendations.is_empty() {
        return Ok(Json(json!({
            "message": "Không tìm thấy phòng phù hợp với yêu cầu của bạn.",
            "recommendations": [],
        })));
    }

    Ok(Json(json!({
        "message": "Danh sách phòng được gợi ý cho bạn.",
        "total": recommendations.len(),
        "recommendations": recommendations,
    })))
}
