//! Public location lookup over seeded province/ward reference data.

use axum::{extract::Query, response::IntoResponse, routing::get, Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::database::manager::DatabaseManager;
use crate::database::models::location::{Province, Ward};
use crate::error::{ApiError, ApiResult};

pub fn router() -> Router {
    Router::new()
        .route("/api/locations/provinces", get(get_provinces))
        .route("/api/locations/wards", get(get_wards))
        .route("/api/locations/search-province", get(search_provinces))
        .route("/api/locations/search-ward", get(search_wards))
}

async fn get_provinces() -> ApiResult<impl IntoResponse> {
    let pool = DatabaseManager::pool().await?;
    let provinces = Province::find_all(pool).await?;
    Ok(Json(json!({
        "message": "Lấy danh sách tỉnh/thành phố thành công",
        "provinces": provinces,
    })))
}

#[derive(Debug, Deserialize)]
struct WardsQuery {
    province_code: Option<String>,
}

async fn get_wards(Query(query): Query<WardsQuery>) -> ApiResult<impl IntoResponse> {
    let pool = DatabaseManager::pool().await?;
    let wards = match query.province_code.as_deref() {
        Some(province_code) if !province_code.is_empty() => {
            Ward::find_by_province(pool, province_code).await?
        }
        _ => Ward::find_all(pool).await?,
    };
    Ok(Json(json!({
        "message": "Lấy danh sách phường/xã thành công",
        "wards": wards,
    })))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    keyword: Option<String>,
    province_code: Option<String>,
}

async fn search_provinces(Query(query): Query<SearchQuery>) -> ApiResult<impl IntoResponse> {
    let keyword = query
        .keyword
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Keyword không được trống"))?;

    let pool = DatabaseManager::pool().await?;
    let provinces = Province::search(pool, &keyword).await?;
    Ok(Json(json!({
        "message": "Tìm kiếm tỉnh/thành phố thành công",
        "provinces": provinces,
    })))
}

async fn search_wards(Query(query): Query<SearchQuery>) -> ApiResult<impl IntoResponse> {
    let keyword = query
        .keyword
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Keyword không được trống"))?;
    let province_code = query
        .province_code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Province code không được trống"))?;

    let pool = DatabaseManager::pool().await?;
    let wards = Ward::search(pool, &province_code, &keyword).await?;
    Ok(Json(json!({
        "message": "Tìm kiếm phường/xã thành công",
        "wards": wards,
    })))
}
