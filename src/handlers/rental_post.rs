//! Rental post endpoints. Moderation (approve/reject) takes the post id in
//! the request body rather than the path.

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::rental_post::{NewPost, PostFilters, PostPatch, RentalPost};
use crate::domain::{policy, rules, PostStatus};
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::middleware::{jwt_auth, AuthUser};

pub fn router() -> Router {
    Router::new()
        .route("/api/rental-posts", get(list_posts).post(create_post))
        .route("/api/rental-posts/my/posts", get(my_posts))
        .route("/api/rental-posts/approve", put(approve_post))
        .route("/api/rental-posts/reject", put(reject_post))
        .route(
            "/api/rental-posts/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
        .layer(axum_middleware::from_fn(jwt_auth))
}

#[derive(Debug, Deserialize)]
struct CreatePostPayload {
    title: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    area: Option<Decimal>,
    max_tenants: Option<i32>,
    address_detail: Option<String>,
    province_code: Option<String>,
    ward_code: Option<String>,
    amenities: Option<serde_json::Value>,
    images: Option<Vec<String>>,
}

async fn create_post(
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CreatePostPayload>,
) -> ApiResult<impl IntoResponse> {
    policy::can_create_post(user.caller())?;

    let (Some(title), Some(price), Some(area), Some(address_detail), Some(province_code), Some(ward_code)) = (
        payload.title,
        payload.price,
        payload.area,
        payload.address_detail,
        payload.province_code,
        payload.ward_code,
    ) else {
        return Err(ApiError::bad_request(
            "Thiếu thông tin bắt buộc: title, price, area, address_detail, province_code, ward_code",
        ));
    };

    let pool = DatabaseManager::pool().await?;
    let post = RentalPost::create(
        pool,
        NewPost {
            landlord_id: user.id,
            title,
            description: payload.description,
            price,
            area,
            max_tenants: payload.max_tenants,
            address_detail,
            province_code,
            ward_code,
            amenities: payload.amenities.unwrap_or_else(|| json!([])),
            images: payload.images.unwrap_or_default(),
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Tạo bài đăng thành công. Đang chờ admin duyệt.",
            "post": post,
        })),
    ))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    status: Option<PostStatus>,
    province_code: Option<String>,
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
    min_area: Option<Decimal>,
    max_area: Option<Decimal>,
    landlord_id: Option<Uuid>,
    limit: Option<i64>,
    offset: Option<i64>,
}

async fn list_posts(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    let filters = PostFilters {
        status: query.status,
        province_code: query.province_code,
        min_price: query.min_price,
        max_price: query.max_price,
        min_area: query.min_area,
        max_area: query.max_area,
        landlord_id: query.landlord_id,
        limit: query.limit,
        offset: query.offset,
    };

    let pool = DatabaseManager::pool().await?;
    let posts = RentalPost::find_all(pool, &filters, user.caller()).await?;
    let total = RentalPost::count_all(pool, &filters, user.caller()).await?;

    Ok(Json(json!({
        "message": "Lấy danh sách bài đăng thành công",
        "total": total,
        "posts": posts,
    })))
}

async fn get_post(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let pool = DatabaseManager::pool().await?;
    let listing = RentalPost::find_detail(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Không tìm thấy bài đăng"))?;

    policy::can_view_post(user.caller(), listing.post.landlord_id, listing.post.status)?;

    Ok(Json(json!({
        "message": "Lấy thông tin bài đăng thành công",
        "post": listing,
    })))
}

#[derive(Debug, Deserialize)]
struct UpdatePostPayload {
    title: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    area: Option<Decimal>,
    max_tenants: Option<i32>,
    address_detail: Option<String>,
    province_code: Option<String>,
    ward_code: Option<String>,
    amenities: Option<serde_json::Value>,
    images: Option<Vec<String>>,
}

async fn update_post(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdatePostPayload>,
) -> ApiResult<impl IntoResponse> {
    let pool = DatabaseManager::pool().await?;
    let post = RentalPost::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Không tìm thấy bài đăng"))?;

    policy::can_update_post(user.caller(), post.landlord_id)?;
    rules::ensure_content_editable(post.status)?;

    let patch = PostPatch {
        title: payload.title,
        description: payload.description,
        price: payload.price,
        area: payload.area,
        max_tenants: payload.max_tenants,
        address_detail: payload.address_detail,
        province_code: payload.province_code,
        ward_code: payload.ward_code,
        amenities: payload.amenities,
        images: payload.images,
    };
    let updated = RentalPost::update_content(pool, id, &patch).await?;

    Ok(Json(json!({
        "message": "Cập nhật bài đăng thành công",
        "post": updated,
    })))
}

async fn delete_post(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let pool = DatabaseManager::pool().await?;
    let post = RentalPost::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Không tìm thấy bài đăng"))?;

    policy::can_delete_post(user.caller(), post.landlord_id)?;
    RentalPost::delete(pool, id).await?;

    Ok(Json(json!({ "message": "Xóa bài đăng thành công" })))
}

#[derive(Debug, Deserialize)]
struct ApprovePayload {
    id: Option<Uuid>,
}

async fn approve_post(
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<ApprovePayload>,
) -> ApiResult<impl IntoResponse> {
    policy::can_approve_post(user.caller())?;

    let id = payload
        .id
        .ok_or_else(|| ApiError::bad_request("Vui lòng cung cấp id của bài đăng trong body"))?;

    let pool = DatabaseManager::pool().await?;
    let post = RentalPost::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Không tìm thấy bài đăng"))?;

    rules::ensure_approvable(post.status)?;
    let approved = RentalPost::approve(pool, id, user.id).await?;

    Ok(Json(json!({
        "message": "Duyệt bài đăng thành công",
        "post": approved,
    })))
}

#[derive(Debug, Deserialize)]
struct RejectPayload {
    id: Option<Uuid>,
    rejection_reason: Option<String>,
}

async fn reject_post(
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<RejectPayload>,
) -> ApiResult<impl IntoResponse> {
    policy::can_reject_post(user.caller())?;

    let id = payload
        .id
        .ok_or_else(|| ApiError::bad_request("Vui lòng cung cấp id của bài đăng trong body"))?;
    let reason = payload
        .rejection_reason
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Vui lòng cung cấp lý do từ chối"))?;

    let pool = DatabaseManager::pool().await?;
    let post = RentalPost::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Không tìm thấy bài đăng"))?;

    rules::ensure_rejectable(post.status)?;
    let rejected = RentalPost::reject(pool, id, user.id, &reason).await?;

    Ok(Json(json!({
        "message": "Từ chối bài đăng thành công",
        "post": rejected,
    })))
}

#[derive(Debug, Deserialize)]
struct MyPostsQuery {
    status: Option<PostStatus>,
}

async fn my_posts(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<MyPostsQuery>,
) -> ApiResult<impl IntoResponse> {
    policy::can_list_own_posts(user.caller())?;

    let pool = DatabaseManager::pool().await?;
    let posts = RentalPost::find_by_landlord(pool, user.id, query.status).await?;

    Ok(Json(json!({
        "message": "Lấy danh sách bài đăng thành công",
        "total": posts.len(),
        "posts": posts,
    })))
}
