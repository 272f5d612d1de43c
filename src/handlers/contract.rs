//! Contract endpoints. Every mutation that changes a post's availability
//! runs the contract write and the availability flip in one transaction,
//! with the flip expressed as an [`AvailabilityEffect`].

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
use crate::database::models::contract::{Contract, ContractFilters, ContractPatch, NewContract};
use crate::database::models::rental_post::RentalPost;
use crate::domain::{policy, rules, AvailabilityEffect, ContractStatus, Role};
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::middleware::{jwt_auth, AuthUser};

pub fn router() -> Router {
    Router::new()
        .route("/api/contracts", get(list_contracts).post(create_contract))
        .route("/api/contracts/my/contracts", get(my_contracts))
        .route("/api/contracts/landlord/contracts", get(landlord_contracts))
        .route("/api/contracts/:id/terminate", put(terminate_contract))
        .route(
            "/api/contracts/:id",
            get(get_contract).put(update_contract).delete(delete_contract),
        )
        .layer(axum_middleware::from_fn(jwt_auth))
}

#[derive(Debug, Deserialize)]
struct CreateContractPayload {
    post_id: Option<Uuid>,
    start_date: Option<String>,
    end_date: Option<String>,
    monthly_rent: Option<Decimal>,
    deposit_amount: Option<Decimal>,
    contract_url: Option<String>,
}

async fn create_contract(
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CreateContractPayload>,
) -> ApiResult<impl IntoResponse> {
    policy::can_create_contract(user.caller())?;

    let (Some(post_id), Some(start_raw), Some(end_raw)) =
        (payload.post_id, payload.start_date, payload.end_date)
    else {
        return Err(ApiError::bad_request(
            "Thiếu thông tin bắt buộc: post_id, start_date, end_date",
        ));
    };

    let start_date = rules::parse_date(&start_raw)?;
    let end_date = rules::parse_date(&end_raw)?;
    rules::validate_term(start_date, end_date)?;

    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    // The row lock serializes concurrent creations against the same post.
    let post = RentalPost::lock_by_id(&mut *tx, post_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bài đăng không tồn tại"))?;
    rules::ensure_contractable(post.status)?;

    if Contract::find_by_post_and_tenant(&mut *tx, post_id, user.id)
        .await?
        .is_some()
    {
        return Err(rules::DomainError::DuplicateContract.into());
    }

    let contract = Contract::create(
        &mut *tx,
        NewContract {
            post_id,
            tenant_id: user.id,
            landlord_id: post.landlord_id,
            start_date,
            end_date,
            monthly_rent: payload.monthly_rent.unwrap_or(post.price),
            deposit_amount: payload.deposit_amount.unwrap_or(Decimal::ZERO),
            contract_url: payload.contract_url,
        },
    )
    .await?;

    RentalPost::apply_availability(&mut *tx, &AvailabilityEffect::Reserve(post_id)).await?;
    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Tạo hợp đồng thành công",
            "contract": contract,
        })),
    ))
}

async fn get_contract(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let pool = DatabaseManager::pool().await?;
    let listing = Contract::find_detail(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Không tìm thấy hợp đồng"))?;

    policy::can_view_contract(
        user.caller(),
        listing.contract.tenant_id,
        listing.contract.landlord_id,
    )?;

    Ok(Json(json!({
        "message": "Lấy thông tin hợp đồng thành công",
        "contract": listing,
    })))
}

#[derive(Debug, Deserialize)]
struct ContractListQuery {
    status: Option<ContractStatus>,
    post_id: Option<Uuid>,
}

/// Admin sees all contracts; tenants and landlords get the same endpoint
/// scoped to their own.
async fn list_contracts(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ContractListQuery>,
) -> ApiResult<impl IntoResponse> {
    let filters = ContractFilters {
        status: query.status,
        post_id: query.post_id,
    };

    let pool = DatabaseManager::pool().await?;
    let contracts = match user.role {
        Role::Admin => Contract::find_all(pool, &filters).await?,
        Role::Tenant => Contract::find_by_tenant(pool, user.id, &filters).await?,
        Role::Landlord => Contract::find_by_landlord(pool, user.id, &filters).await?,
    };

    Ok(Json(json!({
        "message": "Lấy danh sách hợp đồng thành công",
        "total": contracts.len(),
        "contracts": contracts,
    })))
}

#[derive(Debug, Deserialize)]
struct OwnContractsQuery {
    status: Option<ContractStatus>,
}

async fn my_contracts(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<OwnContractsQuery>,
) -> ApiResult<impl IntoResponse> {
    policy::can_list_own_contracts(user.caller())?;

    let filters = ContractFilters {
        status: query.status,
        post_id: None,
    };
    let pool = DatabaseManager::pool().await?;
    let contracts = Contract::find_by_tenant(pool, user.id, &filters).await?;

    Ok(Json(json!({
        "message": "Lấy danh sách hợp đồng thành công",
        "total": contracts.len(),
        "contracts": contracts,
    })))
}

async fn landlord_contracts(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<OwnContractsQuery>,
) -> ApiResult<impl IntoResponse> {
    policy::can_list_landlord_contracts(user.caller())?;

    let filters = ContractFilters {
        status: query.status,
        post_id: None,
    };
    let pool = DatabaseManager::pool().await?;
    let contracts = Contract::find_by_landlord(pool, user.id, &filters).await?;

    Ok(Json(json!({
        "message": "Lấy danh sách hợp đồng thành công",
        "total": contracts.len(),
        "contracts": contracts,
    })))
}

/// Status is deliberately absent: the only status transition is the
/// terminate endpoint, which also releases the post.
#[derive(Debug, Deserialize)]
struct UpdateContractPayload {
    start_date: Option<String>,
    end_date: Option<String>,
    monthly_rent: Option<Decimal>,
    deposit_amount: Option<Decimal>,
    contract_url: Option<String>,
}

async fn update_contract(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateContractPayload>,
) -> ApiResult<impl IntoResponse> {
    let pool = DatabaseManager::pool().await?;
    let contract = Contract::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Không tìm thấy hợp đồng"))?;

    policy::can_update_contract(user.caller(), contract.tenant_id, contract.landlord_id)?;

    let start_date = payload.start_date.as_deref().map(rules::parse_date).transpose()?;
    let end_date = payload.end_date.as_deref().map(rules::parse_date).transpose()?;

    // A changed date re-validates against the other, stored or new.
    if start_date.is_some() || end_date.is_some() {
        rules::validate_term(
            start_date.unwrap_or(contract.start_date),
            end_date.unwrap_or(contract.end_date),
        )?;
    }

    let patch = ContractPatch {
        start_date,
        end_date,
        monthly_rent: payload.monthly_rent,
        deposit_amount: payload.deposit_amount,
        contract_url: payload.contract_url,
    };
    let updated = Contract::update(pool, id, &patch).await?;

    Ok(Json(json!({
        "message": "Cập nhật hợp đồng thành công",
        "contract": updated,
    })))
}

async fn delete_contract(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let pool = DatabaseManager::pool().await?;
    let contract = Contract::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Không tìm thấy hợp đồng"))?;

    policy::can_delete_contract(user.caller(), contract.tenant_id, contract.landlord_id)?;

    let mut tx = pool.begin().await?;
    Contract::delete(&mut *tx, id).await?;
    RentalPost::apply_availability(&mut *tx, &AvailabilityEffect::Release(contract.post_id)).await?;
    tx.commit().await?;

    Ok(Json(json!({ "message": "Xóa hợp đồng thành công" })))
}

async fn terminate_contract(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let pool = DatabaseManager::pool().await?;
    let contract = Contract::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Không tìm thấy hợp đồng"))?;

    policy::can_terminate_contract(user.caller(), contract.landlord_id)?;
    rules::ensure_terminable(contract.status)?;

    let mut tx = pool.begin().await?;
    let terminated = Contract::update_status(&mut *tx, id, ContractStatus::Terminated).await?;
    RentalPost::apply_availability(&mut *tx, &AvailabilityEffect::Release(contract.post_id)).await?;
    tx.commit().await?;

    Ok(Json(json!({
        "message": "Kết thúc hợp đồng thành công",
        "contract": terminated,
    })))
}
