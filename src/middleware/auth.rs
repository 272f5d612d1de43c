//! JWT authentication middleware. Every protected route group layers
//! `jwt_auth`; handlers then read the injected [`AuthUser`] extension.

use axum::{
    extract::Request,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth;
use crate::database::manager::DatabaseManager;
use crate::database::models::user::User;
use crate::domain::policy::Caller;
use crate::domain::Role;
use crate::error::ApiError;

/// The authenticated account, refreshed from the database on every request
/// so deactivated accounts lose access immediately, not at token expiry.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

impl AuthUser {
    pub fn caller(&self) -> Caller {
        Caller {
            id: self.id,
            role: self.role,
        }
    }
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

pub async fn jwt_auth(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let token = bearer_token(&request)
        .ok_or_else(|| ApiError::unauthorized("Không có quyền truy cập. Vui lòng đăng nhập."))?
        .to_string();

    let claims = auth::decode_jwt(&token)
        .map_err(|_| ApiError::unauthorized("Token không hợp lệ hoặc đã hết hạn."))?;

    let pool = DatabaseManager::pool().await?;
    let user = User::find_by_id(pool, claims.id)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| ApiError::unauthorized("Người dùng không tồn tại hoặc đã bị khóa."))?;

    request.extensions_mut().insert(AuthUser {
        id: user.id,
        email: user.email,
        full_name: user.full_name,
        role: user.role,
    });

    Ok(next.run(request).await)
}
