//! Account flows that span several statements: registration, login,
//! admin bootstrap and the password-reset pair. Multi-statement writes run
//! inside one transaction so a failed profile insert never leaves a
//! half-created account behind.

use chrono::{Duration, Utc};
use sqlx::PgPool;

use crate::auth::{self, Claims};
use crate::config;
use crate::database::models::profile::{
    AdminProfile, LandlordProfile, LandlordProfilePatch, TenantProfile, TenantProfilePatch,
};
use crate::database::models::user::User;
use crate::domain::Role;
use crate::error::{ApiError, ApiResult};
use crate::services::mailer::Mailer;

/// Anti-enumeration response used whether or not the email exists.
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "Nếu email tồn tại, bạn sẽ nhận được một liên kết đặt lại mật khẩu.";

const BAD_CREDENTIALS: &str = "Email hoặc mật khẩu không đúng";

#[derive(Debug)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone_number: Option<String>,
}

#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    pub token: String,
}

/// Tenant/landlord self-registration. Returns the created user and a JWT so
/// the client is signed in immediately.
pub async fn register(pool: &PgPool, role: Role, reg: Registration) -> ApiResult<LoginOutcome> {
    let mut tx = pool.begin().await?;

    if User::find_by_email(&mut *tx, &reg.email).await?.is_some() {
        return Err(ApiError::conflict("Email đã tồn tại"));
    }

    let password_hash = bcrypt::hash(&reg.password, config::config().security.bcrypt_cost)?;
    let user = User::create(&mut *tx, &reg.email, &password_hash, &reg.full_name, role).await?;

    match role {
        Role::Tenant => {
            let patch = TenantProfilePatch {
                phone_number: reg.phone_number,
                ..Default::default()
            };
            TenantProfile::create(&mut *tx, user.id, &patch).await?;
        }
        Role::Landlord => {
            let patch = LandlordProfilePatch {
                phone_number: reg.phone_number,
                ..Default::default()
            };
            LandlordProfile::create(&mut *tx, user.id, &patch).await?;
        }
        Role::Admin => {
            AdminProfile::create(&mut *tx, user.id, None, reg.phone_number.as_deref()).await?;
        }
    }

    tx.commit().await?;

    let token = auth::generate_jwt(Claims::new(user.id, user.email.clone(), user.role))?;
    Ok(LoginOutcome { user, token })
}

/// Admin accounts are only created by an existing admin; no token is issued
/// for the new account.
pub async fn create_admin(
    pool: &PgPool,
    reg: Registration,
    department: Option<&str>,
) -> ApiResult<User> {
    let mut tx = pool.begin().await?;

    if User::find_by_email(&mut *tx, &reg.email).await?.is_some() {
        return Err(ApiError::conflict("Email đã tồn tại"));
    }

    let password_hash = bcrypt::hash(&reg.password, config::config().security.bcrypt_cost)?;
    let user = User::create(&mut *tx, &reg.email, &password_hash, &reg.full_name, Role::Admin).await?;
    AdminProfile::create(&mut *tx, user.id, department, reg.phone_number.as_deref()).await?;

    tx.commit().await?;
    Ok(user)
}

/// Role-portal login. Unknown emails, inactive accounts and wrong passwords
/// all produce the same 401 so the response is not a membership oracle; a
/// valid credential on the wrong portal is a 403.
pub async fn login(
    pool: &PgPool,
    email: &str,
    password: &str,
    expected_role: Role,
) -> ApiResult<LoginOutcome> {
    let record = User::find_by_email_with_password(pool, email)
        .await?
        .ok_or_else(|| ApiError::unauthorized(BAD_CREDENTIALS))?;

    if !bcrypt::verify(password, &record.password_hash)? {
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    if record.role != expected_role {
        return Err(ApiError::forbidden(format!(
            "Tài khoản này không có quyền truy cập {}.",
            expected_role
        )));
    }

    let user = User::find_by_id(pool, record.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized(BAD_CREDENTIALS))?;

    let token = auth::generate_jwt(Claims::new(user.id, user.email.clone(), user.role))?;
    Ok(LoginOutcome { user, token })
}

/// Stores a hashed single-use token and mails the raw one. If delivery
/// fails the stored token is rolled back so a stale digest cannot linger.
/// Returns whether a mail was actually sent; unknown emails are not an
/// error so the endpoint stays quiet about account existence.
pub async fn forgot_password(pool: &PgPool, mailer: &dyn Mailer, email: &str) -> ApiResult<bool> {
    let Some(user) = User::find_by_email(pool, email).await? else {
        return Ok(false);
    };

    let (raw_token, digest) = auth::generate_reset_token();
    let ttl = config::config().security.reset_token_ttl_minutes;
    let expires = Utc::now() + Duration::minutes(ttl);
    User::set_password_reset_token(pool, &user.email, &digest, expires).await?;

    if let Err(err) = mailer.send_password_reset(&user.email, &raw_token).await {
        tracing::error!("password reset mail failed for {}: {}", user.email, err);
        User::clear_password_reset_token(pool, user.id).await?;
        return Err(ApiError::internal(err.to_string()));
    }

    Ok(true)
}

pub async fn reset_password(pool: &PgPool, raw_token: &str, new_password: &str) -> ApiResult<()> {
    let digest = auth::hash_reset_token(raw_token);
    let user = User::find_by_reset_token(pool, &digest)
        .await?
        .ok_or_else(|| ApiError::bad_request("Token không hợp lệ hoặc đã hết hạn."))?;

    let password_hash = bcrypt::hash(new_password, config::config().security.bcrypt_cost)?;

    let mut tx = pool.begin().await?;
    User::update_password(&mut *tx, user.id, &password_hash).await?;
    User::clear_password_reset_token(&mut *tx, user.id).await?;
    tx.commit().await?;

    Ok(())
}
