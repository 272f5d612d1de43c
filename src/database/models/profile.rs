use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

/// Tenant search preferences drive the recommendation query; every field
/// apart from the owning user id is optional.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TenantProfile {
    pub user_id: Uuid,
    pub phone_number: Option<String>,
    pub target_province_code: Option<String>,
    pub target_ward_code: Option<String>,
    pub budget_min: Option<Decimal>,
    pub budget_max: Option<Decimal>,
    pub gender: Option<String>,
    pub dob: Option<NaiveDate>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LandlordProfile {
    pub user_id: Uuid,
    pub phone_number: Option<String>,
    pub identity_card: Option<String>,
    pub address_detail: Option<String>,
    /// System-maintained; profile updates never touch it.
    pub reputation_score: i32,
    pub gender: Option<String>,
    pub dob: Option<NaiveDate>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdminProfile {
    pub user_id: Uuid,
    pub department: Option<String>,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Patch payload for tenant profile updates. Absent fields keep their
/// stored value.
#[derive(Debug, Default)]
pub struct TenantProfilePatch {
    pub phone_number: Option<String>,
    pub target_province_code: Option<String>,
    pub target_ward_code: Option<String>,
    pub budget_min: Option<Decimal>,
    pub budget_max: Option<Decimal>,
    pub gender: Option<String>,
    pub dob: Option<NaiveDate>,
    pub bio: Option<String>,
}

#[derive(Debug, Default)]
pub struct LandlordProfilePatch {
    pub phone_number: Option<String>,
    pub identity_card: Option<String>,
    pub address_detail: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<NaiveDate>,
    pub bio: Option<String>,
}

impl TenantProfile {
    pub async fn create<'e>(
        db: impl PgExecutor<'e>,
        user_id: Uuid,
        patch: &TenantProfilePatch,
    ) -> sqlx::Result<TenantProfile> {
        sqlx::query_as::<_, TenantProfile>(
            "INSERT INTO tenants
                 (user_id, phone_number, target_province_code, target_ward_code,
                  budget_min, budget_max, gender, dob, bio)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *",
        )
        .bind(user_id)
        .bind(&patch.phone_number)
        .bind(&patch.target_province_code)
        .bind(&patch.target_ward_code)
        .bind(patch.budget_min)
        .bind(patch.budget_max)
        .bind(&patch.gender)
        .bind(patch.dob)
        .bind(&patch.bio)
        .fetch_one(db)
        .await
    }

    pub async fn find_by_user_id<'e>(
        db: impl PgExecutor<'e>,
        user_id: Uuid,
    ) -> sqlx::Result<Option<TenantProfile>> {
        sqlx::query_as::<_, TenantProfile>("SELECT * FROM tenants WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await
    }

    pub async fn update<'e>(
        db: impl PgExecutor<'e>,
        user_id: Uuid,
        patch: &TenantProfilePatch,
    ) -> sqlx::Result<Option<TenantProfile>> {
        sqlx::query_as::<_, TenantProfile>(
            "UPDATE tenants SET
                 phone_number = COALESCE($2, phone_number),
                 target_province_code = COALESCE($3, target_province_code),
                 target_ward_code = COALESCE($4, target_ward_code),
                 budget_min = COALESCE($5, budget_min),
                 budget_max = COALESCE($6, budget_max),
                 gender = COALESCE($7, gender),
                 dob = COALESCE($8, dob),
                 bio = COALESCE($9, bio),
                 updated_at = NOW()
             WHERE user_id = $1
             RETURNING *",
        )
        .bind(user_id)
        .bind(&patch.phone_number)
        .bind(&patch.target_province_code)
        .bind(&patch.target_ward_code)
        .bind(patch.budget_min)
        .bind(patch.budget_max)
        .bind(&patch.gender)
        .bind(patch.dob)
        .bind(&patch.bio)
        .fetch_optional(db)
        .await
    }
}

impl LandlordProfile {
    pub async fn create<'e>(
        db: impl PgExecutor<'e>,
        user_id: Uuid,
        patch: &LandlordProfilePatch,
    ) -> sqlx::Result<LandlordProfile> {
        sqlx::query_as::<_, LandlordProfile>(
            "INSERT INTO landlords
                 (user_id, phone_number, identity_card, address_detail, gender, dob, bio)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(user_id)
        .bind(&patch.phone_number)
        .bind(&patch.identity_card)
        .bind(&patch.address_detail)
        .bind(&patch.gender)
        .bind(patch.dob)
        .bind(&patch.bio)
        .fetch_one(db)
        .await
    }

    pub async fn find_by_user_id<'e>(
        db: impl PgExecutor<'e>,
        user_id: Uuid,
    ) -> sqlx::Result<Option<LandlordProfile>> {
        sqlx::query_as::<_, LandlordProfile>("SELECT * FROM landlords WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await
    }

    pub async fn update<'e>(
        db: impl PgExecutor<'e>,
        user_id: Uuid,
        patch: &LandlordProfilePatch,
    ) -> sqlx::Result<Option<LandlordProfile>> {
        sqlx::query_as::<_, LandlordProfile>(
            "UPDATE landlords SET
                 phone_number = COALESCE($2, phone_number),
                 identity_card = COALESCE($3, identity_card),
                 address_detail = COALESCE($4, address_detail),
                 gender = COALESCE($5, gender),
                 dob = COALESCE($6, dob),
                 bio = COALESCE($7, bio),
                 updated_at = NOW()
             WHERE user_id = $1
             RETURNING *",
        )
        .bind(user_id)
        .bind(&patch.phone_number)
        .bind(&patch.identity_card)
        .bind(&patch.address_detail)
        .bind(&patch.gender)
        .bind(patch.dob)
        .bind(&patch.bio)
        .fetch_optional(db)
        .await
    }
}

impl AdminProfile {
    pub async fn create<'e>(
        db: impl PgExecutor<'e>,
        user_id: Uuid,
        department: Option<&str>,
        phone_number: Option<&str>,
    ) -> sqlx::Result<AdminProfile> {
        sqlx::query_as::<_, AdminProfile>(
            "INSERT INTO admins (user_id, department, phone_number)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(user_id)
        .bind(department)
        .bind(phone_number)
        .fetch_one(db)
        .await
    }

    pub async fn find_by_user_id<'e>(
        db: impl PgExecutor<'e>,
        user_id: Uuid,
    ) -> sqlx::Result<Option<AdminProfile>> {
        sqlx::query_as::<_, AdminProfile>("SELECT * FROM admins WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await
    }

    pub async fn update<'e>(
        db: impl PgExecutor<'e>,
        user_id: Uuid,
        department: Option<&str>,
        phone_number: Option<&str>,
    ) -> sqlx::Result<Option<AdminProfile>> {
        sqlx::query_as::<_, AdminProfile>(
            "UPDATE admins SET
                 department = COALESCE($2, department),
                 phone_number = COALESCE($3, phone_number),
                 updated_at = NOW()
             WHERE user_id = $1
             RETURNING *",
        )
        .bind(user_id)
        .bind(department)
        .bind(phone_number)
        .fetch_optional(db)
        .await
    }
}
