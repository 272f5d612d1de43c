use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::policy::Caller;
use crate::domain::{AvailabilityEffect, PostStatus, Role};

use super::profile::TenantProfile;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RentalPost {
    pub id: Uuid,
    pub landlord_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub area: Decimal,
    pub max_tenants: Option<i32>,
    pub address_detail: String,
    pub province_code: String,
    pub ward_code: String,
    pub amenities: serde_json::Value,
    pub images: Vec<String>,
    pub status: PostStatus,
    pub is_available: bool,
    pub approved_by: Option<Uuid>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post row enriched with display names for list/detail responses.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RentalPostListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub post: RentalPost,
    pub landlord_name: String,
    pub province_name: Option<String>,
    pub ward_name: Option<String>,
}

/// New-post payload after handler validation.
#[derive(Debug)]
pub struct NewPost {
    pub landlord_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub area: Decimal,
    pub max_tenants: Option<i32>,
    pub address_detail: String,
    pub province_code: String,
    pub ward_code: String,
    pub amenities: serde_json::Value,
    pub images: Vec<String>,
}

/// Patch for content fields; absent fields keep their stored value.
#[derive(Debug, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub area: Option<Decimal>,
    pub max_tenants: Option<i32>,
    pub address_detail: Option<String>,
    pub province_code: Option<String>,
    pub ward_code: Option<String>,
    pub amenities: Option<serde_json::Value>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Default)]
pub struct PostFilters {
    pub status: Option<PostStatus>,
    pub province_code: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_area: Option<Decimal>,
    pub max_area: Option<Decimal>,
    pub landlord_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

const LISTING_SELECT: &str = "SELECT rp.*, u.full_name AS landlord_name, \
     p.full_name AS province_name, w.name_with_type AS ward_name \
     FROM rental_posts rp \
     JOIN users u ON rp.landlord_id = u.id \
     LEFT JOIN provinces p ON rp.province_code = p.id \
     LEFT JOIN wards w ON rp.ward_code = w.id";

/// Role-scoped read model: admins see everything, landlords their own posts
/// plus everyone's approved+available ones, tenants only approved+available.
fn push_scope(qb: &mut QueryBuilder<Postgres>, caller: Caller) {
    match caller.role {
        Role::Admin => {}
        Role::Landlord => {
            qb.push(" AND (rp.landlord_id = ");
            qb.push_bind(caller.id);
            qb.push(" OR (rp.status = 'approved' AND rp.is_available = true))");
        }
        Role::Tenant => {
            qb.push(" AND rp.status = 'approved' AND rp.is_available = true");
        }
    }
}

fn push_filters(qb: &mut QueryBuilder<Postgres>, filters: &PostFilters) {
    if let Some(status) = filters.status {
        qb.push(" AND rp.status = ");
        qb.push_bind(status);
    }
    if let Some(province) = &filters.province_code {
        qb.push(" AND rp.province_code = ");
        qb.push_bind(province.clone());
    }
    if let Some(min_price) = filters.min_price {
        qb.push(" AND rp.price >= ");
        qb.push_bind(min_price);
    }
    if let Some(max_price) = filters.max_price {
        qb.push(" AND rp.price <= ");
        qb.push_bind(max_price);
    }
    if let Some(min_area) = filters.min_area {
        qb.push(" AND rp.area >= ");
        qb.push_bind(min_area);
    }
    if let Some(max_area) = filters.max_area {
        qb.push(" AND rp.area <= ");
        qb.push_bind(max_area);
    }
    if let Some(landlord_id) = filters.landlord_id {
        qb.push(" AND rp.landlord_id = ");
        qb.push_bind(landlord_id);
    }
}

impl RentalPost {
    pub async fn create<'e>(db: impl PgExecutor<'e>, new_post: NewPost) -> sqlx::Result<RentalPost> {
        sqlx::query_as::<_, RentalPost>(
            "INSERT INTO rental_posts
                 (landlord_id, title, description, price, area, max_tenants,
                  address_detail, province_code, ward_code, amenities, images, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'pending')
             RETURNING *",
        )
        .bind(new_post.landlord_id)
        .bind(&new_post.title)
        .bind(&new_post.description)
        .bind(new_post.price)
        .bind(new_post.area)
        .bind(new_post.max_tenants)
        .bind(&new_post.address_detail)
        .bind(&new_post.province_code)
        .bind(&new_post.ward_code)
        .bind(&new_post.amenities)
        .bind(&new_post.images)
        .fetch_one(db)
        .await
    }

    pub async fn find_by_id<'e>(db: impl PgExecutor<'e>, id: Uuid) -> sqlx::Result<Option<RentalPost>> {
        sqlx::query_as::<_, RentalPost>("SELECT * FROM rental_posts WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Row-locked fetch used by contract creation so availability flips
    /// cannot race between two requests targeting the same post.
    pub async fn lock_by_id<'e>(db: impl PgExecutor<'e>, id: Uuid) -> sqlx::Result<Option<RentalPost>> {
        sqlx::query_as::<_, RentalPost>("SELECT * FROM rental_posts WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn find_detail<'e>(
        db: impl PgExecutor<'e>,
        id: Uuid,
    ) -> sqlx::Result<Option<RentalPostListing>> {
        sqlx::query_as::<_, RentalPostListing>(&format!("{LISTING_SELECT} WHERE rp.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn update_content<'e>(
        db: impl PgExecutor<'e>,
        id: Uuid,
        patch: &PostPatch,
    ) -> sqlx::Result<RentalPost> {
        sqlx::query_as::<_, RentalPost>(
            "UPDATE rental_posts SET
                 title = COALESCE($2, title),
                 description = COALESCE($3, description),
                 price = COALESCE($4, price),
                 area = COALESCE($5, area),
                 max_tenants = COALESCE($6, max_tenants),
                 address_detail = COALESCE($7, address_detail),
                 province_code = COALESCE($8, province_code),
                 ward_code = COALESCE($9, ward_code),
                 amenities = COALESCE($10, amenities),
                 images = COALESCE($11, images),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(patch.price)
        .bind(patch.area)
        .bind(patch.max_tenants)
        .bind(&patch.address_detail)
        .bind(&patch.province_code)
        .bind(&patch.ward_code)
        .bind(&patch.amenities)
        .bind(&patch.images)
        .fetch_one(db)
        .await
    }

    /// Approving clears any earlier rejection reason.
    pub async fn approve<'e>(db: impl PgExecutor<'e>, id: Uuid, admin_id: Uuid) -> sqlx::Result<RentalPost> {
        sqlx::query_as::<_, RentalPost>(
            "UPDATE rental_posts
             SET status = 'approved', approved_by = $2, rejection_reason = NULL, updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(admin_id)
        .fetch_one(db)
        .await
    }

    pub async fn reject<'e>(
        db: impl PgExecutor<'e>,
        id: Uuid,
        admin_id: Uuid,
        rejection_reason: &str,
    ) -> sqlx::Result<RentalPost> {
        sqlx::query_as::<_, RentalPost>(
            "UPDATE rental_posts
             SET status = 'rejected', approved_by = $2, rejection_reason = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(admin_id)
        .bind(rejection_reason)
        .fetch_one(db)
        .await
    }

    pub async fn delete<'e>(db: impl PgExecutor<'e>, id: Uuid) -> sqlx::Result<()> {
        sqlx::query("DELETE FROM rental_posts WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// The single site that mutates `is_available`; called inside the same
    /// transaction as the contract change that emitted the effect.
    pub async fn apply_availability<'e>(
        db: impl PgExecutor<'e>,
        effect: &AvailabilityEffect,
    ) -> sqlx::Result<()> {
        sqlx::query("UPDATE rental_posts SET is_available = $2, updated_at = NOW() WHERE id = $1")
            .bind(effect.post_id())
            .bind(effect.available())
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn find_all<'e>(
        db: impl PgExecutor<'e>,
        filters: &PostFilters,
        caller: Caller,
    ) -> sqlx::Result<Vec<RentalPostListing>> {
        let mut qb = QueryBuilder::<Postgres>::new(LISTING_SELECT);
        qb.push(" WHERE 1=1");
        push_filters(&mut qb, filters);
        push_scope(&mut qb, caller);
        qb.push(" ORDER BY rp.created_at DESC");
        if let Some(limit) = filters.limit {
            qb.push(" LIMIT ");
            qb.push_bind(limit);
        }
        if let Some(offset) = filters.offset {
            qb.push(" OFFSET ");
            qb.push_bind(offset);
        }
        qb.build_query_as::<RentalPostListing>().fetch_all(db).await
    }

    pub async fn count_all<'e>(
        db: impl PgExecutor<'e>,
        filters: &PostFilters,
        caller: Caller,
    ) -> sqlx::Result<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM rental_posts rp WHERE 1=1");
        push_filters(&mut qb, filters);
        push_scope(&mut qb, caller);
        qb.build_query_scalar::<i64>().fetch_one(db).await
    }

    pub async fn find_by_landlord<'e>(
        db: impl PgExecutor<'e>,
        landlord_id: Uuid,
        status: Option<PostStatus>,
    ) -> sqlx::Result<Vec<RentalPostListing>> {
        let mut qb = QueryBuilder::<Postgres>::new(LISTING_SELECT);
        qb.push(" WHERE rp.landlord_id = ");
        qb.push_bind(landlord_id);
        if let Some(status) = status {
            qb.push(" AND rp.status = ");
            qb.push_bind(status);
        }
        qb.push(" ORDER BY rp.created_at DESC");
        qb.build_query_as::<RentalPostListing>().fetch_all(db).await
    }

    /// Recommendation read model: approved+available posts inside the
    /// tenant's budget, filtered to their target province when set, ward
    /// matches ranked first. The computed rank orders rows but is not part
    /// of `RentalPostListing`, so it never reaches the client.
    pub async fn recommended_for<'e>(
        db: impl PgExecutor<'e>,
        profile: &TenantProfile,
    ) -> sqlx::Result<Vec<RentalPostListing>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT rp.*, u.full_name AS landlord_name, \
             p.full_name AS province_name, w.name_with_type AS ward_name, ",
        );
        match (&profile.target_ward_code, &profile.target_province_code) {
            (None, None) => {
                qb.push("3 AS priority_rank");
            }
            (ward, province) => {
                qb.push("CASE");
                if let Some(ward) = ward {
                    qb.push(" WHEN rp.ward_code = ");
                    qb.push_bind(ward.clone());
                    qb.push(" THEN 1");
                }
                if let Some(province) = province {
                    qb.push(" WHEN rp.province_code = ");
                    qb.push_bind(province.clone());
                    qb.push(" THEN 2");
                }
                qb.push(" ELSE 3 END AS priority_rank");
            }
        }
        qb.push(
            " FROM rental_posts rp \
             JOIN users u ON rp.landlord_id = u.id \
             LEFT JOIN provinces p ON rp.province_code = p.id \
             LEFT JOIN wards w ON rp.ward_code = w.id \
             WHERE rp.status = 'approved' AND rp.is_available = true",
        );
        if let Some(budget_min) = profile.budget_min {
            qb.push(" AND rp.price >= ");
            qb.push_bind(budget_min);
        }
        if let Some(budget_max) = profile.budget_max {
            qb.push(" AND rp.price <= ");
            qb.push_bind(budget_max);
        }
        if let Some(province) = &profile.target_province_code {
            qb.push(" AND rp.province_code = ");
            qb.push_bind(province.clone());
        }
        qb.push(" ORDER BY priority_rank, rp.created_at DESC");
        qb.build_query_as::<RentalPostListing>().fetch_all(db).await
    }
}
