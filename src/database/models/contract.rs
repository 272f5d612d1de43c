use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::ContractStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Contract {
    pub id: Uuid,
    pub post_id: Uuid,
    pub tenant_id: Uuid,
    pub landlord_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_rent: Decimal,
    pub deposit_amount: Decimal,
    pub contract_url: Option<String>,
    pub status: ContractStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contract row enriched with party and post names for list/detail views.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ContractListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub contract: Contract,
    pub post_title: String,
    pub tenant_name: String,
    pub landlord_name: String,
}

#[derive(Debug)]
pub struct NewContract {
    pub post_id: Uuid,
    pub tenant_id: Uuid,
    pub landlord_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_rent: Decimal,
    pub deposit_amount: Decimal,
    pub contract_url: Option<String>,
}

/// Patch for contract updates. Absent fields keep their stored value.
#[derive(Debug, Default)]
pub struct ContractPatch {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub monthly_rent: Option<Decimal>,
    pub deposit_amount: Option<Decimal>,
    pub contract_url: Option<String>,
}

#[derive(Debug, Default)]
pub struct ContractFilters {
    pub status: Option<ContractStatus>,
    pub post_id: Option<Uuid>,
}

const LISTING_SELECT: &str = "SELECT c.*, rp.title AS post_title, \
     t.full_name AS tenant_name, l.full_name AS landlord_name \
     FROM contracts c \
     JOIN rental_posts rp ON c.post_id = rp.id \
     JOIN users t ON c.tenant_id = t.id \
     JOIN users l ON c.landlord_id = l.id";

fn push_filters(qb: &mut QueryBuilder<Postgres>, filters: &ContractFilters) {
    if let Some(status) = filters.status {
        qb.push(" AND c.status = ");
        qb.push_bind(status);
    }
    if let Some(post_id) = filters.post_id {
        qb.push(" AND c.post_id = ");
        qb.push_bind(post_id);
    }
}

impl Contract {
    pub async fn create<'e>(db: impl PgExecutor<'e>, new: NewContract) -> sqlx::Result<Contract> {
        sqlx::query_as::<_, Contract>(
            "INSERT INTO contracts
                 (post_id, tenant_id, landlord_id, start_date, end_date,
                  monthly_rent, deposit_amount, contract_url, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'active')
             RETURNING *",
        )
        .bind(new.post_id)
        .bind(new.tenant_id)
        .bind(new.landlord_id)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.monthly_rent)
        .bind(new.deposit_amount)
        .bind(&new.contract_url)
        .fetch_one(db)
        .await
    }

    pub async fn find_by_id<'e>(db: impl PgExecutor<'e>, id: Uuid) -> sqlx::Result<Option<Contract>> {
        sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn find_detail<'e>(
        db: impl PgExecutor<'e>,
        id: Uuid,
    ) -> sqlx::Result<Option<ContractListing>> {
        sqlx::query_as::<_, ContractListing>(&format!("{LISTING_SELECT} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Duplicate guard for contract creation: at most one contract per
    /// (post, tenant) pair, terminated history included.
    pub async fn find_by_post_and_tenant<'e>(
        db: impl PgExecutor<'e>,
        post_id: Uuid,
        tenant_id: Uuid,
    ) -> sqlx::Result<Option<Contract>> {
        sqlx::query_as::<_, Contract>(
            "SELECT * FROM contracts WHERE post_id = $1 AND tenant_id = $2",
        )
        .bind(post_id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await
    }

    pub async fn update<'e>(
        db: impl PgExecutor<'e>,
        id: Uuid,
        patch: &ContractPatch,
    ) -> sqlx::Result<Contract> {
        sqlx::query_as::<_, Contract>(
            "UPDATE contracts SET
                 start_date = COALESCE($2, start_date),
                 end_date = COALESCE($3, end_date),
                 monthly_rent = COALESCE($4, monthly_rent),
                 deposit_amount = COALESCE($5, deposit_amount),
                 contract_url = COALESCE($6, contract_url),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(patch.start_date)
        .bind(patch.end_date)
        .bind(patch.monthly_rent)
        .bind(patch.deposit_amount)
        .bind(&patch.contract_url)
        .fetch_one(db)
        .await
    }

    pub async fn update_status<'e>(
        db: impl PgExecutor<'e>,
        id: Uuid,
        status: ContractStatus,
    ) -> sqlx::Result<Contract> {
        sqlx::query_as::<_, Contract>(
            "UPDATE contracts SET status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(db)
        .await
    }

    pub async fn delete<'e>(db: impl PgExecutor<'e>, id: Uuid) -> sqlx::Result<()> {
        sqlx::query("DELETE FROM contracts WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn find_by_tenant<'e>(
        db: impl PgExecutor<'e>,
        tenant_id: Uuid,
        filters: &ContractFilters,
    ) -> sqlx::Result<Vec<ContractListing>> {
        let mut qb = QueryBuilder::<Postgres>::new(LISTING_SELECT);
        qb.push(" WHERE c.tenant_id = ");
        qb.push_bind(tenant_id);
        push_filters(&mut qb, filters);
        qb.push(" ORDER BY c.created_at DESC");
        qb.build_query_as::<ContractListing>().fetch_all(db).await
    }

    pub async fn find_by_landlord<'e>(
        db: impl PgExecutor<'e>,
        landlord_id: Uuid,
        filters: &ContractFilters,
    ) -> sqlx::Result<Vec<ContractListing>> {
        let mut qb = QueryBuilder::<Postgres>::new(LISTING_SELECT);
        qb.push(" WHERE c.landlord_id = ");
        qb.push_bind(landlord_id);
        push_filters(&mut qb, filters);
        qb.push(" ORDER BY c.created_at DESC");
        qb.build_query_as::<ContractListing>().fetch_all(db).await
    }

    pub async fn find_all<'e>(
        db: impl PgExecutor<'e>,
        filters: &ContractFilters,
    ) -> sqlx::Result<Vec<ContractListing>> {
        let mut qb = QueryBuilder::<Postgres>::new(LISTING_SELECT);
        qb.push(" WHERE 1=1");
        push_filters(&mut qb, filters);
        qb.push(" ORDER BY c.created_at DESC");
        qb.build_query_as::<ContractListing>().fetch_all(db).await
    }
}
