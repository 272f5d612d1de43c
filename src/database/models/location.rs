use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

/// Administrative division reference data, seeded by migration. Codes are
/// the national string identifiers, not surrogate keys.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Province {
    pub id: String,
    pub name: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ward {
    pub id: String,
    pub name: String,
    pub name_with_type: String,
    pub province_id: String,
}

impl Province {
    pub async fn find_all<'e>(db: impl PgExecutor<'e>) -> sqlx::Result<Vec<Province>> {
        sqlx::query_as::<_, Province>("SELECT * FROM provinces ORDER BY name")
            .fetch_all(db)
            .await
    }

    pub async fn search<'e>(db: impl PgExecutor<'e>, term: &str) -> sqlx::Result<Vec<Province>> {
        sqlx::query_as::<_, Province>(
            "SELECT * FROM provinces WHERE full_name ILIKE $1 ORDER BY name",
        )
        .bind(format!("%{term}%"))
        .fetch_all(db)
        .await
    }
}

impl Ward {
    pub async fn find_all<'e>(db: impl PgExecutor<'e>) -> sqlx::Result<Vec<Ward>> {
        sqlx::query_as::<_, Ward>("SELECT * FROM wards ORDER BY name")
            .fetch_all(db)
            .await
    }

    pub async fn find_by_province<'e>(
        db: impl PgExecutor<'e>,
        province_id: &str,
    ) -> sqlx::Result<Vec<Ward>> {
        sqlx::query_as::<_, Ward>(
            "SELECT * FROM wards WHERE province_id = $1 ORDER BY name",
        )
        .bind(province_id)
        .fetch_all(db)
        .await
    }

    pub async fn search<'e>(
        db: impl PgExecutor<'e>,
        province_id: &str,
        term: &str,
    ) -> sqlx::Result<Vec<Ward>> {
        sqlx::query_as::<_, Ward>(
            "SELECT * FROM wards
             WHERE province_id = $1 AND name_with_type ILIKE $2
             ORDER BY name",
        )
        .bind(province_id)
        .bind(format!("%{term}%"))
        .fetch_all(db)
        .await
    }
}
