use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::models::{convert, Contact};

/// Errors surfaced by a contact store. Backend I/O failures propagate
/// unmodified; callers decide how to present them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("column conversion failed: {0}")]
    Convert(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// CRUD contract for contact persistence, keyed by the auto-assigned id.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Contact>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Contact>, StoreError>;

    /// Inserts when `id` is absent, assigning a fresh identifier;
    /// otherwise overwrites (or inserts) the row with that identifier.
    async fn save(&self, contact: Contact) -> Result<Contact, StoreError>;

    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError>;

    async fn delete_all(&self) -> Result<(), StoreError>;

    /// Connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

type ContactRow = (i64, String, String, String, String);

/// Postgres-backed store. The structured attributes live in serialized
/// text columns; `convert` owns the column encoding.
pub struct PgContactStore {
    pool: PgPool,
}

impl PgContactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the contact table when it does not exist yet, so a fresh
    /// database is usable without out-of-band migrations.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS contact (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                address TEXT NOT NULL,
                phone TEXT NOT NULL,
                email TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn from_row(row: ContactRow) -> Result<Contact, StoreError> {
        let (id, name, address, phone, email) = row;
        Ok(Contact {
            id: Some(id),
            name: convert::name_from_column(&name)?,
            address: convert::address_from_column(&address)?,
            phone: convert::phones_from_column(&phone)?,
            email,
        })
    }
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn find_all(&self) -> Result<Vec<Contact>, StoreError> {
        let rows: Vec<ContactRow> = sqlx::query_as(
            "SELECT id, name, address, phone, email FROM contact ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::from_row).collect()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Contact>, StoreError> {
        let row: Option<ContactRow> = sqlx::query_as(
            "SELECT id, name, address, phone, email FROM contact WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::from_row).transpose()
    }

    async fn save(&self, contact: Contact) -> Result<Contact, StoreError> {
        let name = convert::name_to_column(&contact.name)?;
        let address = convert::address_to_column(&contact.address)?;
        let phone = convert::phones_to_column(&contact.phone)?;

        match contact.id {
            None => {
                let (id,): (i64,) = sqlx::query_as(
                    "INSERT INTO contact (name, address, phone, email)
                     VALUES ($1, $2, $3, $4)
                     RETURNING id",
                )
                .bind(&name)
                .bind(&address)
                .bind(&phone)
                .bind(&contact.email)
                .fetch_one(&self.pool)
                .await?;

                Ok(Contact { id: Some(id), ..contact })
            }
            Some(id) => {
                sqlx::query(
                    "INSERT INTO contact (id, name, address, phone, email)
                     VALUES ($1, $2, $3, $4, $5)
                     ON CONFLICT (id) DO UPDATE SET
                        name = EXCLUDED.name,
                        address = EXCLUDED.address,
                        phone = EXCLUDED.phone,
                        email = EXCLUDED.email",
                )
                .bind(id)
                .bind(&name)
                .bind(&address)
                .bind(&phone)
                .bind(&contact.email)
                .execute(&self.pool)
                .await?;

                Ok(contact)
            }
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM contact WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM contact").execute(&self.pool).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
