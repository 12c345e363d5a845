//! User repository for database operations.
//!
//! Accounts, credentials, and the interaction logs (browsing history,
//! purchase history, wishlist) the recommendation filter reads.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use clementine_core::{Email, ProductId, UserId, UserRole};

use super::RepositoryError;
use crate::models::user::{Address, BrowsingEvent, Preferences, PurchaseRecord};
use crate::models::User;

/// Column list matching [`UserRow`].
const USER_COLUMNS: &str =
    "id, name, email, role, avatar, phone, address, preferences, is_active, created_at, updated_at";

/// Database row for a user; converted to [`User`] explicitly.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    role: String,
    avatar: Option<String>,
    phone: Option<String>,
    address: Option<serde_json::Value>,
    preferences: Option<serde_json::Value>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_domain(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = self.role.parse::<UserRole>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;
        let address: Option<Address> = self
            .address
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid address in database: {e}"))
            })?;
        let preferences: Preferences = self
            .preferences
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid preferences in database: {e}"))
            })?
            .unwrap_or_default();

        Ok(User {
            id: UserId::new(self.id),
            name: self.name,
            email,
            role,
            avatar: self.avatar,
            phone: self.phone,
            address,
            preferences,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user with name, email, and pre-hashed credential.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(name)
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_domain()
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id.as_i32())
                .fetch_optional(self.pool)
                .await?;

        row.map(UserRow::into_domain).transpose()
    }

    /// Get a user and their credential hash by email, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct UserHashRow {
            #[sqlx(flatten)]
            user: UserRow,
            password_hash: String,
        }

        let row: Option<UserHashRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((r.user.into_domain()?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// All users, for the admin listing. Credential hashes never leave the
    /// query.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
                .fetch_all(self.pool)
                .await?;

        rows.into_iter().map(UserRow::into_domain).collect()
    }

    /// Replace a user's preferences. Returns `false` if the user is unknown.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails, or
    /// `RepositoryError::DataCorruption` if the preferences cannot be
    /// serialized.
    pub async fn set_preferences(
        &self,
        id: UserId,
        preferences: &Preferences,
    ) -> Result<bool, RepositoryError> {
        let value = serde_json::to_value(preferences).map_err(|e| {
            RepositoryError::DataCorruption(format!("cannot serialize preferences: {e}"))
        })?;

        let result =
            sqlx::query("UPDATE users SET preferences = $2, updated_at = now() WHERE id = $1")
                .bind(id.as_i32())
                .bind(value)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Append a product view to the browsing log.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add_browsing_event(
        &self,
        id: UserId,
        product: ProductId,
        time_spent: Option<i32>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO browsing_history (user_id, product_id, time_spent_secs) \
             VALUES ($1, $2, $3)",
        )
        .bind(id.as_i32())
        .bind(product.as_i32())
        .bind(time_spent)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// The user's browsing log, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn browsing_history(
        &self,
        id: UserId,
    ) -> Result<Vec<BrowsingEvent>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            product_id: i32,
            viewed_at: DateTime<Utc>,
            time_spent_secs: Option<i32>,
        }

        let rows: Vec<Row> = sqlx::query_as(
            "SELECT product_id, viewed_at, time_spent_secs FROM browsing_history \
             WHERE user_id = $1 ORDER BY viewed_at DESC",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| BrowsingEvent {
                product: ProductId::new(r.product_id),
                viewed_at: r.viewed_at,
                time_spent: r.time_spent_secs,
            })
            .collect())
    }

    /// The user's purchase log, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn purchase_history(
        &self,
        id: UserId,
    ) -> Result<Vec<PurchaseRecord>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            product_id: i32,
            quantity: i32,
            purchased_at: DateTime<Utc>,
        }

        let rows: Vec<Row> = sqlx::query_as(
            "SELECT product_id, quantity, purchased_at FROM purchase_history \
             WHERE user_id = $1 ORDER BY purchased_at DESC",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| PurchaseRecord {
                product: ProductId::new(r.product_id),
                quantity: r.quantity,
                purchase_date: r.purchased_at,
            })
            .collect())
    }

    /// Products saved to the user's wishlist, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn wishlist_ids(&self, id: UserId) -> Result<Vec<ProductId>, RepositoryError> {
        let ids: Vec<i32> = sqlx::query_scalar(
            "SELECT product_id FROM wishlist WHERE user_id = $1 ORDER BY added_at",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(ids.into_iter().map(ProductId::new).collect())
    }
}
