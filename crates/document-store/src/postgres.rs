use std::future::Future;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use common::{CartLine, Money, Order, OrderId, Product, ProductId, User, UserId};
use serde::de::DeserializeOwned;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    Result, StoreError,
    store::{CatalogStore, StoreOperation, UserStore},
};

/// SQLSTATE for `numeric_value_out_of_range`.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// PostgreSQL-backed document store.
///
/// Each user and product is a JSONB document. Every mutating method is a
/// single `UPDATE` statement, so it is atomic per document and nothing more.
#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    /// Creates a new PostgreSQL document store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn decode<T: DeserializeOwned>(row: &PgRow, column: &str) -> Result<T> {
        let value: serde_json::Value = row.try_get(column)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Decodes an embedded array, treating a missing field as empty.
    fn decode_array<T: DeserializeOwned>(value: Option<serde_json::Value>) -> Result<Vec<T>> {
        match value {
            None | Some(serde_json::Value::Null) => Ok(Vec::new()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }

    async fn timed<T, F>(operation: StoreOperation, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let start = Instant::now();
        let result = fut.await;
        metrics::histogram!("store_operation_duration_seconds", "operation" => operation.as_str())
            .record(start.elapsed().as_secs_f64());
        if let Err(ref e) = result {
            tracing::debug!(%operation, error = %e, "store operation failed");
        }
        result
    }

    /// Maps a zero-row update to the right not-found error.
    fn require_updated(rows_affected: u64, user_id: UserId) -> Result<()> {
        if rows_affected == 0 {
            return Err(StoreError::UserNotFound(user_id));
        }
        Ok(())
    }

    async fn exists(&self, user_id: UserId) -> Result<bool> {
        let found: Option<i32> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = $1")
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}

#[async_trait]
impl CatalogStore for PostgresDocumentStore {
    async fn insert_product(&self, product: Product) -> Result<()> {
        Self::timed(StoreOperation::InsertProduct, async {
            let document = serde_json::to_value(&product)?;
            sqlx::query("INSERT INTO products (id, product_name, document) VALUES ($1, $2, $3)")
                .bind(product.product_id.as_uuid())
                .bind(&product.product_name)
                .bind(document)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    if let sqlx::Error::Database(ref db_err) = e
                        && db_err.is_unique_violation()
                    {
                        return StoreError::Conflict(format!(
                            "product {} already exists",
                            product.product_id
                        ));
                    }
                    StoreError::Database(e)
                })?;
            Ok(())
        })
        .await
    }

    async fn find_product(&self, product_id: ProductId) -> Result<Option<Product>> {
        Self::timed(StoreOperation::FindProduct, async {
            let row = sqlx::query("SELECT document FROM products WHERE id = $1")
                .bind(product_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;
            row.map(|row| Self::decode(&row, "document")).transpose()
        })
        .await
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        Self::timed(StoreOperation::ListProducts, async {
            let rows = sqlx::query("SELECT document FROM products ORDER BY seq ASC")
                .fetch_all(&self.pool)
                .await?;
            rows.iter().map(|row| Self::decode(row, "document")).collect()
        })
        .await
    }

    async fn search_products_by_name(&self, pattern: &str) -> Result<Vec<Product>> {
        Self::timed(StoreOperation::SearchProducts, async {
            // strpos keeps the match literal and case-sensitive.
            let rows = sqlx::query(
                "SELECT document FROM products WHERE strpos(product_name, $1) > 0 ORDER BY seq ASC",
            )
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;
            rows.iter().map(|row| Self::decode(row, "document")).collect()
        })
        .await
    }
}

#[async_trait]
impl UserStore for PostgresDocumentStore {
    async fn insert_user(&self, user: User) -> Result<()> {
        Self::timed(StoreOperation::InsertUser, async {
            let document = serde_json::to_value(&user)?;
            sqlx::query("INSERT INTO users (id, email, phone, document) VALUES ($1, $2, $3, $4)")
                .bind(user.user_id.as_uuid())
                .bind(user.email.as_str())
                .bind(&user.phone)
                .bind(document)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    if let sqlx::Error::Database(ref db_err) = e
                        && db_err.is_unique_violation()
                    {
                        let field = match db_err.constraint() {
                            Some("unique_user_email") => "email",
                            Some("unique_user_phone") => "phone",
                            _ => "id",
                        };
                        return StoreError::Conflict(format!("{field} already registered"));
                    }
                    StoreError::Database(e)
                })?;
            Ok(())
        })
        .await
    }

    async fn find_user(&self, user_id: UserId) -> Result<Option<User>> {
        Self::timed(StoreOperation::FindUser, async {
            let row = sqlx::query("SELECT document FROM users WHERE id = $1")
                .bind(user_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;
            row.map(|row| Self::decode(&row, "document")).transpose()
        })
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Self::timed(StoreOperation::FindUserByEmail, async {
            let row = sqlx::query("SELECT document FROM users WHERE LOWER(email) = LOWER($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
            row.map(|row| Self::decode(&row, "document")).transpose()
        })
        .await
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        Self::timed(StoreOperation::EmailExists, async {
            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE LOWER(email) = LOWER($1)")
                    .bind(email)
                    .fetch_one(&self.pool)
                    .await?;
            Ok(count > 0)
        })
        .await
    }

    async fn phone_exists(&self, phone: &str) -> Result<bool> {
        Self::timed(StoreOperation::PhoneExists, async {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE phone = $1")
                .bind(phone)
                .fetch_one(&self.pool)
                .await?;
            Ok(count > 0)
        })
        .await
    }

    async fn update_tokens(
        &self,
        user_id: UserId,
        token: String,
        refresh_token: String,
    ) -> Result<()> {
        Self::timed(StoreOperation::UpdateTokens, async {
            let updated_at = serde_json::to_value(Utc::now())?;
            let result = sqlx::query(
                r#"
                UPDATE users
                SET document = document || jsonb_build_object(
                    'token', $2::text,
                    'refresh_token', $3::text,
                    'updated_at', $4::jsonb
                )
                WHERE id = $1
                "#,
            )
            .bind(user_id.as_uuid())
            .bind(token)
            .bind(refresh_token)
            .bind(updated_at)
            .execute(&self.pool)
            .await?;
            Self::require_updated(result.rows_affected(), user_id)
        })
        .await
    }

    async fn append_cart_lines(&self, user_id: UserId, lines: Vec<CartLine>) -> Result<()> {
        Self::timed(StoreOperation::AppendCartLines, async {
            let lines = serde_json::to_value(&lines)?;
            let result = sqlx::query(
                r#"
                UPDATE users
                SET document = jsonb_set(
                    document,
                    '{user_cart}',
                    COALESCE(document->'user_cart', '[]'::jsonb) || $2::jsonb
                )
                WHERE id = $1
                "#,
            )
            .bind(user_id.as_uuid())
            .bind(lines)
            .execute(&self.pool)
            .await?;
            Self::require_updated(result.rows_affected(), user_id)
        })
        .await
    }

    async fn remove_cart_lines(&self, user_id: UserId, product_id: ProductId) -> Result<usize> {
        Self::timed(StoreOperation::RemoveCartLines, async {
            let removed: Option<i32> = sqlx::query_scalar(
                r#"
                WITH current AS (
                    SELECT id, COALESCE(document->'user_cart', '[]'::jsonb) AS cart
                    FROM users
                    WHERE id = $1
                    FOR UPDATE
                ),
                kept AS (
                    SELECT COALESCE(jsonb_agg(line ORDER BY idx), '[]'::jsonb) AS cart
                    FROM current, jsonb_array_elements(current.cart) WITH ORDINALITY AS t(line, idx)
                    WHERE line->>'product_id' <> $2
                )
                UPDATE users u
                SET document = jsonb_set(u.document, '{user_cart}', kept.cart)
                FROM current, kept
                WHERE u.id = current.id
                RETURNING jsonb_array_length(current.cart) - jsonb_array_length(kept.cart)
                "#,
            )
            .bind(user_id.as_uuid())
            .bind(product_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

            let removed = removed.ok_or(StoreError::UserNotFound(user_id))?;
            Ok(usize::try_from(removed).unwrap_or_default())
        })
        .await
    }

    async fn set_cart_lines(&self, user_id: UserId, lines: Vec<CartLine>) -> Result<()> {
        Self::timed(StoreOperation::SetCartLines, async {
            let lines = serde_json::to_value(&lines)?;
            let result = sqlx::query(
                "UPDATE users SET document = jsonb_set(document, '{user_cart}', $2::jsonb) WHERE id = $1",
            )
            .bind(user_id.as_uuid())
            .bind(lines)
            .execute(&self.pool)
            .await?;
            Self::require_updated(result.rows_affected(), user_id)
        })
        .await
    }

    async fn cart_lines(&self, user_id: UserId) -> Result<Vec<CartLine>> {
        Self::timed(StoreOperation::CartLines, async {
            let row = sqlx::query("SELECT document->'user_cart' AS cart FROM users WHERE id = $1")
                .bind(user_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?
                .ok_or(StoreError::UserNotFound(user_id))?;
            Self::decode_array(row.try_get("cart")?)
        })
        .await
    }

    async fn cart_total(&self, user_id: UserId) -> Result<Money> {
        Self::timed(StoreOperation::CartTotal, async {
            let total: Option<i64> = sqlx::query_scalar(
                r#"
                SELECT (
                    SELECT COALESCE(SUM((line->>'price')::bigint), 0)::bigint
                    FROM jsonb_array_elements(COALESCE(u.document->'user_cart', '[]'::jsonb)) AS line
                )
                FROM users u
                WHERE u.id = $1
                "#,
            )
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE)
                {
                    return StoreError::AggregateOverflow(user_id);
                }
                StoreError::Database(e)
            })?;

            total
                .map(Money::from_cents)
                .ok_or(StoreError::UserNotFound(user_id))
        })
        .await
    }

    async fn append_order(&self, user_id: UserId, order: Order) -> Result<()> {
        Self::timed(StoreOperation::AppendOrder, async {
            let order = serde_json::to_value(&order)?;
            let result = sqlx::query(
                r#"
                UPDATE users
                SET document = jsonb_set(
                    document,
                    '{orders}',
                    COALESCE(document->'orders', '[]'::jsonb) || jsonb_build_array($2::jsonb)
                )
                WHERE id = $1
                "#,
            )
            .bind(user_id.as_uuid())
            .bind(order)
            .execute(&self.pool)
            .await?;
            Self::require_updated(result.rows_affected(), user_id)
        })
        .await
    }

    async fn append_order_detail_lines(
        &self,
        user_id: UserId,
        order_id: OrderId,
        lines: Vec<CartLine>,
    ) -> Result<()> {
        Self::timed(StoreOperation::AppendOrderDetailLines, async {
            let lines = serde_json::to_value(&lines)?;
            let result = sqlx::query(
                r#"
                UPDATE users
                SET document = jsonb_set(document, '{orders}', (
                    SELECT jsonb_agg(
                        CASE WHEN o->>'order_id' = $2
                            THEN jsonb_set(o, '{order_list}', COALESCE(o->'order_list', '[]'::jsonb) || $3::jsonb)
                            ELSE o
                        END
                        ORDER BY idx
                    )
                    FROM jsonb_array_elements(document->'orders') WITH ORDINALITY AS t(o, idx)
                ))
                WHERE id = $1
                  AND EXISTS (
                    SELECT 1
                    FROM jsonb_array_elements(COALESCE(document->'orders', '[]'::jsonb)) AS o
                    WHERE o->>'order_id' = $2
                  )
                "#,
            )
            .bind(user_id.as_uuid())
            .bind(order_id.to_string())
            .bind(lines)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                if self.exists(user_id).await? {
                    return Err(StoreError::OrderNotFound { user_id, order_id });
                }
                return Err(StoreError::UserNotFound(user_id));
            }
            Ok(())
        })
        .await
    }

    async fn orders(&self, user_id: UserId) -> Result<Vec<Order>> {
        Self::timed(StoreOperation::Orders, async {
            let row = sqlx::query("SELECT document->'orders' AS orders FROM users WHERE id = $1")
                .bind(user_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?
                .ok_or(StoreError::UserNotFound(user_id))?;
            Self::decode_array(row.try_get("orders")?)
        })
        .await
    }
}
