use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::AppError;
use crate::models::draft::Draft;
use crate::models::item::{DbItem, ReturnItem};
use crate::models::metrics::{ItemMetrics, Metrics, StorageMetrics, UserMetrics};
use crate::models::user::{SafeUser, UserRecord};
use crate::repository::{NewUser, ReturnRepository};
use crate::util::{email_prefix, now_millis, token_prefix};

const ITEM_COLUMNS: &str = "id, title, description, image_url, timestamp, is_trashed, position";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Rewrite active-set positions to descending-timestamp order. The
    /// pre-existing position order serves as the tie-break, so equal
    /// timestamps keep their relative order (stable resort).
    async fn renumber_active(
        tx: &mut Transaction<'_, Sqlite>,
        email: &str,
    ) -> Result<(), AppError> {
        let mut rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT id, timestamp FROM items \
             WHERE email = ? AND is_trashed = 0 ORDER BY position ASC",
        )
        .bind(email)
        .fetch_all(&mut **tx)
        .await?;

        rows.sort_by(|a, b| b.1.cmp(&a.1));

        for (position, (id, _)) in rows.iter().enumerate() {
            sqlx::query("UPDATE items SET position = ? WHERE email = ? AND id = ?")
                .bind(position as i64)
                .bind(email)
                .bind(id)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    /// Next append position within one of the two sets (0 = active,
    /// 1 = trash).
    async fn next_position(
        tx: &mut Transaction<'_, Sqlite>,
        email: &str,
        trashed: i64,
    ) -> Result<i64, AppError> {
        let pos: (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(position), -1) + 1 FROM items WHERE email = ? AND is_trashed = ?",
        )
        .bind(email)
        .bind(trashed)
        .fetch_one(&mut **tx)
        .await?;

        Ok(pos.0)
    }
}

#[async_trait]
impl ReturnRepository for SqliteRepository {
    async fn create_user(&self, user: &NewUser) -> Result<(), AppError> {
        tracing::debug!(user = %email_prefix(&user.email), "db: INSERT users");

        let result = sqlx::query(
            "INSERT INTO users (email, full_name, password_hash, salt, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(&user.salt)
        .bind(now_millis())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                tracing::debug!(user = %email_prefix(&user.email), "db: user row inserted");
                Ok(())
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                tracing::debug!(user = %email_prefix(&user.email), "db: user already exists");
                Err(AppError::DuplicateAccount(
                    "This email address is already registered.".into(),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        tracing::debug!(user = %email_prefix(email), "db: SELECT user");

        let row: Option<(String, String, String, Vec<u8>)> = sqlx::query_as(
            "SELECT email, full_name, password_hash, salt FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        tracing::debug!(user = %email_prefix(email), found = row.is_some(), "db: user lookup result");

        Ok(row.map(|(email, full_name, password_hash, salt)| UserRecord {
            email,
            full_name,
            password_hash,
            salt,
        }))
    }

    async fn create_session(&self, token: &str, email: &str) -> Result<(), AppError> {
        tracing::debug!(user = %email_prefix(email), "db: INSERT sessions");

        sqlx::query("INSERT INTO sessions (token, email, created_at) VALUES (?, ?, ?)")
            .bind(token)
            .bind(email)
            .bind(now_millis())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_session(&self, token: &str) -> Result<Option<SafeUser>, AppError> {
        tracing::debug!(token = %token_prefix(token), "db: SELECT session");

        let row: Option<(String, String)> = sqlx::query_as(
            "SELECT u.full_name, u.email FROM sessions s \
             JOIN users u ON u.email = s.email WHERE s.token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        tracing::debug!(token = %token_prefix(token), found = row.is_some(), "db: session lookup result");

        Ok(row.map(|(full_name, email)| SafeUser { full_name, email }))
    }

    async fn delete_session(&self, token: &str) -> Result<(), AppError> {
        tracing::debug!(token = %token_prefix(token), "db: DELETE session");

        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn purge_expired_sessions(&self, cutoff: i64) -> Result<u64, AppError> {
        tracing::debug!(cutoff, "db: DELETE expired sessions");

        let result = sqlx::query("DELETE FROM sessions WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        let rows = result.rows_affected();
        tracing::debug!(rows_affected = rows, "db: expired sessions purged");

        Ok(rows)
    }

    async fn get_items(&self, email: &str) -> Result<Vec<ReturnItem>, AppError> {
        tracing::debug!(user = %email_prefix(email), "db: SELECT active items");

        let rows: Vec<DbItem> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM items \
             WHERE email = ? AND is_trashed = 0 ORDER BY position ASC"
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(user = %email_prefix(email), rows_returned = rows.len(), "db: active items fetched");

        Ok(rows.iter().map(DbItem::to_return_item).collect())
    }

    async fn count_items(&self, email: &str) -> Result<i64, AppError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM items WHERE email = ? AND is_trashed = 0")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.0)
    }

    async fn save_item(&self, email: &str, item: &ReturnItem) -> Result<(), AppError> {
        tracing::debug!(
            user = %email_prefix(email),
            item_id = %item.id,
            "db: INSERT item (prepend to active)"
        );

        // Prepend: new items take a position below the current minimum.
        sqlx::query(
            "INSERT INTO items (email, id, title, description, image_url, timestamp, is_trashed, position) \
             VALUES (?, ?, ?, ?, ?, ?, 0, \
                 (SELECT COALESCE(MIN(position), 1) - 1 FROM items WHERE email = ? AND is_trashed = 0))",
        )
        .bind(email)
        .bind(&item.id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.image_url)
        .bind(item.timestamp)
        .bind(email)
        .execute(&self.pool)
        .await?;

        tracing::debug!(user = %email_prefix(email), item_id = %item.id, "db: item inserted");

        Ok(())
    }

    async fn update_item(&self, email: &str, item: &ReturnItem) -> Result<bool, AppError> {
        tracing::debug!(user = %email_prefix(email), item_id = %item.id, "db: UPDATE active item");

        let result = sqlx::query(
            "UPDATE items SET title = ?, description = ?, image_url = ?, timestamp = ? \
             WHERE email = ? AND id = ? AND is_trashed = 0",
        )
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.image_url)
        .bind(item.timestamp)
        .bind(email)
        .bind(&item.id)
        .execute(&self.pool)
        .await?;

        let updated = result.rows_affected() > 0;
        tracing::debug!(user = %email_prefix(email), item_id = %item.id, updated, "db: update result");

        Ok(updated)
    }

    async fn delete_item(&self, email: &str, id: &str) -> Result<(), AppError> {
        tracing::debug!(user = %email_prefix(email), item_id = %id, "db: DELETE active item (hard)");

        sqlx::query("DELETE FROM items WHERE email = ? AND id = ? AND is_trashed = 0")
            .bind(email)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_trash(&self, email: &str) -> Result<Vec<ReturnItem>, AppError> {
        tracing::debug!(user = %email_prefix(email), "db: SELECT trashed items");

        let rows: Vec<DbItem> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM items \
             WHERE email = ? AND is_trashed = 1 ORDER BY position ASC"
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(user = %email_prefix(email), rows_returned = rows.len(), "db: trashed items fetched");

        Ok(rows.iter().map(DbItem::to_return_item).collect())
    }

    async fn soft_delete(&self, email: &str, id: &str) -> Result<(), AppError> {
        tracing::debug!(user = %email_prefix(email), item_id = %id, "db: soft delete (active -> trash)");

        // Single statement: the move is atomic, fields are preserved, and
        // the item is prepended to the trash order. Missing ids fall
        // through as a no-op.
        let result = sqlx::query(
            "UPDATE items SET is_trashed = 1, position = \
                 (SELECT COALESCE(MIN(position), 1) - 1 FROM items WHERE email = ? AND is_trashed = 1) \
             WHERE email = ? AND id = ? AND is_trashed = 0",
        )
        .bind(email)
        .bind(email)
        .bind(id)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            user = %email_prefix(email),
            item_id = %id,
            rows_affected = result.rows_affected(),
            "db: soft delete result"
        );

        Ok(())
    }

    async fn restore(&self, email: &str, id: &str) -> Result<(), AppError> {
        tracing::debug!(user = %email_prefix(email), item_id = %id, "db: restore (trash -> active)");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE items SET is_trashed = 0, position = \
                 (SELECT COALESCE(MIN(position), 1) - 1 FROM items WHERE email = ? AND is_trashed = 0) \
             WHERE email = ? AND id = ? AND is_trashed = 1",
        )
        .bind(email)
        .bind(email)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() > 0 {
            Self::renumber_active(&mut tx, email).await?;
        }

        tx.commit().await?;

        tracing::debug!(
            user = %email_prefix(email),
            item_id = %id,
            restored = result.rows_affected() > 0,
            "db: restore result"
        );

        Ok(())
    }

    async fn restore_all(&self, email: &str) -> Result<(), AppError> {
        tracing::debug!(user = %email_prefix(email), "db: restore all trashed items");

        let mut tx = self.pool.begin().await?;

        // Append semantics: restored items sort after active items with
        // equal timestamps, in their stored trash order.
        let offset: (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(position), 0) + 1 - \
                 (SELECT COALESCE(MIN(position), 0) FROM items WHERE email = ? AND is_trashed = 1) \
             FROM items WHERE email = ? AND is_trashed = 0",
        )
        .bind(email)
        .bind(email)
        .fetch_one(&mut *tx)
        .await?;

        let result = sqlx::query(
            "UPDATE items SET is_trashed = 0, position = position + ? \
             WHERE email = ? AND is_trashed = 1",
        )
        .bind(offset.0)
        .bind(email)
        .execute(&mut *tx)
        .await?;

        Self::renumber_active(&mut tx, email).await?;

        tx.commit().await?;

        tracing::debug!(
            user = %email_prefix(email),
            rows_affected = result.rows_affected(),
            "db: restore all result"
        );

        Ok(())
    }

    async fn permanent_delete(&self, email: &str, id: &str) -> Result<(), AppError> {
        tracing::debug!(user = %email_prefix(email), item_id = %id, "db: DELETE trashed item (purge)");

        sqlx::query("DELETE FROM items WHERE email = ? AND id = ? AND is_trashed = 1")
            .bind(email)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn empty_trash(&self, email: &str) -> Result<(), AppError> {
        tracing::debug!(user = %email_prefix(email), "db: DELETE all trashed items");

        let result = sqlx::query("DELETE FROM items WHERE email = ? AND is_trashed = 1")
            .bind(email)
            .execute(&self.pool)
            .await?;

        tracing::debug!(
            user = %email_prefix(email),
            rows_affected = result.rows_affected(),
            "db: trash emptied"
        );

        Ok(())
    }

    async fn merge_import(
        &self,
        email: &str,
        items: &[ReturnItem],
        trash: &[ReturnItem],
    ) -> Result<usize, AppError> {
        tracing::debug!(
            user = %email_prefix(email),
            bundle_items = items.len(),
            bundle_trash = trash.len(),
            "db: merge import"
        );

        let mut tx = self.pool.begin().await?;

        // Existing ids across both sets; an imported id may not collide
        // with either, or the active/trash uniqueness invariant breaks.
        let existing: Vec<(String,)> = sqlx::query_as("SELECT id FROM items WHERE email = ?")
            .bind(email)
            .fetch_all(&mut *tx)
            .await?;
        let mut seen: std::collections::HashSet<String> =
            existing.into_iter().map(|(id,)| id).collect();

        let mut added = 0usize;

        for item in items {
            if seen.contains(&item.id) {
                tracing::debug!(item_id = %item.id, "db: import skip (id exists)");
                continue;
            }
            let position = Self::next_position(&mut tx, email, 0).await?;
            sqlx::query(
                "INSERT INTO items (email, id, title, description, image_url, timestamp, is_trashed, position) \
                 VALUES (?, ?, ?, ?, ?, ?, 0, ?)",
            )
            .bind(email)
            .bind(&item.id)
            .bind(&item.title)
            .bind(&item.description)
            .bind(&item.image_url)
            .bind(item.timestamp)
            .bind(position)
            .execute(&mut *tx)
            .await?;
            seen.insert(item.id.clone());
            added += 1;
        }

        for item in trash {
            if seen.contains(&item.id) {
                tracing::debug!(item_id = %item.id, "db: import skip trash (id exists)");
                continue;
            }
            let position = Self::next_position(&mut tx, email, 1).await?;
            sqlx::query(
                "INSERT INTO items (email, id, title, description, image_url, timestamp, is_trashed, position) \
                 VALUES (?, ?, ?, ?, ?, ?, 1, ?)",
            )
            .bind(email)
            .bind(&item.id)
            .bind(&item.title)
            .bind(&item.description)
            .bind(&item.image_url)
            .bind(item.timestamp)
            .bind(position)
            .execute(&mut *tx)
            .await?;
            seen.insert(item.id.clone());
        }

        // Active set is resorted after a merge; trash keeps its order.
        Self::renumber_active(&mut tx, email).await?;

        tx.commit().await?;

        tracing::debug!(user = %email_prefix(email), added, "db: merge import complete");

        Ok(added)
    }

    async fn get_draft(&self, email: &str) -> Result<Option<Draft>, AppError> {
        tracing::debug!(user = %email_prefix(email), "db: SELECT draft");

        let row: Option<(Option<String>, Option<String>, Option<String>, Option<String>)> =
            sqlx::query_as(
                "SELECT title, description, image_preview, image_data FROM drafts WHERE email = ?",
            )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(title, description, image_preview, image_data)| Draft {
            title,
            description,
            image_preview,
            image_data,
        }))
    }

    async fn save_draft(&self, email: &str, draft: &Draft) -> Result<(), AppError> {
        tracing::debug!(
            user = %email_prefix(email),
            draft_bytes = draft.byte_len(),
            "db: UPSERT draft"
        );

        sqlx::query(
            "INSERT INTO drafts (email, title, description, image_preview, image_data, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT (email) DO UPDATE SET \
               title = excluded.title, \
               description = excluded.description, \
               image_preview = excluded.image_preview, \
               image_data = excluded.image_data, \
               updated_at = excluded.updated_at",
        )
        .bind(email)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.image_preview)
        .bind(&draft.image_data)
        .bind(now_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn clear_draft(&self, email: &str) -> Result<(), AppError> {
        tracing::debug!(user = %email_prefix(email), "db: DELETE draft");

        sqlx::query("DELETE FROM drafts WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get_metrics(&self) -> Result<Metrics, AppError> {
        let users: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let sessions: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions")
            .fetch_one(&self.pool)
            .await?;
        let drafts: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM drafts")
            .fetch_one(&self.pool)
            .await?;
        let items: (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COALESCE(SUM(CASE WHEN is_trashed = 0 THEN 1 ELSE 0 END), 0), \
                    COALESCE(SUM(CASE WHEN is_trashed = 1 THEN 1 ELSE 0 END), 0) \
             FROM items",
        )
        .fetch_one(&self.pool)
        .await?;
        let image_bytes: (i64,) =
            sqlx::query_as("SELECT COALESCE(SUM(LENGTH(image_url)), 0) FROM items")
                .fetch_one(&self.pool)
                .await?;

        Ok(Metrics {
            users: UserMetrics {
                total: users.0,
                sessions: sessions.0,
                drafts: drafts.0,
            },
            items: ItemMetrics {
                total: items.0,
                active: items.1,
                trashed: items.2,
            },
            storage: StorageMetrics {
                total_image_bytes: image_bytes.0,
            },
            collected_at: now_millis(),
        })
    }
}
