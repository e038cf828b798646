use async_trait::async_trait;

use crate::error::AppError;
use crate::models::draft::Draft;
use crate::models::item::ReturnItem;
use crate::models::metrics::Metrics;
use crate::models::user::{SafeUser, UserRecord};

pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub salt: Vec<u8>,
}

/// Storage seam for the whole data-lifecycle layer. Every operation is
/// partitioned by the owning user's email; implementations must never
/// leak rows across partitions.
#[async_trait]
pub trait ReturnRepository: Send + Sync {
    // Accounts and sessions
    async fn create_user(&self, user: &NewUser) -> Result<(), AppError>;
    async fn find_user(&self, email: &str) -> Result<Option<UserRecord>, AppError>;
    async fn create_session(&self, token: &str, email: &str) -> Result<(), AppError>;
    async fn find_session(&self, token: &str) -> Result<Option<SafeUser>, AppError>;
    async fn delete_session(&self, token: &str) -> Result<(), AppError>;
    async fn purge_expired_sessions(&self, cutoff: i64) -> Result<u64, AppError>;

    // Active set
    async fn get_items(&self, email: &str) -> Result<Vec<ReturnItem>, AppError>;
    async fn count_items(&self, email: &str) -> Result<i64, AppError>;
    async fn save_item(&self, email: &str, item: &ReturnItem) -> Result<(), AppError>;
    /// Replace the active item with the same id. Returns false (no-op)
    /// when the id is not in the active set.
    async fn update_item(&self, email: &str, item: &ReturnItem) -> Result<bool, AppError>;
    /// Maintenance hard-remove from the active set, bypassing trash.
    async fn delete_item(&self, email: &str, id: &str) -> Result<(), AppError>;

    // Trash lifecycle
    async fn get_trash(&self, email: &str) -> Result<Vec<ReturnItem>, AppError>;
    async fn soft_delete(&self, email: &str, id: &str) -> Result<(), AppError>;
    async fn restore(&self, email: &str, id: &str) -> Result<(), AppError>;
    async fn restore_all(&self, email: &str) -> Result<(), AppError>;
    async fn permanent_delete(&self, email: &str, id: &str) -> Result<(), AppError>;
    async fn empty_trash(&self, email: &str) -> Result<(), AppError>;

    /// Merge a backup bundle: skip ids already present (active or trash),
    /// append the rest, renumber the active set descending by timestamp.
    /// Returns the number of newly added active items.
    async fn merge_import(
        &self,
        email: &str,
        items: &[ReturnItem],
        trash: &[ReturnItem],
    ) -> Result<usize, AppError>;

    // Draft slot
    async fn get_draft(&self, email: &str) -> Result<Option<Draft>, AppError>;
    async fn save_draft(&self, email: &str, draft: &Draft) -> Result<(), AppError>;
    async fn clear_draft(&self, email: &str) -> Result<(), AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
    async fn get_metrics(&self) -> Result<Metrics, AppError>;
}
