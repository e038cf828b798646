use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::models::draft::Draft;
use crate::repository::ReturnRepository;
use crate::util::email_prefix;

/// Debounced draft writer: one pending slot per user. Every schedule call
/// aborts the user's pending write and arms a fresh one, so a burst of
/// saves coalesces into a single persisted write carrying the latest
/// draft. Only the most recent pending save ever fires.
#[derive(Clone)]
pub struct DraftSaver {
    repo: Arc<dyn ReturnRepository>,
    debounce: Duration,
    pending: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
    flushed: Arc<AtomicU64>,
}

impl DraftSaver {
    pub fn new(repo: Arc<dyn ReturnRepository>, debounce_ms: u64) -> Self {
        Self {
            repo,
            debounce: Duration::from_millis(debounce_ms),
            pending: Arc::new(Mutex::new(HashMap::new())),
            flushed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Cancel-and-reschedule the user's single pending write.
    pub async fn schedule(&self, email: &str, draft: Draft) {
        let mut pending = self.pending.lock().await;

        if let Some(handle) = pending.remove(email) {
            handle.abort();
            tracing::debug!(user = %email_prefix(email), "draft: pending save rescheduled");
        }

        let repo = self.repo.clone();
        let flushed = self.flushed.clone();
        let debounce = self.debounce;
        let owner = email.to_string();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            match repo.save_draft(&owner, &draft).await {
                Ok(()) => {
                    flushed.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(user = %email_prefix(&owner), "draft: debounced save flushed");
                }
                Err(e) => {
                    tracing::warn!(user = %email_prefix(&owner), error = %e, "draft: debounced save failed");
                }
            }
        });

        pending.insert(email.to_string(), handle);
    }

    /// Drop the user's pending write, if any. Called on clear so a
    /// just-cleared draft cannot be resurrected by an in-flight save.
    pub async fn cancel(&self, email: &str) {
        let mut pending = self.pending.lock().await;
        if let Some(handle) = pending.remove(email) {
            handle.abort();
            tracing::debug!(user = %email_prefix(email), "draft: pending save cancelled");
        }
    }

    /// Number of debounced writes that actually reached storage.
    pub fn flushed_writes(&self) -> u64 {
        self.flushed.load(Ordering::Relaxed)
    }

    /// Drop completed task handles. Run from the maintenance job.
    pub async fn sweep_finished(&self) {
        let mut pending = self.pending.lock().await;
        pending.retain(|_, handle| !handle.is_finished());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth;
    use crate::db;
    use crate::repository::{NewUser, ReturnRepository};
    use crate::sqlite_repo::SqliteRepository;

    async fn setup() -> Arc<SqliteRepository> {
        let pool = db::init_pool("sqlite::memory:").await.unwrap();
        let repo = Arc::new(SqliteRepository::new(pool));
        let salt = auth::generate_salt();
        repo.create_user(&NewUser {
            email: "jane@x.com".into(),
            full_name: "Jane Doe".into(),
            password_hash: auth::hash_password("p1", &salt),
            salt,
        })
        .await
        .unwrap();
        repo
    }

    fn titled(title: &str) -> Draft {
        Draft {
            title: Some(title.into()),
            ..Draft::default()
        }
    }

    #[tokio::test]
    async fn test_burst_coalesces_to_one_write() {
        let repo = setup().await;
        let saver = DraftSaver::new(repo.clone(), 50);

        saver.schedule("jane@x.com", titled("a")).await;
        saver.schedule("jane@x.com", titled("ab")).await;
        saver.schedule("jane@x.com", titled("abc")).await;

        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(saver.flushed_writes(), 1);
        let draft = repo.get_draft("jane@x.com").await.unwrap().unwrap();
        assert_eq!(draft.title.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_cancel_drops_pending_write() {
        let repo = setup().await;
        let saver = DraftSaver::new(repo.clone(), 50);

        saver.schedule("jane@x.com", titled("doomed")).await;
        saver.cancel("jane@x.com").await;

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(saver.flushed_writes(), 0);
        assert!(repo.get_draft("jane@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_separate_users_do_not_share_the_slot() {
        let repo = setup().await;
        let salt = auth::generate_salt();
        repo.create_user(&NewUser {
            email: "bob@x.com".into(),
            full_name: "Bob".into(),
            password_hash: auth::hash_password("p2", &salt),
            salt,
        })
        .await
        .unwrap();

        let saver = DraftSaver::new(repo.clone(), 50);
        saver.schedule("jane@x.com", titled("jane")).await;
        saver.schedule("bob@x.com", titled("bob")).await;

        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(saver.flushed_writes(), 2);
        let jane = repo.get_draft("jane@x.com").await.unwrap().unwrap();
        let bob = repo.get_draft("bob@x.com").await.unwrap().unwrap();
        assert_eq!(jane.title.as_deref(), Some("jane"));
        assert_eq!(bob.title.as_deref(), Some("bob"));
    }
}
