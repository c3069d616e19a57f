//! Detached preference refresh. Library mutations hand a user id to the
//! scheduler and return immediately; a background worker drains the queue
//! and recomputes. Failures are logged and counted, never retried.

use crate::preferences::PreferenceRecomputer;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Fire-and-forget request for a user's preferences to be rebuilt.
pub trait RefreshDispatcher: Send + Sync {
    fn schedule(&self, user_id: Uuid);
}

/// Bounded worker queue in front of a [`PreferenceRecomputer`].
pub struct RefreshScheduler {
    sender: mpsc::Sender<Uuid>,
}

impl RefreshScheduler {
    /// Create the queue and spawn its worker on the current Tokio runtime.
    pub fn spawn(recomputer: Arc<PreferenceRecomputer>, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel::<Uuid>(capacity.max(1));

        tokio::spawn(async move {
            run_worker(recomputer, receiver).await;
        });

        info!(capacity, "Preference refresh worker started");

        Self { sender }
    }
}

impl RefreshDispatcher for RefreshScheduler {
    fn schedule(&self, user_id: Uuid) {
        match self.sender.try_send(user_id) {
            Ok(()) => {
                metrics::counter!("preferences.refresh.scheduled").increment(1);
            }
            Err(TrySendError::Full(_)) => {
                warn!(user_id = %user_id, "Refresh queue full, dropping preference refresh");
                metrics::counter!("preferences.refresh.dropped").increment(1);
            }
            Err(TrySendError::Closed(_)) => {
                error!(user_id = %user_id, "Refresh worker stopped, dropping preference refresh");
                metrics::counter!("preferences.refresh.dropped").increment(1);
            }
        }
    }
}

async fn run_worker(recomputer: Arc<PreferenceRecomputer>, mut receiver: mpsc::Receiver<Uuid>) {
    while let Some(user_id) = receiver.recv().await {
        let recomputer = recomputer.clone();
        // Store calls are synchronous; keep them off the async workers.
        let result = tokio::task::spawn_blocking(move || recomputer.recompute(user_id)).await;
        match result {
            Ok(Ok(_)) => {
                debug!(user_id = %user_id, "Background preference refresh complete");
            }
            Ok(Err(e)) => {
                error!(user_id = %user_id, error = %e, "Background preference refresh failed");
                metrics::counter!("preferences.recompute.failures").increment(1);
            }
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Background preference refresh panicked");
                metrics::counter!("preferences.recompute.failures").increment(1);
            }
        }
    }
    info!("Preference refresh worker shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::types::{Book, Rating, ReadingStatus, User, UserBook};
    use shelf_store::{CatalogStore, MemoryStore, UserStore};
    use std::time::Duration;

    async fn wait_for<F: Fn() -> bool>(condition: F) -> bool {
        for _ in 0..200 {
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_scheduled_refresh_updates_preferences() {
        let store = Arc::new(MemoryStore::new());
        let book = Book::new("a", "A", "Christie", ["Mystery"]);
        let book_id = book.id;
        store.insert_book(book).unwrap();
        let user = User::new("reader");
        let user_id = user.id;
        store.insert_user(user).unwrap();
        let mut entry = UserBook::new(book_id, ReadingStatus::Read);
        entry.rating = Some(Rating::new(5.0).unwrap());
        store.insert_entry(user_id, entry).unwrap();

        let scheduler =
            RefreshScheduler::spawn(Arc::new(PreferenceRecomputer::new(store.clone())), 8);
        scheduler.schedule(user_id);

        let refreshed = wait_for(|| {
            store
                .get_user(user_id)
                .unwrap()
                .map(|u| u.preferences.preferred_authors.contains_key("Christie"))
                .unwrap_or(false)
        })
        .await;
        assert!(refreshed);
    }

    #[tokio::test]
    async fn test_failed_refresh_does_not_stop_worker() {
        let store = Arc::new(MemoryStore::new());
        let user = User::new("reader");
        let user_id = user.id;
        store.insert_user(user).unwrap();

        let scheduler =
            RefreshScheduler::spawn(Arc::new(PreferenceRecomputer::new(store.clone())), 8);
        // Unknown user: logged, swallowed.
        scheduler.schedule(Uuid::new_v4());

        let book = Book::new("a", "A", "Le Guin", ["Fantasy"]);
        let book_id = book.id;
        store.insert_book(book).unwrap();
        store
            .insert_entry(user_id, UserBook::new(book_id, ReadingStatus::ToRead))
            .unwrap();
        scheduler.schedule(user_id);

        let refreshed = wait_for(|| {
            store
                .get_user(user_id)
                .unwrap()
                .map(|u| u.preferences.preferred_genres.contains_key("Fantasy"))
                .unwrap_or(false)
        })
        .await;
        assert!(refreshed);
    }
}
