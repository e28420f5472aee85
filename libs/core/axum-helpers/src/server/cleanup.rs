//! Connection cleanup run during graceful shutdown.

use tracing::{error, info};

/// Closes a SeaORM connection pool, logging the outcome.
pub async fn close_postgres(db: sea_orm::DatabaseConnection, name: &str) {
    match db.close().await {
        Ok(_) => info!("PostgreSQL connection '{}' closed successfully", name),
        Err(e) => error!("Error closing PostgreSQL connection '{}': {}", name, e),
    }
}

/// Runs named cleanup tasks concurrently and waits for all of them.
///
/// ```ignore
/// let mut cleanup = CleanupCoordinator::new();
/// cleanup.add_task("postgres", async move { close_postgres(db, "main").await });
/// cleanup.run().await;
/// ```
pub struct CleanupCoordinator {
    tasks: Vec<(&'static str, tokio::task::JoinHandle<()>)>,
}

impl CleanupCoordinator {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Spawns the task immediately.
    pub fn add_task<F>(&mut self, name: &'static str, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.tasks.push((name, tokio::spawn(task)));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// A panicking task is logged and does not stop the others.
    pub async fn run(self) {
        info!("Running {} cleanup tasks", self.tasks.len());

        for (name, handle) in self.tasks {
            match handle.await {
                Ok(_) => info!("Cleanup task '{}' completed successfully", name),
                Err(e) => error!("Cleanup task '{}' failed: {}", name, e),
            }
        }

        info!("All cleanup tasks completed");
    }
}

impl Default for CleanupCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_runs_all_tasks_even_if_one_panics() {
        let done = Arc::new(AtomicUsize::new(0));
        let mut cleanup = CleanupCoordinator::new();

        let counter = done.clone();
        cleanup.add_task("ok", async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        cleanup.add_task("boom", async { panic!("cleanup failed") });
        let counter = done.clone();
        cleanup.add_task("ok-2", async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(cleanup.len(), 3);
        cleanup.run().await;
        assert_eq!(done.load(Ordering::SeqCst), 2);
    }
}
