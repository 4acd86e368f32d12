use async_trait::async_trait;
use careline_application::FileStorage;
use careline_core::AppResult;
use tracing::info;

/// Console file-storage adapter: deletions are logged, not performed.
#[derive(Debug, Default)]
pub struct ConsoleFileStorage;

impl ConsoleFileStorage {
    /// Creates the console adapter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileStorage for ConsoleFileStorage {
    async fn delete_file(&self, file_id: &str) -> AppResult<()> {
        info!(file_id, "console file storage: delete");

        Ok(())
    }
}
