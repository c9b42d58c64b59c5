//! Shared request state

use crate::config::{ServerConfig, StorageKind};
use crate::error::ApiError;
use serde_json::Value;
use std::sync::Arc;
use taskboard_kanban::{
    BoardContext, BoardError, BoardOperationProcessor, ChangeNotifier, Execute, MemoryTaskStore,
    OperationProcessor,
};

/// Handle every handler receives: one board context and one notifier per process
#[derive(Clone)]
pub struct AppState {
    ctx: Arc<BoardContext>,
    processor: BoardOperationProcessor,
}

impl AppState {
    pub fn new(ctx: BoardContext) -> Self {
        Self {
            ctx: Arc::new(ctx),
            processor: BoardOperationProcessor::new(),
        }
    }

    /// Open the configured store
    pub async fn from_config(config: &ServerConfig) -> Result<Self, BoardError> {
        let notifier = ChangeNotifier::new(config.broadcast_capacity);
        let ctx = match config.storage {
            StorageKind::File => BoardContext::open(&config.data_dir, notifier).await?,
            StorageKind::Memory => {
                tracing::warn!("using in-memory storage, tasks will not survive a restart");
                BoardContext::new(Arc::new(MemoryTaskStore::new()), notifier)
            }
        };
        Ok(Self::new(ctx))
    }

    pub fn context(&self) -> &BoardContext {
        &self.ctx
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        self.ctx.notifier()
    }

    /// Run a command through the processor
    pub async fn run<O>(&self, operation: &O) -> Result<Value, ApiError>
    where
        O: Execute<BoardContext, BoardError> + 'static,
    {
        Ok(self.processor.process(operation, &self.ctx).await?)
    }
}
