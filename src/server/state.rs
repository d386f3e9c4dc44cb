//! Server state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::Result;
use crate::render::{HttpImageLoader, ImageLoader, Renderer};
use crate::workspace::Workspace;

/// A workspace plus its last access time.
pub struct WorkspaceSession {
    pub workspace: Workspace,
    pub last_accessed: Instant,
}

impl WorkspaceSession {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            workspace,
            last_accessed: Instant::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }

    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.duration_since(self.last_accessed) >= ttl
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: AppConfig,
    pub renderer: Renderer,
    pub loader: Arc<dyn ImageLoader>,
    pub workspaces: RwLock<HashMap<Uuid, WorkspaceSession>>,
}

impl AppState {
    /// State with the remote-only image loader and configured fonts.
    pub fn new(config: AppConfig) -> Result<Self> {
        let loader =
            HttpImageLoader::new(config.render.image_timeout())?.with_cache_limit(config.render.image_cache_entries);
        Self::with_loader(config, Arc::new(loader))
    }

    pub fn with_loader(config: AppConfig, loader: Arc<dyn ImageLoader>) -> Result<Self> {
        let renderer = Renderer::from_config(&config.render, config.branding.clone())?;
        Ok(Self {
            config,
            renderer,
            loader,
            workspaces: RwLock::new(HashMap::new()),
        })
    }

    pub fn workspace_ttl(&self) -> Duration {
        Duration::from_secs(self.config.server.workspace_ttl_secs)
    }

    /// Drop expired workspaces. Returns how many were removed.
    pub async fn remove_expired(&self, now: Instant) -> usize {
        let ttl = self.workspace_ttl();
        let mut workspaces = self.workspaces.write().await;
        let before = workspaces.len();
        workspaces.retain(|_, session| !session.is_expired(now, ttl));
        before - workspaces.len()
    }
}
