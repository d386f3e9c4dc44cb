//! Render state machine for one flyer preview.
//!
//! ```text
//! Idle ──begin──▶ Generating(n) ──complete(n, Ok)──▶ Rendered(n)
//!                     │        └──complete(n, Err)─▶ Failed(n)
//!                     └──begin──▶ Generating(n + 1)
//! ```
//!
//! Every [`FlyerPreview::begin`] hands out a [`RenderTicket`] with a fresh
//! generation number. A completion whose ticket is no longer current is
//! dropped, so a slow image load for an old spec can never overwrite the
//! preview of a newer one.

use std::sync::Arc;
use tracing::{debug, error};

use super::engine::RenderedFlyer;
use crate::error::Result;

/// Proof of a started render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a render ticket must be passed to `complete`"]
pub struct RenderTicket {
    generation: u64,
}

impl RenderTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Default)]
pub enum RenderStatus {
    #[default]
    Idle,
    Generating {
        generation: u64,
    },
    Rendered {
        generation: u64,
        flyer: Arc<RenderedFlyer>,
    },
    Failed {
        generation: u64,
        message: String,
    },
}

/// What happened to a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Stored,
    /// A newer render started (or the preview was cleared) meanwhile.
    Stale,
}

#[derive(Debug, Default)]
pub struct FlyerPreview {
    generation: u64,
    status: RenderStatus,
}

impl FlyerPreview {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a render pass, superseding any pass in flight.
    pub fn begin(&mut self) -> RenderTicket {
        self.generation += 1;
        self.status = RenderStatus::Generating {
            generation: self.generation,
        };
        debug!(generation = self.generation, "render started");
        RenderTicket {
            generation: self.generation,
        }
    }

    /// Record the outcome of a render pass.
    ///
    /// The generating flag is cleared whenever the ticket is current,
    /// whether the pass succeeded or failed.
    pub fn complete(&mut self, ticket: RenderTicket, result: Result<RenderedFlyer>) -> Completion {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                "discarding stale render"
            );
            return Completion::Stale;
        }

        self.status = match result {
            Ok(flyer) => RenderStatus::Rendered {
                generation: ticket.generation,
                flyer: Arc::new(flyer),
            },
            Err(e) => {
                error!(generation = ticket.generation, error = %e, "Erro ao gerar encarte");
                RenderStatus::Failed {
                    generation: ticket.generation,
                    message: e.to_string(),
                }
            }
        };
        Completion::Stored
    }

    /// Drop the current preview and invalidate any pass in flight.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.status = RenderStatus::Idle;
    }

    pub fn status(&self) -> &RenderStatus {
        &self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.status, RenderStatus::Generating { .. })
    }

    /// The most recent successful render, if it is still current.
    pub fn flyer(&self) -> Option<Arc<RenderedFlyer>> {
        match &self.status {
            RenderStatus::Rendered { flyer, .. } => Some(flyer.clone()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            RenderStatus::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}
