// ── Connection Manager ──
//
// Registry of which panels are listening to the shared push channel.
// Routing is per panel, not per handler: a panel with any live
// `Subscription` receives its events exactly once, a panel with none
// receives nothing.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::panel::PanelKind;

#[derive(Debug, Default)]
struct Registry {
    handlers: DashMap<PanelKind, usize>,
    /// Bumped by `detach_all`; guards from an older generation are inert.
    generation: AtomicU64,
}

/// Cheaply cloneable handle to the subscription registry.
#[derive(Debug, Clone, Default)]
pub struct ConnectionManager {
    registry: Arc<Registry>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a handler for `panel`. Dropping the guard detaches it.
    #[must_use = "dropping the subscription detaches the panel immediately"]
    pub fn subscribe(&self, panel: PanelKind) -> Subscription {
        let mut count = self.registry.handlers.entry(panel).or_insert(0);
        *count += 1;
        debug!(%panel, handlers = *count, "panel subscribed");
        Subscription {
            registry: Arc::clone(&self.registry),
            panel,
            generation: self.registry.generation.load(Ordering::Acquire),
        }
    }

    pub fn is_subscribed(&self, panel: PanelKind) -> bool {
        self.registry
            .handlers
            .get(&panel)
            .is_some_and(|count| *count > 0)
    }

    pub fn handler_count(&self, panel: PanelKind) -> usize {
        self.registry.handlers.get(&panel).map_or(0, |c| *c)
    }

    /// Panels with at least one live subscription.
    pub fn subscribed(&self) -> Vec<PanelKind> {
        let mut panels: Vec<PanelKind> = self
            .registry
            .handlers
            .iter()
            .filter(|entry| *entry.value() > 0)
            .map(|entry| *entry.key())
            .collect();
        panels.sort_unstable();
        panels
    }

    /// Detach every handler. Outstanding guards become no-ops.
    pub fn detach_all(&self) {
        self.registry.generation.fetch_add(1, Ordering::AcqRel);
        self.registry.handlers.clear();
        debug!("all panel subscriptions detached");
    }
}

/// RAII guard for one panel handler.
#[derive(Debug)]
pub struct Subscription {
    registry: Arc<Registry>,
    panel: PanelKind,
    generation: u64,
}

impl Subscription {
    pub fn panel(&self) -> PanelKind {
        self.panel
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.registry.generation.load(Ordering::Acquire) != self.generation {
            return;
        }
        let remaining = match self.registry.handlers.get_mut(&self.panel) {
            Some(mut count) => {
                *count = count.saturating_sub(1);
                *count
            }
            None => return,
        };
        if remaining == 0 {
            self.registry
                .handlers
                .remove_if(&self.panel, |_, count| *count == 0);
        }
        trace!(panel = %self.panel, remaining, "panel handler detached");
    }
}
