// src/core/abort_router.rs

//! Turns operator interrupts into scoped aborts.
//!
//! The router is shared between the script's execution thread and the signal
//! listener task. The listener only *reads* the nesting depth; the resulting
//! [`AbortScope`] is parked in a pending slot and announced through a
//! [`Notify`], which wakes whichever command wait is in progress.

use crate::models::{AbortScope, Interrupt};
use scopeguard::ScopeGuard;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// Maps an interrupt to the scope it cancels, given how many sections are open.
pub fn route(interrupt: Interrupt, depth: usize) -> AbortScope {
    match interrupt {
        Interrupt::Hard => AbortScope::Script,
        Interrupt::Soft if depth == 0 => AbortScope::Command,
        Interrupt::Soft => AbortScope::Section,
    }
}

/// Number of sections currently open in one script run.
///
/// Only the section runner changes it, through [`NestingDepth::enter`]; every
/// other holder treats it as read-only.
#[derive(Debug, Clone, Default)]
pub struct NestingDepth(Arc<AtomicUsize>);

impl NestingDepth {
    /// A counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of open sections.
    pub fn current(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    /// Opens one level. The level is closed when the returned guard drops,
    /// whatever path the caller leaves by.
    pub(crate) fn enter(&self) -> ScopeGuard<Arc<AtomicUsize>, impl FnOnce(Arc<AtomicUsize>) + use<>> {
        let depth = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!("Entered section level {}", depth);
        scopeguard::guard(Arc::clone(&self.0), |counter| {
            let previous = counter
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |d| Some(d.saturating_sub(1)))
                .unwrap_or_default();
            log::debug!("Left section level {}", previous);
        })
    }
}

/// Routes interrupts to the innermost unit of work that should stop.
#[derive(Debug)]
pub struct AbortRouter {
    depth: NestingDepth,
    in_flight: AtomicBool,
    pending: Mutex<Option<AbortScope>>,
    notify: Notify,
}

impl AbortRouter {
    /// Creates a router that reads `depth` when an interrupt arrives.
    pub fn new(depth: NestingDepth) -> Self {
        Self {
            depth,
            in_flight: AtomicBool::new(false),
            pending: Mutex::new(None),
            notify: Notify::new(),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<AbortScope>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records an interrupt and wakes the running command, if any.
    ///
    /// A soft interrupt outside every section while no command is running has
    /// nothing to cancel and is dropped. Returns the scope that was recorded.
    pub fn deliver(&self, interrupt: Interrupt) -> Option<AbortScope> {
        let scope = route(interrupt, self.depth.current());
        if scope == AbortScope::Command && !self.command_in_flight() {
            log::debug!("Interrupt received with no command running; ignoring.");
            return None;
        }

        {
            let mut slot = self.slot();
            let merged = slot.map_or(scope, |previous| previous.max(scope));
            *slot = Some(merged);
        }
        log::debug!("Interrupt routed to {} scope.", scope);
        self.notify.notify_one();
        Some(scope)
    }

    /// Whether a child process is being waited on right now.
    pub fn command_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Marks a command as running until the guard drops. Command-scoped aborts
    /// that were not consumed by the time it finishes are discarded.
    pub(crate) fn command_started<'a>(
        &'a self,
    ) -> ScopeGuard<&'a Self, impl FnOnce(&'a Self)> {
        self.in_flight.store(true, Ordering::SeqCst);
        scopeguard::guard(self, |router: &'a Self| {
            router.in_flight.store(false, Ordering::SeqCst);
            let mut slot = router.slot();
            if *slot == Some(AbortScope::Command) {
                *slot = None;
            }
        })
    }

    /// Takes whatever abort is pending.
    pub(crate) fn take_pending(&self) -> Option<AbortScope> {
        self.slot().take()
    }

    /// Resolves once an abort has been delivered, yielding its scope.
    pub(crate) async fn cancelled(&self) -> AbortScope {
        loop {
            if let Some(scope) = self.take_pending() {
                return scope;
            }
            self.notify.notified().await;
        }
    }
}
