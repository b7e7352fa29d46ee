//! Warn-once diagnostics.
//!
//! A `Diagnostics` value is created by the caller and passed to the
//! construction helpers that may emit warnings. Each warning kind fires at
//! most once until [`Diagnostics::reset`] is called.

use crate::topology::Topology;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

/// Kinds of one-time warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A negatively oriented element was rebuilt with the inverse ordering
    OrientationFixed(Topology),
    /// An element has a non-positive rest Jacobian determinant
    InvertedAtRest(Topology),
    /// Natural coordinate search hit a badly conditioned Jacobian
    IllConditionedNaturalCoords(Topology),
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    fired: Mutex<HashSet<DiagnosticKind>>,
    suppressed: AtomicBool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that records warnings without logging them.
    pub fn suppressed() -> Self {
        let diagnostics = Self::default();
        diagnostics.set_suppressed(true);
        diagnostics
    }

    pub fn set_suppressed(&self, suppressed: bool) {
        self.suppressed.store(suppressed, Ordering::Relaxed);
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed.load(Ordering::Relaxed)
    }

    /// Record `kind` and log `message` the first time it is seen.
    ///
    /// Returns true if this call was the first for `kind`.
    pub fn warn_once(&self, kind: DiagnosticKind, message: &str) -> bool {
        let first = self.record_once(kind);
        if first && !self.is_suppressed() {
            log::warn!("{}", message);
        }
        first
    }

    /// Record `kind` without logging.
    pub fn record_once(&self, kind: DiagnosticKind) -> bool {
        self.fired.lock().insert(kind)
    }

    pub fn has_fired(&self, kind: DiagnosticKind) -> bool {
        self.fired.lock().contains(&kind)
    }

    pub fn fired_count(&self) -> usize {
        self.fired.lock().len()
    }

    /// Forget every recorded warning.
    pub fn reset(&self) {
        self.fired.lock().clear();
    }
}
