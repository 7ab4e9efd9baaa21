// crates/semspect-init-core/src/diagnostics.rs
// ============================================================================
// Module: Semspect Init Diagnostics Sinks
// Description: Reference implementations of the diagnostics interface.
// Purpose: Emit structured diagnostic records without global logger state.
// Dependencies: crate::interfaces, serde_json, std
// ============================================================================

//! ## Overview
//! Three sinks cover the common cases: [`JsonLineDiagnostics`] writes one
//! JSON object per event to any writer (the CLI points it at stderr),
//! [`MemoryDiagnostics`] collects events for test assertions, and
//! [`NullDiagnostics`] discards everything. A failed diagnostic write never
//! fails the run; events that cannot be delivered are dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;

use serde_json::json;

use crate::interfaces::DiagnosticLevel;
use crate::interfaces::Diagnostics;

// ============================================================================
// SECTION: JSON Line Sink
// ============================================================================

/// Writes one JSON record per diagnostic event.
pub struct JsonLineDiagnostics<W: Write + Send> {
    /// Output writer for diagnostic records.
    writer: Mutex<W>,
    /// Minimum level recorded; lower levels are dropped.
    min_level: DiagnosticLevel,
}

impl<W: Write + Send> JsonLineDiagnostics<W> {
    /// Creates a sink recording info-level events and above.
    pub fn new(writer: W) -> Self {
        Self::with_min_level(writer, DiagnosticLevel::Info)
    }

    /// Creates a sink with an explicit minimum level.
    pub fn with_min_level(writer: W, min_level: DiagnosticLevel) -> Self {
        Self {
            writer: Mutex::new(writer),
            min_level,
        }
    }
}

impl<W: Write + Send> Diagnostics for JsonLineDiagnostics<W> {
    fn record(&self, level: DiagnosticLevel, message: &str) {
        if level < self.min_level {
            return;
        }
        let record = json!({
            "level": level.label(),
            "message": message,
        });
        let Ok(mut guard) = self.writer.lock() else {
            return;
        };
        if serde_json::to_writer(&mut *guard, &record).is_err() {
            return;
        }
        let _ = guard.write_all(b"\n");
    }
}

// ============================================================================
// SECTION: Memory Sink
// ============================================================================

/// One collected diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEvent {
    /// Severity of the event.
    pub level: DiagnosticLevel,
    /// Event message.
    pub message: String,
}

/// Collects diagnostic events in memory for test assertions.
#[derive(Default)]
pub struct MemoryDiagnostics {
    /// Collected events in emission order.
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl MemoryDiagnostics {
    /// Creates an empty collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the collected events in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Returns true when any event at the given level contains the needle.
    #[must_use]
    pub fn contains(&self, level: DiagnosticLevel, needle: &str) -> bool {
        self.events()
            .iter()
            .any(|event| event.level == level && event.message.contains(needle))
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn record(&self, level: DiagnosticLevel, message: &str) {
        let Ok(mut guard) = self.events.lock() else {
            return;
        };
        guard.push(DiagnosticEvent {
            level,
            message: message.to_string(),
        });
    }
}

// ============================================================================
// SECTION: Null Sink
// ============================================================================

/// Discards every diagnostic event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {
    fn record(&self, _level: DiagnosticLevel, _message: &str) {}
}
