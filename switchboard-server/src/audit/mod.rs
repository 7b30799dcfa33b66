//! Structured audit trail. Routing code only ever calls [`AuditEmitter::emit`], which
//! never waits; a background task hands events to the configured [`AuditSink`].

mod audit_emitter;
mod audit_event;
mod audit_sink;

pub use audit_emitter::*;
pub use audit_event::*;
pub use audit_sink::*;
