// Event timeline: the ordered log of tagged match events
//
// The timeline is the local replica of a match's event rows. Operators insert
// and delete through the console; inbound change notifications merge into it
// by id so duplicates are harmless.

// Public API - what other modules can use
pub use event_log::EventTimeline;
pub use models::{EventType, MatchEvent, Team};

// Internal modules
mod event_log;
mod models;
