//! Search handoff adapters.

mod logging_handoff;
mod recording_handoff;

pub use logging_handoff::LoggingSearchHandoff;
pub use recording_handoff::RecordingSearchHandoff;
