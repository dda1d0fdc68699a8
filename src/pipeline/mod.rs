//! Dispatch pipeline: coordinator, event reader, replay loop.

pub mod context;
pub mod coordinator;
pub mod error_handler;
pub mod events;
pub mod reader;
pub mod replay;

pub use context::{ReplayHandles, ReplayOpts, start_reader};
pub use coordinator::{DispatchCoordinator, Routing};
pub use error_handler::check_for_initial_error_or_skipped_lines;
pub use events::{LineOutcome, NodeEvent, parse_line};
pub use reader::{run_reader_loop, spawn_reader_thread};
pub use replay::{ReplayStats, replay_events, replay_reader};
