//! The live probing session: per-target state, the round loop and its frontends.

pub mod context;
pub mod frontend;
pub mod scheduler;
pub mod signal;

pub use context::TargetContext;
pub use frontend::{CrosstermEvents, Frontend, PlainFrontend, TerminalFrontend};
pub use scheduler::{Scheduler, SystemPacer};
pub use signal::{install_interrupt_handler, StopFlag};
