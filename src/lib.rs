pub mod browser;
pub mod commands;
pub mod core;
pub mod errors;
pub mod testing;

pub use browser::{Browser, Element, MultiremoteBrowser};
pub use commands::{command, CallContext, CommandHandler, CommandScope};
pub use core::{InstanceConfig, MultiremoteConfig, SessionConfig, SessionFactory, Transport};
pub use errors::{AggregateFailure, CommandError, HandlerError, Result};
