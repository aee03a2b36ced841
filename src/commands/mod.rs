pub mod handler;
pub mod registry;

pub use handler::{command, CallContext, CommandFuture, CommandHandler};
pub use registry::{CommandRegistry, CommandScope};
