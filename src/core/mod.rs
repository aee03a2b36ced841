pub mod config;
pub mod transport;

pub use config::{InstanceConfig, MultiremoteConfig, SessionConfig};
pub use transport::{SessionFactory, Transport};
