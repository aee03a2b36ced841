use std::fmt;
use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum CommandError {
    #[error("no command named `{0}` is registered")]
    CommandNotFound(String),

    #[error("invalid arguments for `{command}`: {message}")]
    InvalidArguments { command: String, message: String },

    #[error(transparent)]
    Handler(HandlerError),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("duplicate multiremote instance label `{0}`")]
    DuplicateLabel(String),

    #[error(transparent)]
    Aggregate(Arc<AggregateFailure>),
}

impl CommandError {
    /// Wrap a user error raised inside a command handler.
    ///
    /// The error is reference-counted, never copied or re-rendered, so the
    /// value the caller receives is the value the handler produced.
    pub fn handler<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CommandError::Handler(HandlerError::new(err))
    }

    pub fn invalid_arguments(command: &str, message: impl Into<String>) -> Self {
        CommandError::InvalidArguments {
            command: command.to_string(),
            message: message.into(),
        }
    }
}

/// A failure produced by a registered command handler.
///
/// Dispatch moves this value through untouched: no wrapping, no retries, no
/// message augmentation. Pointer identity of the inner error survives, which
/// callers can check with [`HandlerError::is`].
#[derive(Debug, Clone)]
pub struct HandlerError {
    inner: Arc<dyn std::error::Error + Send + Sync>,
}

impl HandlerError {
    pub fn new<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(err),
        }
    }

    pub fn from_arc(err: Arc<dyn std::error::Error + Send + Sync>) -> Self {
        Self { inner: err }
    }

    pub fn inner(&self) -> &Arc<dyn std::error::Error + Send + Sync> {
        &self.inner
    }

    /// True when this is the exact error value `other` points to.
    pub fn is(&self, other: &Arc<dyn std::error::Error + Send + Sync>) -> bool {
        Arc::ptr_eq(&self.inner, other)
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl From<HandlerError> for CommandError {
    fn from(err: HandlerError) -> Self {
        CommandError::Handler(err)
    }
}

/// Multiremote fan-out where at least one instance failed.
///
/// All instances settle before this is constructed. The primary error is the
/// failing instance that comes first in declared order; every other failure
/// is retained and reachable through [`AggregateFailure::failures`].
#[derive(Debug, Clone)]
pub struct AggregateFailure {
    command: String,
    failures: Vec<(String, CommandError)>,
}

impl AggregateFailure {
    pub(crate) fn new(command: String, failures: Vec<(String, CommandError)>) -> Self {
        debug_assert!(!failures.is_empty());
        Self { command, failures }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// The first failing instance in declared order.
    pub fn first(&self) -> (&str, &CommandError) {
        let (label, err) = &self.failures[0];
        (label.as_str(), err)
    }

    /// Every failing instance, in declared order.
    pub fn failures(&self) -> &[(String, CommandError)] {
        &self.failures
    }
}

impl fmt::Display for AggregateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (label, err) = self.first();
        write!(
            f,
            "multiremote command `{}` failed on instance `{}`: {}",
            self.command, label, err
        )?;
        if self.failures.len() > 1 {
            write!(f, " ({} more instance failures)", self.failures.len() - 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.failures[0].1)
    }
}

pub type Result<T> = std::result::Result<T, CommandError>;
