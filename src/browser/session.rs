use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::browser::Element;
use crate::commands::{CallContext, CommandHandler, CommandRegistry, CommandScope};
use crate::core::{SessionConfig, Transport};
use crate::errors::{CommandError, Result};

/// Root automation handle for one remote browser session.
///
/// Cheap to clone; all clones share the same command registry and transport.
/// The registry is consulted live on every dispatch, so commands registered
/// after an element or a clone was created are still visible on it.
#[derive(Clone)]
pub struct Browser {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: SessionConfig,
    registry: CommandRegistry,
    transport: Arc<dyn Transport>,
}

impl Browser {
    pub fn new(config: SessionConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                config,
                registry: CommandRegistry::new(),
                transport,
            }),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.inner.config.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub(crate) fn registry(&self) -> &CommandRegistry {
        &self.inner.registry
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.inner.transport
    }

    /// Register a custom command on this session.
    ///
    /// With [`CommandScope::ElementAlso`] the command also becomes resolvable
    /// on every element of this session, including elements located before
    /// the registration happened.
    pub fn register(&self, name: &str, handler: CommandHandler, scope: CommandScope) {
        self.inner.registry.register(name, handler, scope);
    }

    /// Look up a registered session command without invoking it.
    ///
    /// Builtins are not reported here; they are always invocable.
    pub fn command(&self, name: &str) -> Option<CommandHandler> {
        self.inner.registry.browser_command(name)
    }

    /// Handle to the first element matching `selector`. No remote round-trip
    /// happens here; resolution is the transport's business at use time.
    pub fn locate(&self, selector: &str) -> Element {
        Element::new(self.clone(), selector.to_string(), None)
    }

    /// Handles to every element matching `selector`, with 0-based ordinal
    /// indices in match order.
    pub async fn locate_all(&self, selector: &str) -> Result<Vec<Element>> {
        let count = self.inner.transport.count_matches(selector).await?;
        Ok((0..count)
            .map(|index| Element::new(self.clone(), selector.to_string(), Some(index)))
            .collect())
    }

    /// Invoke a command by name: registered session commands first, then
    /// builtins. The handler runs bound to this session and its result or
    /// error is returned unchanged.
    pub async fn invoke(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        if let Some(handler) = self.inner.registry.browser_command(name) {
            debug!(command = name, session = %self.inner.config.id, "dispatching session command");
            return handler(CallContext::Browser(self.clone()), args).await;
        }
        self.invoke_builtin(name, args).await
    }

    async fn invoke_builtin(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        match name {
            "executeScript" => {
                let (script, rest) = script_from_args(name, args)?;
                self.execute_script(&script, rest).await
            }
            "getTitle" => self.get_title().await.map(Value::String),
            "getUrl" => self.get_url().await.map(Value::String),
            _ => Err(CommandError::CommandNotFound(name.to_string())),
        }
    }

    /// Run a script in the remote browser. This is the primitive custom
    /// commands compose with.
    pub async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.inner.transport.execute_script(script, &args).await
    }

    pub async fn get_title(&self) -> Result<String> {
        self.inner.transport.title().await
    }

    pub async fn get_url(&self) -> Result<String> {
        self.inner.transport.url().await
    }
}

/// Split a dynamic `executeScript` argument list into script and script args.
pub(crate) fn script_from_args(command: &str, mut args: Vec<Value>) -> Result<(String, Vec<Value>)> {
    if args.is_empty() {
        return Err(CommandError::invalid_arguments(
            command,
            "expected a script as first argument",
        ));
    }
    let rest = args.split_off(1);
    match args.pop() {
        Some(Value::String(script)) => Ok((script, rest)),
        _ => Err(CommandError::invalid_arguments(
            command,
            "script must be a string",
        )),
    }
}
