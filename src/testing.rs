//! Test support: a programmable in-memory transport and session factory.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::browser::Browser;
use crate::core::{SessionConfig, SessionFactory, Transport};
use crate::errors::{CommandError, Result};

/// In-memory [`Transport`] with scripted responses and a call log.
///
/// Clones share state, so a test can keep a handle for assertions after
/// handing the transport to a session.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    state: Arc<Mutex<ScriptedState>>,
}

#[derive(Default)]
struct ScriptedState {
    script_result: Value,
    script_failure: Option<String>,
    texts: HashMap<String, String>,
    attributes: HashMap<(String, String), String>,
    counts: HashMap<String, usize>,
    title: String,
    url: String,
    script_calls: Vec<(String, Vec<Value>)>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every script execution resolves with `value`.
    pub fn with_script_result(self, value: Value) -> Self {
        self.state.lock().script_result = value;
        self
    }

    /// Every script execution fails with a transport error.
    pub fn fail_scripts(self, message: impl Into<String>) -> Self {
        self.state.lock().script_failure = Some(message.into());
        self
    }

    pub fn with_text(self, selector: &str, text: &str) -> Self {
        self.state
            .lock()
            .texts
            .insert(selector.to_string(), text.to_string());
        self
    }

    pub fn with_attribute(self, selector: &str, name: &str, value: &str) -> Self {
        self.state
            .lock()
            .attributes
            .insert((selector.to_string(), name.to_string()), value.to_string());
        self
    }

    /// Number of matches reported for `selector` by find-all queries.
    pub fn with_count(self, selector: &str, count: usize) -> Self {
        self.state.lock().counts.insert(selector.to_string(), count);
        self
    }

    pub fn with_title(self, title: &str) -> Self {
        self.state.lock().title = title.to_string();
        self
    }

    pub fn with_url(self, url: &str) -> Self {
        self.state.lock().url = url.to_string();
        self
    }

    /// Every script execution seen so far, as `(script, args)` pairs.
    pub fn script_calls(&self) -> Vec<(String, Vec<Value>)> {
        self.state.lock().script_calls.clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute_script(&self, script: &str, args: &[Value]) -> Result<Value> {
        let mut state = self.state.lock();
        state
            .script_calls
            .push((script.to_string(), args.to_vec()));
        if let Some(message) = &state.script_failure {
            return Err(CommandError::Transport(message.clone()));
        }
        Ok(state.script_result.clone())
    }

    async fn element_text(&self, selector: &str, _index: Option<usize>) -> Result<String> {
        self.state
            .lock()
            .texts
            .get(selector)
            .cloned()
            .ok_or_else(|| CommandError::Transport(format!("no text scripted for `{selector}`")))
    }

    async fn click(&self, _selector: &str, _index: Option<usize>) -> Result<()> {
        Ok(())
    }

    async fn attribute(
        &self,
        selector: &str,
        _index: Option<usize>,
        name: &str,
    ) -> Result<Option<String>> {
        Ok(self
            .state
            .lock()
            .attributes
            .get(&(selector.to_string(), name.to_string()))
            .cloned())
    }

    async fn count_matches(&self, selector: &str) -> Result<usize> {
        Ok(self
            .state
            .lock()
            .counts
            .get(selector)
            .copied()
            .unwrap_or(0))
    }

    async fn title(&self) -> Result<String> {
        Ok(self.state.lock().title.clone())
    }

    async fn url(&self) -> Result<String> {
        Ok(self.state.lock().url.clone())
    }
}

/// Session backed by the given scripted transport, with default config.
pub fn scripted_browser(transport: ScriptedTransport) -> Browser {
    Browser::new(SessionConfig::default(), Arc::new(transport))
}

/// [`SessionFactory`] that hands out pre-scripted transports by instance
/// label. Unknown labels get a fresh default transport.
#[derive(Default)]
pub struct ScriptedSessionFactory {
    transports: Mutex<HashMap<String, ScriptedTransport>>,
}

impl ScriptedSessionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instance(self, label: &str, transport: ScriptedTransport) -> Self {
        self.transports
            .lock()
            .insert(label.to_string(), transport);
        self
    }
}

#[async_trait]
impl SessionFactory for ScriptedSessionFactory {
    async fn create(&self, label: &str, config: &SessionConfig) -> Result<Browser> {
        let transport = self
            .transports
            .lock()
            .get(label)
            .cloned()
            .unwrap_or_default();
        Ok(Browser::new(config.clone(), Arc::new(transport)))
    }
}
