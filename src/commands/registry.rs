use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::commands::CommandHandler;

/// Whether a command registered on a session is also resolvable on the
/// session's elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandScope {
    BrowserOnly,
    ElementAlso,
}

/// Per-session command tables.
///
/// One registry is owned by the root session and referenced, never copied,
/// by every element spawned from it. Tables grow monotonically; there is no
/// removal. Lookups clone the handler `Arc` out so no lock is held while a
/// command runs.
pub struct CommandRegistry {
    browser: RwLock<HashMap<String, CommandHandler>>,
    element: RwLock<HashMap<String, CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            browser: RwLock::new(HashMap::new()),
            element: RwLock::new(HashMap::new()),
        }
    }

    /// Register a command at browser scope, and at element scope as well
    /// when `scope` says so. Re-registering a name replaces the handler.
    pub fn register(&self, name: &str, handler: CommandHandler, scope: CommandScope) {
        debug!(command = name, ?scope, "registering session command");
        if scope == CommandScope::ElementAlso {
            self.element
                .write()
                .insert(name.to_string(), handler.clone());
        }
        self.browser.write().insert(name.to_string(), handler);
    }

    pub fn browser_command(&self, name: &str) -> Option<CommandHandler> {
        self.browser.read().get(name).cloned()
    }

    pub fn element_command(&self, name: &str) -> Option<CommandHandler> {
        self.element.read().get(name).cloned()
    }

    pub fn browser_commands(&self) -> Vec<String> {
        self.browser.read().keys().cloned().collect()
    }

    pub fn element_commands(&self) -> Vec<String> {
        self.element.read().keys().cloned().collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::command;
    use serde_json::json;

    fn noop() -> CommandHandler {
        command(|_cx, _args| async { Ok(json!(null)) })
    }

    #[test]
    fn browser_only_stays_out_of_element_table() {
        let registry = CommandRegistry::new();
        registry.register("mytest", noop(), CommandScope::BrowserOnly);

        assert!(registry.browser_command("mytest").is_some());
        assert!(registry.element_command("mytest").is_none());
    }

    #[test]
    fn element_also_lands_in_both_tables() {
        let registry = CommandRegistry::new();
        registry.register("highlight", noop(), CommandScope::ElementAlso);

        assert!(registry.browser_command("highlight").is_some());
        assert!(registry.element_command("highlight").is_some());
    }

    #[test]
    fn re_registration_replaces() {
        let registry = CommandRegistry::new();
        registry.register("probe", noop(), CommandScope::BrowserOnly);
        registry.register("probe", noop(), CommandScope::BrowserOnly);

        assert_eq!(registry.browser_commands(), vec!["probe".to_string()]);
    }
}
