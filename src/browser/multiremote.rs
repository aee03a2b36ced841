use std::collections::HashMap;

use futures_util::future::join_all;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, warn};

use crate::browser::Browser;
use crate::commands::{CommandHandler, CommandScope};
use crate::core::{MultiremoteConfig, SessionFactory};
use crate::errors::{AggregateFailure, CommandError, Result};

/// Composite handle over multiple independent sessions.
///
/// Presents the single-session command surface as a fan-out: one invocation
/// runs concurrently against every instance and results come back in
/// declared instance order. Each underlying session stays individually
/// addressable by label.
pub struct MultiremoteBrowser {
    instances: Vec<(String, Browser)>,
    aggregate: RwLock<HashMap<String, CommandHandler>>,
}

impl MultiremoteBrowser {
    /// Construct one session per configured instance, in declared order,
    /// through the session factory collaborator.
    pub async fn new(config: MultiremoteConfig, factory: &dyn SessionFactory) -> Result<Self> {
        let mut instances: Vec<(String, Browser)> = Vec::with_capacity(config.instances.len());
        for entry in &config.instances {
            if instances.iter().any(|(label, _)| label == &entry.label) {
                return Err(CommandError::DuplicateLabel(entry.label.clone()));
            }
            let browser = factory.create(&entry.label, &entry.session).await?;
            instances.push((entry.label.clone(), browser));
        }
        Ok(Self {
            instances,
            aggregate: RwLock::new(HashMap::new()),
        })
    }

    /// Instance labels in declared order.
    pub fn labels(&self) -> Vec<&str> {
        self.instances
            .iter()
            .map(|(label, _)| label.as_str())
            .collect()
    }

    /// The raw session behind `label`. Registrations made directly on it
    /// affect only that session.
    pub fn instance(&self, label: &str) -> Option<&Browser> {
        self.instances
            .iter()
            .find(|(candidate, _)| candidate == label)
            .map(|(_, browser)| browser)
    }

    /// Register a command on the aggregate and on every instance's session
    /// scope. A later [`MultiremoteBrowser::invoke`] of `name` fans out.
    pub fn register(&self, name: &str, handler: CommandHandler) {
        debug!(command = name, instances = self.instances.len(), "registering aggregate command");
        for (_, browser) in &self.instances {
            browser.register(name, handler.clone(), CommandScope::BrowserOnly);
        }
        self.aggregate
            .write()
            .insert(name.to_string(), handler);
    }

    /// Look up an aggregate-registered command without invoking it.
    pub fn command(&self, name: &str) -> Option<CommandHandler> {
        self.aggregate.read().get(name).cloned()
    }

    /// Invoke `name` concurrently on every instance and gather results in
    /// declared instance order.
    ///
    /// All instances settle before this returns. If any failed, the call
    /// rejects with the first-declared-order failing instance's error as
    /// primary; the remaining failures ride along on [`AggregateFailure`].
    pub async fn invoke(&self, name: &str, args: Vec<Value>) -> Result<Vec<Value>> {
        let calls = self
            .instances
            .iter()
            .map(|(_, browser)| browser.invoke(name, args.clone()));
        let settled = join_all(calls).await;

        let mut results = Vec::with_capacity(self.instances.len());
        let mut failures = Vec::new();
        for ((label, _), outcome) in self.instances.iter().zip(settled) {
            match outcome {
                Ok(value) => results.push(value),
                Err(err) => failures.push((label.clone(), err)),
            }
        }

        if failures.is_empty() {
            Ok(results)
        } else {
            warn!(
                command = name,
                failed = failures.len(),
                total = self.instances.len(),
                "multiremote fan-out failed"
            );
            Err(CommandError::Aggregate(
                AggregateFailure::new(name.to_string(), failures).into(),
            ))
        }
    }
}
