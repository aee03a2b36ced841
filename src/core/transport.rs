use crate::browser::Browser;
use crate::core::SessionConfig;
use crate::errors::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Connection to one remote browser.
///
/// This is the seam between command dispatch and the wire: script execution
/// plus the minimal element queries the builtin commands need. How calls are
/// encoded, retried, or timed out is entirely the implementation's business.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Run a script in the remote browser and return its value.
    async fn execute_script(&self, script: &str, args: &[Value]) -> Result<Value>;

    /// Visible text of the matched element.
    async fn element_text(&self, selector: &str, index: Option<usize>) -> Result<String>;

    /// Click the matched element.
    async fn click(&self, selector: &str, index: Option<usize>) -> Result<()>;

    /// Attribute value of the matched element, `None` when absent.
    async fn attribute(
        &self,
        selector: &str,
        index: Option<usize>,
        name: &str,
    ) -> Result<Option<String>>;

    /// Number of nodes currently matching `selector`.
    async fn count_matches(&self, selector: &str) -> Result<usize>;

    /// Title of the current page.
    async fn title(&self) -> Result<String>;

    /// URL of the current page.
    async fn url(&self) -> Result<String>;
}

/// Constructs ready sessions from opaque per-instance configuration.
///
/// Multiremote construction goes through this so that transport setup stays
/// outside the dispatch core.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn create(&self, label: &str, config: &SessionConfig) -> Result<Browser>;
}
