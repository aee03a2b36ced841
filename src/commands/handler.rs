use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::browser::{Browser, Element};
use crate::errors::Result;

/// Future returned by a command handler.
pub type CommandFuture = BoxFuture<'static, Result<Value>>;

/// A registered command: an async callable bound at dispatch time to the
/// instance it was invoked on. Shared by reference once registered; the
/// registry never clones the underlying closure.
pub type CommandHandler = Arc<dyn Fn(CallContext, Vec<Value>) -> CommandFuture + Send + Sync>;

/// Adapt an async closure into a [`CommandHandler`].
pub fn command<F, Fut>(f: F) -> CommandHandler
where
    F: Fn(CallContext, Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    Arc::new(move |cx, args| -> CommandFuture { Box::pin(f(cx, args)) })
}

/// The instance a command was invoked on.
///
/// Handlers receive this as their first parameter so they can call back into
/// the owning instance's own surface, including other custom commands and
/// the script-execution primitive.
#[derive(Clone)]
pub enum CallContext {
    Browser(Browser),
    Element(Element),
}

impl CallContext {
    /// The root session, regardless of which instance was invoked.
    pub fn session(&self) -> &Browser {
        match self {
            CallContext::Browser(browser) => browser,
            CallContext::Element(element) => element.session(),
        }
    }

    /// The element this command was invoked on, if any.
    pub fn element(&self) -> Option<&Element> {
        match self {
            CallContext::Element(element) => Some(element),
            CallContext::Browser(_) => None,
        }
    }

    /// Invoke any command resolvable on this instance, custom or builtin.
    pub async fn invoke(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        match self {
            CallContext::Browser(browser) => browser.invoke(name, args).await,
            CallContext::Element(element) => element.invoke(name, args).await,
        }
    }

    /// The script-execution primitive of this instance.
    pub async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        match self {
            CallContext::Browser(browser) => browser.execute_script(script, args).await,
            CallContext::Element(element) => element.execute_script(script, args).await,
        }
    }

    pub fn locate(&self, selector: &str) -> Element {
        match self {
            CallContext::Browser(browser) => browser.locate(selector),
            CallContext::Element(element) => element.locate(selector),
        }
    }

    pub async fn locate_all(&self, selector: &str) -> Result<Vec<Element>> {
        match self {
            CallContext::Browser(browser) => browser.locate_all(selector).await,
            CallContext::Element(element) => element.locate_all(selector).await,
        }
    }
}
