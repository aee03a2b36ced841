use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use crate::browser::session::script_from_args;
use crate::browser::Browser;
use crate::commands::{CallContext, CommandHandler};
use crate::errors::{CommandError, Result};

/// Handle to a located element.
///
/// Carries a private command table visible only on this exact instance, and
/// a handle to the root session whose element-scoped table is consulted live
/// on every dispatch. Sub-elements at any nesting depth are wired to the
/// same root session, never to the intermediate element.
#[derive(Clone)]
pub struct Element {
    inner: Arc<ElementInner>,
}

struct ElementInner {
    selector: String,
    index: Option<usize>,
    own: RwLock<HashMap<String, CommandHandler>>,
    session: Browser,
}

impl Element {
    pub(crate) fn new(session: Browser, selector: String, index: Option<usize>) -> Self {
        Self {
            inner: Arc::new(ElementInner {
                selector,
                index,
                own: RwLock::new(HashMap::new()),
                session,
            }),
        }
    }

    pub fn selector(&self) -> &str {
        &self.inner.selector
    }

    /// Ordinal within the collection this element came from, if any.
    pub fn index(&self) -> Option<usize> {
        self.inner.index
    }

    /// The root session this element belongs to.
    pub fn session(&self) -> &Browser {
        &self.inner.session
    }

    /// Register a command on this exact instance. Siblings from the same
    /// query, the session, and re-queries of the same selector are not
    /// affected.
    pub fn register(&self, name: &str, handler: CommandHandler) {
        debug!(command = name, selector = %self.inner.selector, "registering element command");
        self.inner.own.write().insert(name.to_string(), handler);
    }

    /// Resolve a registered command: this instance's table first, then the
    /// session's element-scoped table. Builtins are not reported here.
    pub fn command(&self, name: &str) -> Option<CommandHandler> {
        let own = self.inner.own.read().get(name).cloned();
        own.or_else(|| self.inner.session.registry().element_command(name))
    }

    /// Handle to the first descendant matching `selector`, wired to the
    /// root session.
    pub fn locate(&self, selector: &str) -> Element {
        Element::new(
            self.inner.session.clone(),
            self.derived_selector(selector),
            None,
        )
    }

    /// Handles to every descendant matching `selector`, each wired to the
    /// root session with its own ordinal index.
    pub async fn locate_all(&self, selector: &str) -> Result<Vec<Element>> {
        let derived = self.derived_selector(selector);
        let count = self.inner.session.transport().count_matches(&derived).await?;
        Ok((0..count)
            .map(|index| Element::new(self.inner.session.clone(), derived.clone(), Some(index)))
            .collect())
    }

    fn derived_selector(&self, selector: &str) -> String {
        format!("{} {}", self.inner.selector, selector)
    }

    /// Invoke a command by name against this element, following the chain
    /// own table → session element table → builtins. The handler runs bound
    /// to this element and its result or error is returned unchanged.
    pub async fn invoke(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        if let Some(handler) = self.command(name) {
            debug!(command = name, selector = %self.inner.selector, "dispatching element command");
            return handler(CallContext::Element(self.clone()), args).await;
        }
        self.invoke_builtin(name, args).await
    }

    async fn invoke_builtin(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        match name {
            "getText" => self.get_text().await.map(Value::String),
            "click" => self.click().await.map(|_| Value::Null),
            "getAttribute" => {
                let attr = match args.first() {
                    Some(Value::String(attr)) => attr.clone(),
                    _ => {
                        return Err(CommandError::invalid_arguments(
                            name,
                            "expected an attribute name",
                        ))
                    }
                };
                Ok(self
                    .get_attribute(&attr)
                    .await?
                    .map(Value::String)
                    .unwrap_or(Value::Null))
            }
            "executeScript" => {
                let (script, rest) = script_from_args(name, args)?;
                self.execute_script(&script, rest).await
            }
            _ => Err(CommandError::CommandNotFound(name.to_string())),
        }
    }

    /// Script execution scoped to this element: delegates to the root
    /// session with the element selector prepended to the script args.
    pub async fn execute_script(&self, script: &str, mut args: Vec<Value>) -> Result<Value> {
        args.insert(0, Value::String(self.inner.selector.clone()));
        self.inner.session.execute_script(script, args).await
    }

    pub async fn get_text(&self) -> Result<String> {
        self.inner
            .session
            .transport()
            .element_text(&self.inner.selector, self.inner.index)
            .await
    }

    pub async fn click(&self) -> Result<()> {
        self.inner
            .session
            .transport()
            .click(&self.inner.selector, self.inner.index)
            .await
    }

    pub async fn get_attribute(&self, name: &str) -> Result<Option<String>> {
        self.inner
            .session
            .transport()
            .attribute(&self.inner.selector, self.inner.index, name)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{command, CommandScope};
    use crate::testing::{scripted_browser, ScriptedTransport};
    use serde_json::json;

    #[tokio::test]
    async fn element_scope_reaches_existing_and_future_elements() {
        let transport = ScriptedTransport::new().with_script_result(json!(1));
        let browser = scripted_browser(transport);

        let before = browser.locate("#before");
        browser.register(
            "myCustomElementCommand",
            command(|cx, _args| async move {
                cx.execute_script("return 1", vec![]).await
            }),
            CommandScope::ElementAlso,
        );
        let after = browser.locate("#after");

        assert_eq!(
            before
                .invoke("myCustomElementCommand", vec![])
                .await
                .unwrap(),
            json!(1)
        );
        assert_eq!(
            after.invoke("myCustomElementCommand", vec![]).await.unwrap(),
            json!(1)
        );
    }

    #[tokio::test]
    async fn own_commands_stay_on_the_exact_instance() {
        let transport = ScriptedTransport::new().with_count(".row", 3);
        let browser = scripted_browser(transport);

        let rows = browser.locate_all(".row").await.unwrap();
        rows[1].register("onlyHere", command(|_cx, _args| async { Ok(json!("own")) }));

        assert_eq!(rows[1].invoke("onlyHere", vec![]).await.unwrap(), json!("own"));
        assert!(rows[0].command("onlyHere").is_none());
        assert!(rows[2].command("onlyHere").is_none());
        assert!(browser.command("onlyHere").is_none());

        // A fresh query for the same selector yields fresh instances.
        let requeried = browser.locate_all(".row").await.unwrap();
        assert!(requeried[1].command("onlyHere").is_none());
    }

    #[tokio::test]
    async fn collection_members_are_indexed_in_order() {
        let transport = ScriptedTransport::new().with_count("li", 4);
        let browser = scripted_browser(transport);

        let items = browser.locate_all("li").await.unwrap();
        assert_eq!(items.len(), 4);
        for (expected, element) in items.iter().enumerate() {
            assert_eq!(element.index(), Some(expected));
            assert_eq!(element.selector(), "li");
        }
    }

    #[tokio::test]
    async fn nested_elements_inherit_session_commands_at_any_depth() {
        let transport = ScriptedTransport::new()
            .with_count("ul li", 2)
            .with_count("ul li a span", 1);
        let browser = scripted_browser(transport);

        let list = browser.locate("ul");
        let items = list.locate_all("li").await.unwrap();
        let link = items[1].locate("a");
        let deep = link.locate_all("span").await.unwrap();

        // Registered after the whole chain of handles was built.
        browser.register(
            "tagIt",
            command(|_cx, _args| async { Ok(json!("tagged")) }),
            CommandScope::ElementAlso,
        );

        assert_eq!(deep[0].invoke("tagIt", vec![]).await.unwrap(), json!("tagged"));
        assert_eq!(deep[0].session().session_id(), browser.session_id());
    }

    #[tokio::test]
    async fn own_table_wins_over_session_element_table() {
        let browser = scripted_browser(ScriptedTransport::new());
        browser.register(
            "describe",
            command(|_cx, _args| async { Ok(json!("session")) }),
            CommandScope::ElementAlso,
        );

        let element = browser.locate("#special");
        element.register("describe", command(|_cx, _args| async { Ok(json!("own")) }));

        assert_eq!(element.invoke("describe", vec![]).await.unwrap(), json!("own"));
        let sibling = browser.locate("#plain");
        assert_eq!(
            sibling.invoke("describe", vec![]).await.unwrap(),
            json!("session")
        );
    }

    #[tokio::test]
    async fn handler_sees_the_element_it_was_invoked_on() {
        let browser = scripted_browser(ScriptedTransport::new());
        browser.register(
            "whichSelector",
            command(|cx, _args| async move {
                let element = cx.element().expect("invoked on an element");
                Ok(json!(element.selector()))
            }),
            CommandScope::ElementAlso,
        );

        let element = browser.locate("#target");
        assert_eq!(
            element.invoke("whichSelector", vec![]).await.unwrap(),
            json!("#target")
        );
    }

    #[tokio::test]
    async fn builtins_work_through_dynamic_dispatch() {
        let transport = ScriptedTransport::new()
            .with_text("#label", "hello")
            .with_attribute("#label", "role", "status");
        let browser = scripted_browser(transport);
        let element = browser.locate("#label");

        assert_eq!(
            element.invoke("getText", vec![]).await.unwrap(),
            json!("hello")
        );
        assert_eq!(
            element
                .invoke("getAttribute", vec![json!("role")])
                .await
                .unwrap(),
            json!("status")
        );
        assert_eq!(
            element.invoke("getAttribute", vec![json!("missing")]).await.unwrap(),
            Value::Null
        );
        assert_eq!(element.invoke("click", vec![]).await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn element_script_args_carry_the_selector() {
        let transport = ScriptedTransport::new().with_script_result(json!(true));
        let browser = scripted_browser(transport.clone());
        let element = browser.locate("#form input");

        element
            .execute_script("return arguments[0]", vec![json!("extra")])
            .await
            .unwrap();

        let scripts = transport.script_calls();
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].1[0], json!("#form input"));
        assert_eq!(scripts[0].1[1], json!("extra"));
    }
}
