//! Registry of invocable tools and the name-to-handler dispatch table.

use crate::tools::schema::{build_schema, CatalogError, ToolSpec};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("missing or invalid argument '{0}'")]
    BadArgument(String),
    #[error("unknown target '{0}'")]
    UnknownTarget(String),
    #[error("{0}")]
    Failed(String),
}

/// What a tool invocation hands back to the conversation path.
#[derive(Debug, Default)]
pub struct ToolReply {
    /// Optional user-facing message supplied by the caller of the tool,
    /// expected (but not required) to follow the
    /// `<think>...</think><content>...</content>` convention.
    pub message_for_user: Option<String>,
}

pub trait ToolHandler: Send + Sync {
    fn invoke(&self, args: &Value) -> Result<ToolReply, ToolError>;
}

struct ToolEntry {
    name: String,
    schema: Value,
    handler: Arc<dyn ToolHandler>,
}

/// The tool catalog sent with every chat request. Entries are immutable
/// after construction; schema problems abort registration instead of
/// surfacing mid-conversation.
#[derive(Default)]
pub struct ToolCatalog {
    entries: Vec<ToolEntry>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and store the schema entry for one action. Fails loudly on an
    /// unmapped declared argument type: that is a developer error and must
    /// not reach a running session.
    pub fn register(
        &mut self,
        spec: ToolSpec,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), CatalogError> {
        let schema = build_schema(&spec)?;
        debug!("[Tools] registered '{}'", spec.name);
        self.entries.push(ToolEntry {
            name: spec.name,
            schema,
            handler,
        });
        Ok(())
    }

    /// The full schema list, in registration order.
    pub fn schemas(&self) -> Vec<Value> {
        self.entries.iter().map(|e| e.schema.clone()).collect()
    }

    /// Linear lookup by name. `None` means the model asked for a tool that
    /// was never exposed, which is an expected, recoverable event.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| Arc::clone(&e.handler))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::schema::ArgSpec;
    use serde_json::json;

    struct EchoHandler;

    impl ToolHandler for EchoHandler {
        fn invoke(&self, args: &Value) -> Result<ToolReply, ToolError> {
            let message = args
                .get("messageForUser")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            Ok(ToolReply {
                message_for_user: message,
            })
        }
    }

    fn echo_spec(name: &str) -> ToolSpec {
        ToolSpec {
            name: name.to_string(),
            description: "test tool".to_string(),
            args: vec![ArgSpec::new("messageForUser", "str", "")],
        }
    }

    #[test]
    fn resolve_finds_registered_tools_and_misses_unknown() {
        let mut catalog = ToolCatalog::new();
        catalog
            .register(echo_spec("wave"), Arc::new(EchoHandler))
            .unwrap();

        assert!(catalog.resolve("wave").is_some());
        assert!(catalog.resolve("somersault").is_none());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn registered_handler_is_invocable() {
        let mut catalog = ToolCatalog::new();
        catalog
            .register(echo_spec("wave"), Arc::new(EchoHandler))
            .unwrap();

        let handler = catalog.resolve("wave").unwrap();
        let reply = handler
            .invoke(&json!({ "messageForUser": "<content>hi</content>" }))
            .unwrap();
        assert_eq!(reply.message_for_user.as_deref(), Some("<content>hi</content>"));
    }

    #[test]
    fn bad_spec_never_enters_the_catalog() {
        let mut catalog = ToolCatalog::new();
        let spec = ToolSpec {
            name: "bad".to_string(),
            description: String::new(),
            args: vec![ArgSpec::new("x", "matrix", "")],
        };
        assert!(catalog.register(spec, Arc::new(EchoHandler)).is_err());
        assert!(catalog.is_empty());
    }

    #[test]
    fn schemas_preserve_registration_order() {
        let mut catalog = ToolCatalog::new();
        catalog
            .register(echo_spec("first"), Arc::new(EchoHandler))
            .unwrap();
        catalog
            .register(echo_spec("second"), Arc::new(EchoHandler))
            .unwrap();

        let schemas = catalog.schemas();
        assert_eq!(schemas[0]["function"]["name"], "first");
        assert_eq!(schemas[1]["function"]["name"], "second");
    }
}
