//! Tool catalog: the structured description of invocable actions exposed to
//! the language model, plus the dispatch table from tool name to action.

pub mod catalog;
pub mod schema;

pub use catalog::{ToolCatalog, ToolError, ToolHandler, ToolReply};
pub use schema::{ArgSpec, CatalogError, SchemaType, ToolSpec};
