//! Tool-call types: streamed fragments and assembled calls

use serde::{Deserialize, Serialize};

/// One streamed piece of a tool call.
///
/// The first fragment for an index normally carries `id` and `name`;
/// follow-ups carry argument text only and are matched by `index`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallFragment {
    /// Position of the call within the assistant message
    pub index: usize,
    /// Call ID (present on the first fragment, filled in by the tracker afterwards)
    pub id: Option<String>,
    /// Function name (present on the first fragment)
    pub name: Option<String>,
    /// Incremental JSON argument text
    pub arguments: Option<String>,
}

/// A tool call assembled from its fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub r#type: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Concatenated argument text; not validated as JSON
    pub arguments: String,
}

impl ToolCall {
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            r#type: "function".to_string(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    /// Parse the accumulated arguments as JSON.
    pub fn parsed_arguments(&self) -> Result<serde_json::Value, serde_json::Error> {
        if self.function.arguments.trim().is_empty() {
            return Ok(serde_json::Value::Object(Default::default()));
        }
        serde_json::from_str(&self.function.arguments)
    }
}
