//! Function event declarations

use serde::{Deserialize, Serialize};

/// An event source declared on a function
///
/// YAML shape:
/// ```yaml
/// events:
///   - http:
///       method: POST
///       path: /baz
///   - storage:
///       bucket: images
///       events: ["storage:ObjectCreated:*"]
/// ```
///
/// Unrecognized event types deserialize into `Other` so the graph compiler
/// can reject them with the offending key, before any provider call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Event {
    Http(HttpEvent),
    Storage(StorageEvent),
    #[serde(untagged)]
    Other(serde_json::Value),
}

impl Event {
    /// The declared event type key, for error reporting
    pub fn type_name(&self) -> String {
        match self {
            Event::Http(_) => "http".to_string(),
            Event::Storage(_) => "storage".to_string(),
            Event::Other(value) => value
                .as_object()
                .and_then(|map| map.keys().next().cloned())
                .unwrap_or_else(|| value.to_string()),
        }
    }
}

/// HTTP route event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpEvent {
    pub method: String,
    pub path: String,
}

/// Object-storage event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageEvent {
    pub bucket: String,
    pub events: Vec<String>,
    #[serde(default)]
    pub prefix: Option<String>,
}
