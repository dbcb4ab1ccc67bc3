use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod client;

pub use client::BlogClient;

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Post {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// One record of the list endpoint. Fields are kept as the API sent them;
/// the id is a number on some endpoints and a string on others.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct PostMeta {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub title: Value,
    #[serde(default)]
    pub meta_title: Value,
    #[serde(default)]
    pub meta_description: Value,
}

impl PostMeta {
    pub fn id_text(&self) -> String {
        field_text(&self.id)
    }

    /// `<id>.docx`, or empty when the record has no id.
    pub fn docx_filename(&self) -> String {
        let id = self.id_text();
        if id.trim().is_empty() {
            String::new()
        } else {
            format!("{}.docx", id)
        }
    }
}

/// Strings as they are, null as empty, anything else as JSON text.
pub fn field_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The list endpoint returns either a bare array or a paginated page.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum Listing {
    Plain(Vec<PostMeta>),
    Page {
        results: Vec<PostMeta>,
        #[serde(default)]
        next: Option<String>,
    },
}
