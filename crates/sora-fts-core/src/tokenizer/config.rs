//! Tokenizer configuration.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A character or token filter entry: filter kind plus its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub kind: String,
    #[serde(default = "empty_args")]
    pub args: Value,
}

fn empty_args() -> Value {
    json!({})
}

impl FilterConfig {
    pub fn new(kind: impl Into<String>, args: Value) -> Self {
        Self {
            kind: kind.into(),
            args,
        }
    }
}

/// Configuration for the Japanese tokenizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Dictionary kind. Only `ipadic` is embedded in this build.
    pub dictionary_kind: String,
    /// Segmenter mode: `normal` or `decompose`.
    pub mode: String,
    pub character_filters: Vec<FilterConfig>,
    pub token_filters: Vec<FilterConfig>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            dictionary_kind: "ipadic".to_string(),
            mode: "normal".to_string(),
            character_filters: vec![FilterConfig::new(
                "unicode_normalize",
                json!({ "kind": "nfkc" }),
            )],
            token_filters: vec![
                FilterConfig::new("lowercase", json!({})),
                FilterConfig::new(
                    "japanese_compound_word",
                    json!({
                        "kind": "ipadic",
                        "tags": ["名詞,数"],
                        "new_tag": "名詞,数",
                    }),
                ),
            ],
        }
    }
}
