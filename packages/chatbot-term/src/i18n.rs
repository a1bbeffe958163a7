use serde_json::Value;
use std::collections::HashMap;

/// UI strings from the bundled English catalogue
#[derive(Clone, Debug)]
pub struct I18n {
    messages: HashMap<String, String>,
}

impl I18n {
    pub fn load() -> Self {
        Self {
            messages: parse_catalogue(include_str!("../i18n/en.json")),
        }
    }

    pub fn t(&self, key: &str) -> String {
        self.messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    pub fn format(&self, key: &str, params: &[(&str, &str)]) -> String {
        let mut value = self.t(key);
        for (param, replacement) in params {
            value = value.replace(&format!("{{{param}}}"), replacement);
        }
        value
    }
}

/// Flat `key -> string` map; non-string values are skipped.
fn parse_catalogue(raw: &str) -> HashMap<String, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map
            .into_iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
            .collect(),
        _ => {
            tracing::warn!("UI catalogue is not a JSON object; showing raw keys");
            HashMap::new()
        }
    }
}
