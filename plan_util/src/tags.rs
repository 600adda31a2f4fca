use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A map of string key/value pairs, like OpenStreetMap tags. GeoJSON properties that aren't
/// strings are stringified on the way in, so numeric `lanes` or boolean `oneway` still work.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    pub fn empty() -> Tags {
        Tags(BTreeMap::new())
    }

    /// Flattens JSON properties into tags. Nulls, arrays and objects are skipped.
    pub fn from_json_properties<'a, I: IntoIterator<Item = (&'a String, &'a serde_json::Value)>>(
        props: I,
    ) -> Tags {
        let mut tags = Tags::empty();
        for (key, value) in props {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                _ => continue,
            };
            tags.insert(key, value);
        }
        tags
    }

    pub fn get(&self, k: &str) -> Option<&String> {
        self.0.get(k)
    }

    pub fn contains_key(&self, k: &str) -> bool {
        self.0.contains_key(k)
    }

    pub fn is(&self, k: &str, v: &str) -> bool {
        self.0.get(k) == Some(&v.to_string())
    }

    pub fn is_any(&self, k: &str, values: Vec<&str>) -> bool {
        if let Some(v) = self.0.get(k) {
            values.contains(&v.as_ref())
        } else {
            false
        }
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, k: K, v: V) {
        self.0.insert(k.into(), v.into());
    }
}
