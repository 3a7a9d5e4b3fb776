use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Build the cache key for an operation and its (defaults-applied) parameters.
///
/// Parameters are serialized with keys in sorted order, so the key does not
/// depend on the order in which the pairs were produced. A repeated name keeps
/// its last value.
pub fn cache_key<'a, I>(operation: &str, params: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let sorted: BTreeMap<&str, &str> = params.into_iter().collect();

    // Inserted in sorted order so the output is canonical even when serde_json
    // is built with `preserve_order`.
    let mut object = Map::with_capacity(sorted.len());
    for (name, value) in sorted {
        object.insert(name.to_string(), Value::String(value.to_string()));
    }

    format!("{}:{}", operation, Value::Object(object))
}
