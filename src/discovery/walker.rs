use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::json_path::FieldPath;

use super::DiscoveryOptions;

/// Enumerates every addressable path in `doc`, in first-encounter order.
///
/// Each object key becomes a path. Nested objects and arrays whose first
/// element is an object are expanded while the path is shorter than
/// `max_depth`; past that the branch stays a single opaque leaf.
pub fn enumerate_fields(doc: &Value, options: &DiscoveryOptions) -> Vec<FieldPath> {
    let mut collector = Collector::new(options);

    match doc {
        Value::Object(map) => collector.walk_object(map, &FieldPath::new(""), 0),
        Value::Array(items) => {
            // Top-level arrays are addressed through the bare marker: `[].key`.
            if let Some(Value::Object(first)) = items.first() {
                collector.walk_object(first, &FieldPath::new("").first_of(), 1);
            }
        }
        _ => {}
    }

    collector.fields
}

struct Collector<'o> {
    options: &'o DiscoveryOptions,
    seen: HashSet<FieldPath>,
    fields: Vec<FieldPath>,
}

impl<'o> Collector<'o> {
    fn new(options: &'o DiscoveryOptions) -> Self {
        Self {
            options,
            seen: HashSet::new(),
            fields: Vec::new(),
        }
    }

    fn is_full(&self) -> bool {
        self.fields.len() >= self.options.max_fields
    }

    fn record(&mut self, path: FieldPath) {
        if self.is_full() {
            return;
        }
        if self.seen.insert(path.clone()) {
            self.fields.push(path);
        }
    }

    /// `depth` is the number of segments already in `prefix`.
    fn walk_object(&mut self, map: &Map<String, Value>, prefix: &FieldPath, depth: usize) {
        for (key, value) in map {
            if self.is_full() {
                return;
            }

            let path = prefix.child(key);
            self.record(path.clone());

            let child_depth = depth + 1;
            if child_depth >= self.options.max_depth {
                continue;
            }

            match value {
                Value::Object(child) => self.walk_object(child, &path, child_depth),
                Value::Array(items) => {
                    if let Some(Value::Object(first)) = items.first() {
                        self.walk_object(first, &path.first_of(), child_depth);
                    }
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_path::resolve;
    use serde_json::json;

    fn paths(doc: &Value) -> Vec<String> {
        enumerate_fields(doc, &DiscoveryOptions::default())
            .into_iter()
            .map(FieldPath::into_string)
            .collect()
    }

    #[test]
    fn nested_leaf_is_discovered_and_resolvable() {
        let doc = json!({"a": {"b": 5}});
        let fields = paths(&doc);
        assert_eq!(fields, vec!["a", "a.b"]);
        assert_eq!(resolve(&doc, "a.b"), Some(&json!(5)));
    }

    #[test]
    fn arrays_of_objects_use_marker() {
        let doc = json!({"items": [{"id": 1, "name": "x"}, {"id": 2, "name": "y"}]});
        let fields = paths(&doc);
        assert_eq!(fields, vec!["items", "items[].id", "items[].name"]);
        assert_eq!(resolve(&doc, "items[].id"), Some(&json!(1)));
    }

    #[test]
    fn scalar_and_empty_arrays_are_leaves() {
        let doc = json!({"tags": ["a", "b"], "empty": [], "price": 1.5});
        assert_eq!(paths(&doc), vec!["tags", "empty", "price"]);
    }

    #[test]
    fn keeps_source_key_order() {
        let doc = json!({"zeta": 1, "alpha": 2, "mid": {"y": 1, "b": 2}});
        assert_eq!(paths(&doc), vec!["zeta", "alpha", "mid", "mid.y", "mid.b"]);
    }

    #[test]
    fn depth_is_bounded() {
        let mut doc = json!(1);
        for level in (0..50).rev() {
            doc = json!({ format!("k{level}"): doc });
        }
        let options = DiscoveryOptions {
            max_depth: 3,
            ..DiscoveryOptions::default()
        };
        let fields = enumerate_fields(&doc, &options);
        assert_eq!(
            fields.iter().map(FieldPath::as_str).collect::<Vec<_>>(),
            vec!["k0", "k0.k1", "k0.k1.k2"]
        );
        assert!(fields.iter().all(|field| field.depth() <= 3));
    }

    #[test]
    fn array_branches_count_toward_depth() {
        let doc = json!({"a": [{"b": [{"c": {"d": {"e": 1}}}]}]});
        let fields = paths(&doc);
        assert_eq!(fields, vec!["a", "a[].b", "a[].b[].c", "a[].b[].c.d"]);
    }

    #[test]
    fn duplicate_paths_are_emitted_once() {
        // A literal dotted key collides with the nested path it spells out.
        let doc = json!({"a.b": 1, "a": {"b": 2, "c": 3}});
        let fields = paths(&doc);
        assert_eq!(fields, vec!["a.b", "a", "a.c"]);
    }

    #[test]
    fn order_is_stable_across_calls() {
        let doc = json!({
            "quotes": [{"symbol": "AAPL", "price": 1.0}],
            "meta": {"source": "x", "page": {"n": 1}}
        });
        assert_eq!(paths(&doc), paths(&doc));
    }

    #[test]
    fn top_level_array_uses_bare_marker() {
        let doc = json!([{"symbol": "AAPL", "quote": {"last": 1.0}}]);
        let fields = paths(&doc);
        assert_eq!(fields, vec!["[].symbol", "[].quote", "[].quote.last"]);
        assert_eq!(resolve(&doc, "[].quote.last"), Some(&json!(1.0)));
    }

    #[test]
    fn scalar_documents_have_no_fields() {
        assert!(paths(&json!(42)).is_empty());
        assert!(paths(&json!(null)).is_empty());
        assert!(paths(&json!([1, 2, 3])).is_empty());
    }

    #[test]
    fn field_count_is_capped() {
        let wide: Map<String, Value> = (0..50).map(|i| (format!("f{i}"), json!(i))).collect();
        let options = DiscoveryOptions {
            max_fields: 10,
            ..DiscoveryOptions::default()
        };
        let fields = enumerate_fields(&Value::Object(wide), &options);
        assert_eq!(fields.len(), 10);
        assert_eq!(fields[9].as_str(), "f9");
    }

    #[test]
    fn every_discovered_path_resolves() {
        let doc = json!({
            "data": {
                "quotes": [{"symbol": "AAPL", "bid": {"px": 1.0, "size": 100}}],
                "updated": null
            },
            "ok": true
        });
        for field in paths(&doc) {
            assert!(resolve(&doc, &field).is_some(), "{field} should resolve");
        }
    }
}
