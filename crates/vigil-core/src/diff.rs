use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffOp {
    /// Present in desired, missing remotely.
    Added,
    Changed,
    /// Present remotely, missing in desired.
    Removed,
}

impl DiffOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Added => "+",
            Self::Changed => "~",
            Self::Removed => "-",
        }
    }
}

/// One drifted field between the remote payload (`old`) and the desired
/// payload (`new`).
///
/// `old` is `null` for `Added` entries and `new` is `null` for `Removed`
/// entries, so `old -> new` always reads as "was -> will be".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDiff {
    pub op: DiffOp,
    /// e.g. `options.thresholds.critical`, `widgets[2].definition`
    pub path: String,
    pub old: Value,
    pub new: Value,
}

impl FieldDiff {
    /// The top-level field this entry belongs to (`options` for `options.x[1]`).
    pub fn root_field(&self) -> &str {
        let end = self
            .path
            .find(['.', '['])
            .unwrap_or(self.path.len());
        &self.path[..end]
    }

    /// Before/after pair for display.
    pub fn display_pair(&self) -> (&Value, &Value) {
        (&self.old, &self.new)
    }
}

impl fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{} {} -> {}", self.op.symbol(), self.path, self.old, self.new)
    }
}

/// Field-level differences turning `actual` into `desired`, in key order.
pub fn json_diff(actual: &Value, desired: &Value) -> Vec<FieldDiff> {
    let mut out = Vec::new();
    diff_at(String::new(), actual, desired, &mut out);
    out
}

fn diff_at(path: String, old: &Value, new: &Value, out: &mut Vec<FieldDiff>) {
    match (old, new) {
        (Value::Object(a), Value::Object(b)) => {
            for (key, av) in a {
                let child = join(&path, key);
                match b.get(key) {
                    Some(bv) => diff_at(child, av, bv, out),
                    None => out.push(FieldDiff {
                        op: DiffOp::Removed,
                        path: child,
                        old: av.clone(),
                        new: Value::Null,
                    }),
                }
            }
            for (key, bv) in b {
                if !a.contains_key(key) {
                    out.push(FieldDiff {
                        op: DiffOp::Added,
                        path: join(&path, key),
                        old: Value::Null,
                        new: bv.clone(),
                    });
                }
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            for (i, av) in a.iter().enumerate() {
                let child = format!("{path}[{i}]");
                match b.get(i) {
                    Some(bv) => diff_at(child, av, bv, out),
                    None => out.push(FieldDiff {
                        op: DiffOp::Removed,
                        path: child,
                        old: av.clone(),
                        new: Value::Null,
                    }),
                }
            }
            for (i, bv) in b.iter().enumerate().skip(a.len()) {
                out.push(FieldDiff {
                    op: DiffOp::Added,
                    path: format!("{path}[{i}]"),
                    old: Value::Null,
                    new: bv.clone(),
                });
            }
        }
        _ if old == new => {}
        _ => out.push(FieldDiff {
            op: DiffOp::Changed,
            path,
            old: old.clone(),
            new: new.clone(),
        }),
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn identical_payloads_have_no_diff() {
        let payload = json!({"name": "cpu", "options": {"thresholds": {"critical": 90}}, "tags": ["a"]});
        assert!(json_diff(&payload, &payload.clone()).is_empty());
    }

    #[test]
    fn reports_changed_added_and_removed_fields() {
        let actual = json!({"name": "old", "priority": 3, "tags": ["a", "b"]});
        let desired = json!({"name": "new", "message": "hi", "tags": ["a"]});

        let diff = json_diff(&actual, &desired);

        assert_eq!(
            diff,
            vec![
                FieldDiff {
                    op: DiffOp::Changed,
                    path: "name".into(),
                    old: json!("old"),
                    new: json!("new"),
                },
                FieldDiff {
                    op: DiffOp::Removed,
                    path: "priority".into(),
                    old: json!(3),
                    new: Value::Null,
                },
                FieldDiff {
                    op: DiffOp::Removed,
                    path: "tags[1]".into(),
                    old: json!("b"),
                    new: Value::Null,
                },
                FieldDiff {
                    op: DiffOp::Added,
                    path: "message".into(),
                    old: Value::Null,
                    new: json!("hi"),
                },
            ]
        );
    }

    #[test]
    fn added_entry_reads_as_was_missing_then_value() {
        let diff = json_diff(&json!({}), &json!({"message": "hi"}));
        assert_eq!(diff[0].display_pair(), (&Value::Null, &json!("hi")));
        assert_eq!(diff[0].to_string(), "+message null -> \"hi\"");
    }

    #[test]
    fn root_field_strips_nested_path() {
        let diff = json_diff(&json!({"options": {"a": [1]}}), &json!({"options": {"a": [2]}}));
        assert_eq!(diff[0].path, "options.a[0]");
        assert_eq!(diff[0].root_field(), "options");
    }
}
