//! Human-readable plan output.

use std::io::{self, Write};

use vigil_core::FieldDiff;

use crate::plan::{Plan, PlanEntry};

/// Diff lines longer than this are split over several lines.
const MAX_LINE: usize = 100;

pub fn render_plan(plan: &Plan, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Plan:")?;
    if plan.is_noop() {
        writeln!(out, "Nothing to do")?;
        return Ok(());
    }
    for entry in plan.entries() {
        let (action, diff) = match entry {
            PlanEntry::Create(_) => ("Create", None),
            PlanEntry::Update(u) => ("Update", Some(&u.diff)),
            PlanEntry::Delete(_) => ("Delete", None),
        };
        writeln!(
            out,
            "{action} {} {}",
            entry.kind().api_resource(),
            entry.tracking_id()
        )?;
        for field in diff.into_iter().flatten() {
            render_diff(field, out)?;
        }
    }
    Ok(())
}

fn render_diff(field: &FieldDiff, out: &mut impl Write) -> io::Result<()> {
    let (old, new) = field.display_pair();
    let (old, new) = (old.to_string(), new.to_string());
    let symbol = field.op.symbol();
    // Only the values count towards the limit; deep paths alone never split.
    if old.len() + new.len() > MAX_LINE {
        writeln!(out, "  {symbol}{}", field.path)?;
        writeln!(out, "    {old} ->")?;
        writeln!(out, "    {new}")
    } else {
        writeln!(out, "  {symbol}{} {old} -> {new}", field.path)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use vigil_core::{DiffOp, RemoteId};

    use super::*;
    use crate::actual::RemoteResource;
    use crate::desired::DesiredResource;
    use crate::kinds;
    use crate::plan::{Delete, Update};

    fn rendered(plan: &Plan) -> String {
        let mut out = Vec::new();
        render_plan(plan, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn empty_plan() {
        assert_eq!(rendered(&Plan::default()), "Plan:\nNothing to do\n");
    }

    #[test]
    fn update_lists_field_diffs() {
        let desired = Arc::new(DesiredResource::from_payload(
            &kinds::MONITOR,
            "a:cpu".into(),
            json!({"name": "new"}),
        ));
        let actual =
            RemoteResource::annotate(&kinds::MONITOR, json!({"id": 1, "name": "old"})).unwrap();
        let plan = Plan {
            update: vec![Update {
                id: RemoteId::Int(1),
                payload: desired.payload().clone(),
                desired,
                actual,
                diff: vec![
                    FieldDiff {
                        op: DiffOp::Changed,
                        path: "name".into(),
                        old: json!("old"),
                        new: json!("new"),
                    },
                    FieldDiff {
                        op: DiffOp::Added,
                        path: "tags".into(),
                        old: json!(null),
                        new: json!(["x"]),
                    },
                ],
            }],
            delete: vec![Delete {
                id: RemoteId::from("abc"),
                kind: &kinds::DASHBOARD,
                tracking_id: "a:old".into(),
            }],
            ..Plan::default()
        };

        assert_eq!(
            rendered(&plan),
            "Plan:\n\
             Update monitor a:cpu\n  \
             ~name \"old\" -> \"new\"\n  \
             +tags null -> [\"x\"]\n\
             Delete dashboard a:old\n"
        );
    }

    #[test]
    fn long_diff_is_split() {
        let field = FieldDiff {
            op: DiffOp::Changed,
            path: "query".into(),
            old: json!("x".repeat(60)),
            new: json!("y".repeat(60)),
        };
        let mut out = Vec::new();
        render_diff(&field, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "  ~query");
        assert!(lines[1].ends_with(" ->"));
    }

    #[test]
    fn long_path_with_short_values_stays_on_one_line() {
        let path = format!("widgets[0].definition.{}", "requests".repeat(12));
        let field = FieldDiff {
            op: DiffOp::Changed,
            path: path.clone(),
            old: json!(1),
            new: json!(2),
        };
        let mut out = Vec::new();
        render_diff(&field, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("  ~{path} 1 -> 2\n"));
    }
}
