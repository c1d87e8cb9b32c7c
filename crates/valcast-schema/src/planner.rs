//! Dependency planner
//!
//! Builds the depends-on graph over a schema's fields, validates it, and
//! produces the deterministic evaluation order the engine follows.

use crate::model::FieldDef;
use std::collections::HashSet;

/// Compute the field evaluation order
///
/// Topological sort over the depends-on graph with a stable tie-break:
/// each pass scans fields in declaration order and emits every field whose
/// dependencies are already satisfied, so independent fields keep their
/// declaration order.
///
/// # Errors
///
/// Returns [`crate::Error::UnknownDependency`] when a field depends on a
/// name not present in the schema, and [`crate::Error::CyclicDependency`]
/// naming the fields involved when the graph has a cycle.
pub fn plan(schema: &str, fields: &[FieldDef]) -> crate::Result<Vec<String>> {
    let known: HashSet<&str> = fields.iter().map(FieldDef::name).collect();

    for field in fields {
        for dependency in field.dependencies() {
            if !known.contains(dependency.as_str()) {
                return Err(crate::Error::UnknownDependency {
                    schema: schema.to_string(),
                    field: field.name().to_string(),
                    dependency: dependency.clone(),
                });
            }
        }
    }

    let mut order: Vec<String> = Vec::with_capacity(fields.len());
    let mut emitted: HashSet<&str> = HashSet::new();

    while order.len() < fields.len() {
        let mut progressed = false;

        for field in fields {
            if emitted.contains(field.name()) {
                continue;
            }
            let ready = field
                .dependencies()
                .iter()
                .all(|dep| emitted.contains(dep.as_str()));
            if ready {
                emitted.insert(field.name());
                order.push(field.name().to_string());
                progressed = true;
            }
        }

        if !progressed {
            return Err(crate::Error::CyclicDependency {
                schema: schema.to_string(),
                cycle: cycle_participants(fields, &emitted),
            });
        }
    }

    Ok(order)
}

/// Narrow the stuck fields down to the actual cycle members
///
/// A stuck field that no other stuck field depends on is merely blocked
/// downstream of the cycle; pruning such fields to a fixpoint leaves the
/// cycle itself.
fn cycle_participants(fields: &[FieldDef], emitted: &HashSet<&str>) -> Vec<String> {
    let mut stuck: Vec<&FieldDef> = fields
        .iter()
        .filter(|field| !emitted.contains(field.name()))
        .collect();

    loop {
        let Some(index) = stuck.iter().position(|candidate| {
            !stuck
                .iter()
                .any(|field| field.dependencies().iter().any(|dep| dep == candidate.name()))
        }) else {
            break;
        };
        stuck.remove(index);
    }

    stuck.iter().map(|field| field.name().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeDecl;

    fn field(name: &str, deps: &[&str]) -> FieldDef {
        FieldDef::new(name, TypeDecl::Int).depends_on(deps.iter().copied())
    }

    #[test]
    fn test_no_dependencies_keeps_declaration_order() {
        let fields = vec![field("b", &[]), field("a", &[]), field("c", &[])];
        let order = plan("S", &fields).unwrap();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_documented_ordering_property() {
        // a, b depends-on [a], c depends-on [d, b], d depends-on [a]
        let fields = vec![
            field("a", &[]),
            field("b", &["a"]),
            field("c", &["d", "b"]),
            field("d", &["a"]),
        ];
        let order = plan("S", &fields).unwrap();
        assert_eq!(order, vec!["a", "b", "d", "c"]);
    }

    #[test]
    fn test_deep_chain() {
        let fields = vec![
            field("a", &["b", "d", "f"]),
            field("b", &["c"]),
            field("c", &["d"]),
            field("d", &[]),
            field("e", &["d"]),
            field("f", &["b", "c", "e"]),
        ];
        let order = plan("S", &fields).unwrap();

        // Every field appears once, after all of its dependencies.
        assert_eq!(order.len(), fields.len());
        for f in &fields {
            let position = order.iter().position(|n| n == f.name()).unwrap();
            for dep in f.dependencies() {
                let dep_position = order.iter().position(|n| n == dep).unwrap();
                assert!(dep_position < position, "{dep} must precede {}", f.name());
            }
        }
        assert_eq!(order.last().map(String::as_str), Some("a"));
    }

    #[test]
    fn test_unknown_dependency() {
        let fields = vec![field("a", &["ghost"])];
        let err = plan("S", &fields).unwrap_err();
        match err {
            crate::Error::UnknownDependency {
                field, dependency, ..
            } => {
                assert_eq!(field, "a");
                assert_eq!(dependency, "ghost");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cycle_names_participants() {
        let fields = vec![field("a", &["b"]), field("b", &["a"]), field("c", &[])];
        let err = plan("S", &fields).unwrap_err();
        match err {
            crate::Error::CyclicDependency { cycle, .. } => {
                assert_eq!(cycle, vec!["a", "b"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_field_blocked_by_a_cycle_is_not_named_in_it() {
        // c depends on the cyclic a but is not itself part of the cycle.
        let fields = vec![field("a", &["b"]), field("b", &["a"]), field("c", &["a"])];
        let err = plan("S", &fields).unwrap_err();
        match err {
            crate::Error::CyclicDependency { cycle, .. } => {
                assert_eq!(cycle, vec!["a", "b"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let fields = vec![field("a", &["a"])];
        assert!(matches!(
            plan("S", &fields),
            Err(crate::Error::CyclicDependency { .. })
        ));
    }
}
