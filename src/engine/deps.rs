//! Static dependency computation for workflow node lists.
//!
//! `tree::WorkflowNode::workflow_node_dependencies` is a stub across
//! `Declaration`/`Call`/`Scatter`/`Conditional` (it returns either an empty
//! vector or the handful of `afters` a `call ... after` clause declared).
//! The Subgraph Builder needs real dependency edges to decide which units
//! are ready to run, so this module derives them itself by walking free
//! variables out of each node's expressions and resolving them against the
//! names declared by its siblings, rather than editing the upstream node
//! types.

use crate::expr::{Expression, StringPart};
use crate::tree::{Call, Declaration, WorkflowElement};
use std::collections::{HashMap, HashSet};

/// Collect every identifier referenced (free or not) by an expression.
pub fn free_variables(expr: &Expression, out: &mut HashSet<String>) {
    match expr {
        Expression::Boolean { .. }
        | Expression::Int { .. }
        | Expression::Float { .. }
        | Expression::Null { .. } => {}
        Expression::String { parts, .. } => {
            for part in parts {
                if let StringPart::Placeholder { expr, .. } = part {
                    free_variables(expr, out);
                }
            }
        }
        Expression::Array { items, .. } => {
            for item in items {
                free_variables(item, out);
            }
        }
        Expression::Pair { left, right, .. } => {
            free_variables(left, out);
            free_variables(right, out);
        }
        Expression::Map { pairs, .. } => {
            for (k, v) in pairs {
                free_variables(k, out);
                free_variables(v, out);
            }
        }
        Expression::Struct { members, .. } => {
            for (_, v) in members {
                free_variables(v, out);
            }
        }
        Expression::Ident { name, .. } => {
            out.insert(name.clone());
        }
        Expression::Get { expr, index, .. } => {
            free_variables(expr, out);
            free_variables(index, out);
        }
        Expression::IfThenElse {
            condition,
            true_expr,
            false_expr,
            ..
        } => {
            free_variables(condition, out);
            free_variables(true_expr, out);
            free_variables(false_expr, out);
        }
        Expression::Apply { arguments, .. } => {
            for arg in arguments {
                free_variables(arg, out);
            }
        }
        Expression::BinaryOp { left, right, .. } => {
            free_variables(left, out);
            free_variables(right, out);
        }
        Expression::UnaryOp { operand, .. } => {
            free_variables(operand, out);
        }
    }
}

fn free_variables_of(expr: &Expression) -> HashSet<String> {
    let mut out = HashSet::new();
    free_variables(expr, &mut out);
    out
}

/// The workflow-node id used by the Subgraph Builder to key a unit.
pub fn element_id(el: &WorkflowElement) -> &str {
    match el {
        WorkflowElement::Declaration(d) => &d.workflow_node_id,
        WorkflowElement::Call(c) => &c.workflow_node_id,
        WorkflowElement::Scatter(s) => &s.workflow_node_id,
        WorkflowElement::Conditional(c) => &c.workflow_node_id,
    }
}

/// Names this node introduces into the enclosing scope once it completes.
/// Section nodes surface every name their body would bind (recursively),
/// since their aggregated output rebinds all of them.
pub fn element_bound_names(el: &WorkflowElement) -> Vec<String> {
    match el {
        WorkflowElement::Declaration(d) => vec![d.name.clone()],
        WorkflowElement::Call(c) => vec![c.name().to_string()],
        WorkflowElement::Scatter(s) => body_bound_names(&s.body),
        WorkflowElement::Conditional(c) => body_bound_names(&c.body),
    }
}

fn body_bound_names(body: &[WorkflowElement]) -> Vec<String> {
    body.iter().flat_map(element_bound_names).collect()
}

fn call_free_variables(call: &Call) -> HashSet<String> {
    let mut out = HashSet::new();
    for expr in call.inputs.values() {
        free_variables(expr, &mut out);
    }
    out
}

fn declaration_free_variables(decl: &Declaration) -> HashSet<String> {
    match &decl.expr {
        Some(expr) => free_variables_of(expr),
        None => HashSet::new(),
    }
}

/// Free variables referenced by a node, after subtracting names that the
/// node's own body binds (relevant for Scatter/Conditional, where the loop
/// variable and body declarations are locally scoped).
pub fn element_free_variables(el: &WorkflowElement) -> HashSet<String> {
    match el {
        WorkflowElement::Declaration(d) => declaration_free_variables(d),
        WorkflowElement::Call(c) => call_free_variables(c),
        WorkflowElement::Scatter(s) => {
            let mut out = free_variables_of(&s.expr);
            let locally_bound: HashSet<String> = body_bound_names(&s.body)
                .into_iter()
                .chain(std::iter::once(s.variable.clone()))
                .collect();
            for el in &s.body {
                for name in element_free_variables(el) {
                    if !locally_bound.contains(&name) {
                        out.insert(name);
                    }
                }
            }
            out
        }
        WorkflowElement::Conditional(c) => {
            let mut out = free_variables_of(&c.expr);
            let locally_bound: HashSet<String> = body_bound_names(&c.body).into_iter().collect();
            for el in &c.body {
                for name in element_free_variables(el) {
                    if !locally_bound.contains(&name) {
                        out.insert(name);
                    }
                }
            }
            out
        }
    }
}

/// Map each node id in `elements` to the node ids it depends on, by
/// resolving its free variables against the names its siblings bind.
/// Names that resolve to the seed environment (workflow inputs, an
/// enclosing section's own scope) simply have no sibling source and are
/// left out of the dependency list — the Subgraph Builder treats the seed
/// as always available.
pub fn compute_dependencies(elements: &[WorkflowElement]) -> HashMap<String, Vec<String>> {
    let mut name_to_id: HashMap<String, String> = HashMap::new();
    for el in elements {
        let id = element_id(el).to_string();
        for name in element_bound_names(el) {
            name_to_id.insert(name, id.clone());
        }
    }

    let mut deps = HashMap::new();
    for el in elements {
        let id = element_id(el).to_string();
        let mut node_deps: Vec<String> = element_free_variables(el)
            .into_iter()
            .filter_map(|name| name_to_id.get(&name).cloned())
            .filter(|dep_id| dep_id != &id)
            .collect();
        if let WorkflowElement::Call(call) = el {
            for after in &call.afters {
                if let Some(dep_el) = elements.iter().find(|e| {
                    matches!(e, WorkflowElement::Call(c) if c.name() == after)
                }) {
                    node_deps.push(element_id(dep_el).to_string());
                }
            }
        }
        node_deps.sort();
        node_deps.dedup();
        deps.insert(id, node_deps);
    }
    deps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourcePosition;
    use crate::tree::Declaration;
    use crate::types::Type;

    fn pos() -> SourcePosition {
        SourcePosition::new("t".into(), "t".into(), 1, 1, 1, 1)
    }

    fn ident(name: &str) -> Expression {
        Expression::Ident {
            pos: pos(),
            name: name.to_string(),
            inferred_type: None,
        }
    }

    #[test]
    fn declaration_depends_on_referenced_sibling() {
        let a = WorkflowElement::Declaration(Declaration::new(
            pos(),
            Type::int(false),
            "a".to_string(),
            Some(Expression::Int {
                pos: pos(),
                value: 1,
                inferred_type: None,
            }),
            "decl",
        ));
        let b = WorkflowElement::Declaration(Declaration::new(
            pos(),
            Type::int(false),
            "b".to_string(),
            Some(ident("a")),
            "decl",
        ));
        let deps = compute_dependencies(&[a, b]);
        assert_eq!(deps.get("decl-b").unwrap(), &vec!["decl-a".to_string()]);
        assert!(deps.get("decl-a").unwrap().is_empty());
    }

    #[test]
    fn unresolved_identifier_is_not_a_dependency() {
        let a = WorkflowElement::Declaration(Declaration::new(
            pos(),
            Type::int(false),
            "a".to_string(),
            Some(ident("workflow_input")),
            "decl",
        ));
        let deps = compute_dependencies(&[a]);
        assert!(deps.get("decl-a").unwrap().is_empty());
    }
}
