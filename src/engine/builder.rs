//! Subgraph Builder: expands a static list of workflow-body elements into
//! a dynamic job graph and runs it to completion.
//!
//! A direct Rust port of `WDLWorkflowJob.run`'s core loop in Toil's
//! `wdltoil.py`: each element becomes a job once its dependencies (computed
//! via `engine::deps::compute_dependencies`) are satisfied, predecessor
//! environments are combined right-biased (`engine::bindings::combine_bindings`,
//! so a later/larger binding set wins on a name collision), and the seed
//! environment is always included as an implicit predecessor of every
//! element so workflow inputs and outer-scope declarations are visible
//! throughout the body. The whole body always funnels into exactly one
//! sink: the combined environment of every element that has no successor.

use crate::engine::bindings::combine_bindings;
use crate::engine::deps::{compute_dependencies, element_bound_names, element_id};
use crate::engine::error::EngineError;
use crate::engine::eval_helpers::evaluate_decl;
use crate::engine::jobs::{run_element, RunContext};
use crate::engine::stdlib_shim;
use crate::env::Bindings;
use crate::tree::{Declaration, WorkflowElement};
use crate::value::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Build the input environment for a sub-workflow call: each of its own
/// `input { }` declarations is evaluated against the call's already-evaluated
/// input bindings, falling back to the declaration's default (or `Null`/error
/// per `evaluate_decl`) for anything the call did not supply.
pub fn seed_with_declarations(
    declarations: &[Declaration],
    supplied: Bindings<Value>,
) -> Result<Bindings<Value>, EngineError> {
    let stdlib = crate::stdlib::StdLib::new("1.2");
    let mut env = supplied;
    for decl in declarations {
        env = evaluate_decl(&env, &stdlib, decl)?;
    }
    Ok(env)
}

/// Evaluate a workflow's `output { }` section against its body's combined
/// bindings, returning only the declared output names. An empty `outputs`
/// list is treated as "no output section declared" and falls back to
/// returning the body's own bindings untouched, miniwdl's behavior for a
/// workflow that never wrote an `output { }` block.
pub fn resolve_workflow_outputs(
    ctx: &RunContext,
    outputs: &[Declaration],
    body_env: &Bindings<Value>,
) -> Result<Bindings<Value>, EngineError> {
    if outputs.is_empty() {
        return Ok(body_env.clone());
    }
    evaluate_outputs(ctx, outputs, body_env)
}

/// Evaluate a workflow's `output { }` section against its body's combined
/// bindings, returning only the declared output names.
pub fn evaluate_outputs(
    ctx: &RunContext,
    outputs: &[Declaration],
    body_env: &Bindings<Value>,
) -> Result<Bindings<Value>, EngineError> {
    let stdlib = stdlib_shim::new_general(
        &ctx.wdl_version,
        ctx.virtualizer.clone(),
        ctx.workflow_dir.work.clone(),
    );
    let mut scope = body_env.clone();
    let mut out = Bindings::new();
    for decl in outputs {
        scope = evaluate_decl(&scope, &stdlib, decl)?;
        if let Some(value) = scope.resolve(&decl.name) {
            out = out.bind(decl.name.clone(), value.clone(), None);
        }
    }
    Ok(out)
}

/// Run every element in `body` to completion, respecting their static
/// dependency edges, and return the combined environment of `seed` plus
/// every element's own bindings (the single sink every body reduces to).
pub async fn build_subgraph(
    ctx: Arc<RunContext>,
    body: &[WorkflowElement],
    seed: Bindings<Value>,
) -> Result<Bindings<Value>, EngineError> {
    if body.is_empty() {
        return Ok(seed);
    }

    let deps = compute_dependencies(body);
    let by_id: HashMap<String, &WorkflowElement> =
        body.iter().map(|el| (element_id(el).to_string(), el)).collect();

    let mut pending: HashSet<String> = by_id.keys().cloned().collect();
    let mut completed: HashMap<String, Bindings<Value>> = HashMap::new();

    while !pending.is_empty() {
        let mut ready: Vec<String> = pending
            .iter()
            .filter(|id| {
                deps.get(*id)
                    .map(|d| d.iter().all(|dep| completed.contains_key(dep)))
                    .unwrap_or(true)
            })
            .cloned()
            .collect();
        ready.sort();

        if ready.is_empty() {
            return Err(EngineError::Scheduling {
                message: format!(
                    "dependency cycle or unresolved predecessor among: {:?}",
                    pending
                ),
            });
        }

        let mut handles = Vec::with_capacity(ready.len());
        for id in &ready {
            let element = (*by_id.get(id).expect("ready id must be in body")).clone();
            let predecessor_envs: Vec<Bindings<Value>> = std::iter::once(seed.clone())
                .chain(
                    deps.get(id)
                        .into_iter()
                        .flatten()
                        .filter_map(|dep| completed.get(dep).cloned()),
                )
                .collect();
            let env = combine_bindings(predecessor_envs);
            let ctx = ctx.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                let result = run_element(ctx, element, env).await;
                (id, result)
            }));
        }

        for handle in handles {
            let (id, result) = handle.await.map_err(|e| EngineError::Scheduling {
                message: format!("job for '{}' panicked: {}", e, e),
            })?;
            let bindings = result?;
            pending.remove(&id);
            completed.insert(id, bindings);
        }
    }

    let mut all_envs = vec![seed];
    all_envs.extend(completed.into_values());
    Ok(combine_bindings(all_envs))
}

/// Every name the body's elements could ever bind, regardless of whether a
/// conditional ran or a scatter had zero iterations. Used by callers that
/// need to know a section's full output surface ahead of running it (a
/// conditional wrapping a scatter, for instance).
#[allow(dead_code)]
pub fn body_potential_names(body: &[WorkflowElement]) -> Vec<String> {
    body.iter().flat_map(element_bound_names).collect()
}
