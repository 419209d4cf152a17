//! Scheduled unit bodies: the executable content a Node Job, Section Job,
//! Call Job or Workflow Job runs once its predecessors are available.
//!
//! Every job here is a plain async function operating on a shared
//! `RunContext`, rather than a trait object hierarchy: the teacher's own
//! `runtime::workflow::WorkflowEngine::execute_workflow_node` dispatches on
//! `WorkflowElement` the same way, just synchronously over a single mutable
//! context instead of asynchronously over a job graph. Outputs are always
//! returned as a fresh `Bindings<Value>` containing only the names this job
//! introduces, so the caller decides how to fold them into the surrounding
//! scope (see `engine::bindings::combine_bindings` and `engine::builder`).

use crate::engine::checkpoint::CheckpointLog;
use crate::engine::deps::element_bound_names;
use crate::engine::error::EngineError;
use crate::engine::eval_helpers::{evaluate_call_inputs, evaluate_decl};
use crate::engine::jobengine::JobEngine;
use crate::engine::stdlib_shim;
use crate::engine::virtualize::FileVirtualizer;
use crate::env::Bindings;
use crate::expr::ExpressionBase;
use crate::runtime::config::Config;
use crate::runtime::fs_utils::WorkflowDirectory;
use crate::runtime::task_context::TaskContext;
use crate::tree::{Call, CalleeRef, Conditional, Document, Scatter, Task, WorkflowElement};
use crate::types::Type;
use crate::value::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared, run-scoped state every job needs: the scheduler, the document
/// being translated, the file virtualizer, and execution configuration.
/// Cloning is cheap (everything expensive is behind an `Arc`).
#[derive(Clone)]
pub struct RunContext {
    pub engine: JobEngine,
    pub document: Arc<Document>,
    pub workflow_dir: WorkflowDirectory,
    pub config: Config,
    pub virtualizer: Arc<FileVirtualizer>,
    pub wdl_version: String,
    pub checkpoint: Option<Arc<CheckpointLog>>,
    pub restart: bool,
    unique: Arc<AtomicUsize>,
}

impl RunContext {
    pub fn new(
        engine: JobEngine,
        document: Arc<Document>,
        workflow_dir: WorkflowDirectory,
        config: Config,
        virtualizer: Arc<FileVirtualizer>,
        wdl_version: String,
        checkpoint: Option<Arc<CheckpointLog>>,
    ) -> Self {
        Self::with_restart(
            engine,
            document,
            workflow_dir,
            config,
            virtualizer,
            wdl_version,
            checkpoint,
            false,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_restart(
        engine: JobEngine,
        document: Arc<Document>,
        workflow_dir: WorkflowDirectory,
        config: Config,
        virtualizer: Arc<FileVirtualizer>,
        wdl_version: String,
        checkpoint: Option<Arc<CheckpointLog>>,
        restart: bool,
    ) -> Self {
        Self {
            engine,
            document,
            workflow_dir,
            config,
            virtualizer,
            wdl_version,
            checkpoint,
            restart,
            unique: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A process-unique suffix for disambiguating run ids of repeated
    /// sections (scatter iterations, nested calls).
    pub fn next_unique(&self) -> usize {
        self.unique.fetch_add(1, Ordering::Relaxed)
    }
}

/// Run a single workflow-body element against `env` and return only the
/// bindings it introduces.
pub async fn run_element(
    ctx: Arc<RunContext>,
    element: WorkflowElement,
    env: Bindings<Value>,
) -> Result<Bindings<Value>, EngineError> {
    match element {
        WorkflowElement::Declaration(decl) => {
            let stdlib = stdlib_shim::new_general(
                &ctx.wdl_version,
                ctx.virtualizer.clone(),
                ctx.workflow_dir.work.clone(),
            );
            let with_decl = evaluate_decl(&env, &stdlib, &decl)?;
            let mut out = Bindings::new();
            if let Some(value) = with_decl.resolve(&decl.name) {
                out = out.bind(decl.name.clone(), value.clone(), None);
            }
            Ok(out)
        }
        WorkflowElement::Call(call) => run_call(ctx, &call, env).await,
        WorkflowElement::Scatter(scatter) => run_scatter(ctx, *scatter, env).await,
        WorkflowElement::Conditional(conditional) => run_conditional(ctx, *conditional, env).await,
    }
}

/// Evaluate a call's inputs, dispatch to a Task Job or recurse into a
/// sub-workflow's own subgraph, then bind its results back as
/// `call_name.output_name` bindings, matching the flat dotted-key
/// convention `runtime::workflow::WorkflowEngine::execute_call` already
/// uses for non-scattered calls.
pub async fn run_call(
    ctx: Arc<RunContext>,
    call: &Call,
    env: Bindings<Value>,
) -> Result<Bindings<Value>, EngineError> {
    let stdlib = stdlib_shim::new_general(
        &ctx.wdl_version,
        ctx.virtualizer.clone(),
        ctx.workflow_dir.work.clone(),
    );
    let call_name = call.name().to_string();
    let explicit_inputs = evaluate_call_inputs(&env, &stdlib, call)?;
    // Predecessors are [I, passed-down]: explicit `call { input: ... }` values
    // (I) plus whatever the enclosing environment already bound under this
    // call's namespace (e.g. an inputs-JSON key `w.t.x` reaching the seed as
    // `t.x`). Explicit inputs shadow a namespace-supplied value of the same
    // name.
    let passed_down = env.enter_namespace(&call_name);
    let mut call_inputs = passed_down;
    for binding in explicit_inputs.iter() {
        call_inputs = call_inputs.bind(
            binding.name().to_string(),
            binding.value().clone(),
            binding.info().cloned(),
        );
    }

    let callee = call.callee.clone().ok_or_else(|| EngineError::InvalidCallee {
        name: call.task.clone(),
        message: "call was never resolved against its document".to_string(),
    })?;

    let outputs = match callee {
        CalleeRef::Task(task) => run_task_call(ctx.clone(), task, &call_name, call_inputs).await?,
        CalleeRef::Workflow(workflow) => {
            let sub_body = workflow.body.clone();
            let sub_outputs_decls = workflow.outputs.clone();
            let seed = crate::engine::builder::seed_with_declarations(&workflow.inputs, call_inputs)?;
            let sink = crate::engine::builder::build_subgraph(ctx.clone(), &sub_body, seed).await?;
            crate::engine::builder::resolve_workflow_outputs(&ctx, &sub_outputs_decls, &sink)?
        }
    };

    let mut out = Bindings::new();
    for binding in outputs.iter() {
        out = out.bind(
            format!("{}.{}", call_name, binding.name()),
            binding.value().clone(),
            None,
        );
    }
    Ok(out)
}

async fn run_task_call(
    ctx: Arc<RunContext>,
    task: Task,
    call_name: &str,
    inputs: Bindings<Value>,
) -> Result<Bindings<Value>, EngineError> {
    let label = format!("task:{}#{}", call_name, ctx.next_unique());

    if ctx.restart {
        if let Some(checkpoint) = &ctx.checkpoint {
            if let Some(bindings) = checkpoint.lookup(&label) {
                return Ok(bindings);
            }
        }
    }

    let devirtualized = devirtualize_inputs(&ctx, &inputs)?;

    let future = ctx.engine.submit(label.clone(), {
        let ctx = ctx.clone();
        let task = task.clone();
        async move { execute_task_blocking(ctx, task, devirtualized).await }
    });
    let outputs = future.get().await?;

    let virtualized = virtualize_outputs(&ctx, &outputs)?;
    if let Some(checkpoint) = &ctx.checkpoint {
        checkpoint.record_completed(&label, &virtualized)?;
    }
    Ok(virtualized)
}

async fn execute_task_blocking(
    ctx: Arc<RunContext>,
    task: Task,
    inputs: Bindings<Value>,
) -> Result<Bindings<Value>, EngineError> {
    let run_id = format!("{}_{}", task.name, ctx.next_unique());
    let workflow_dir = ctx.workflow_dir.clone();
    let config = ctx.config.clone();

    tokio::task::spawn_blocking(move || -> Result<Bindings<Value>, EngineError> {
        let mut context = TaskContext::new(task, inputs, config, workflow_dir, &run_id)?;
        let result = context.execute()?;
        Ok(result.outputs)
    })
    .await
    .map_err(|e| EngineError::Scheduling {
        message: format!("task execution panicked: {}", e),
    })?
}

fn devirtualize_inputs(
    ctx: &RunContext,
    inputs: &Bindings<Value>,
) -> Result<Bindings<Value>, EngineError> {
    let mut out = Bindings::new();
    for binding in inputs.iter() {
        let value = ctx.virtualizer.devirtualize_value(binding.value())?;
        out = out.bind(binding.name().to_string(), value, binding.info().cloned());
    }
    Ok(out)
}

fn virtualize_outputs(
    ctx: &RunContext,
    outputs: &Bindings<Value>,
) -> Result<Bindings<Value>, EngineError> {
    let mut out = Bindings::new();
    for binding in outputs.iter() {
        let value = ctx.virtualizer.virtualize_value(binding.value())?;
        out = out.bind(binding.name().to_string(), value, binding.info().cloned());
    }
    Ok(out)
}

/// Every name a scatter/conditional body could bind, including the
/// dotted `call_name.output_name` keys task/workflow calls introduce
/// (which `deps::element_bound_names` does not enumerate, since those
/// keys only exist once a call's callee is resolved).
fn potential_names(body: &[WorkflowElement]) -> Vec<String> {
    let mut names = Vec::new();
    for el in body {
        match el {
            WorkflowElement::Call(call) => {
                if let Some(callee) = &call.callee {
                    let outs: &[crate::tree::Declaration] = match callee {
                        CalleeRef::Task(t) => &t.outputs,
                        CalleeRef::Workflow(w) => &w.outputs,
                    };
                    for output in outs {
                        names.push(format!("{}.{}", call.name(), output.name));
                    }
                } else {
                    names.extend(element_bound_names(el));
                }
            }
            WorkflowElement::Scatter(s) => names.extend(potential_names(&s.body)),
            WorkflowElement::Conditional(c) => names.extend(potential_names(&c.body)),
            _ => names.extend(element_bound_names(el)),
        }
    }
    names
}

/// Expand a scatter section into one subgraph per array element, run them
/// concurrently, then arrayize every name the body binds (canonical WDL
/// arraying: each name becomes `Array[T]` over the per-iteration values,
/// in iteration order, regardless of whether it came from a declaration or
/// a dotted call output).
async fn run_scatter(
    ctx: Arc<RunContext>,
    scatter: Scatter,
    env: Bindings<Value>,
) -> Result<Bindings<Value>, EngineError> {
    let stdlib = stdlib_shim::new_general(
        &ctx.wdl_version,
        ctx.virtualizer.clone(),
        ctx.workflow_dir.work.clone(),
    );
    let collection = scatter.expr.eval(&env, &stdlib)?;
    let items = match collection {
        Value::Array { values, .. } => values,
        other => {
            return Err(EngineError::TypeMismatch {
                message: format!("scatter collection must be an array, got {:?}", other),
                pos: None,
            })
        }
    };

    let names = potential_names(&scatter.body);

    let mut iteration_futures = Vec::with_capacity(items.len());
    for item in items.iter() {
        let iter_env = env.bind(scatter.variable.clone(), item.clone(), None);
        let ctx = ctx.clone();
        let body = scatter.body.clone();
        iteration_futures.push(tokio::spawn(async move {
            crate::engine::builder::build_subgraph(ctx, &body, iter_env).await
        }));
    }

    let mut iteration_results = Vec::with_capacity(iteration_futures.len());
    for handle in iteration_futures {
        let result = handle.await.map_err(|e| EngineError::Scheduling {
            message: format!("scatter iteration panicked: {}", e),
        })??;
        iteration_results.push(result);
    }

    let mut out = Bindings::new();
    for name in names {
        let mut values = Vec::with_capacity(iteration_results.len());
        for result in &iteration_results {
            values.push(result.resolve(&name).cloned().unwrap_or(Value::Null));
        }
        let element_type = values
            .iter()
            .find(|v| !matches!(v, Value::Null))
            .map(|v| type_of(v))
            .unwrap_or_else(|| Type::string(true));
        let array_type = Type::array(element_type, false, false);
        out = out.bind(
            name,
            Value::Array {
                values,
                wdl_type: array_type,
            },
            None,
        );
    }
    Ok(out)
}

fn type_of(value: &Value) -> Type {
    match value {
        Value::Boolean { wdl_type, .. }
        | Value::Int { wdl_type, .. }
        | Value::Float { wdl_type, .. }
        | Value::String { wdl_type, .. }
        | Value::File { wdl_type, .. }
        | Value::Directory { wdl_type, .. }
        | Value::Array { wdl_type, .. }
        | Value::Map { wdl_type, .. }
        | Value::Pair { wdl_type, .. }
        | Value::Struct { wdl_type, .. } => wdl_type.clone(),
        Value::Null => Type::string(true),
    }
}

/// Run a conditional's body only if its guard evaluates true; otherwise
/// bind every name the body could have introduced to `Null`, so downstream
/// references see the `None` a false branch produces in WDL (the same
/// all-potential-names bookkeeping `runtime::workflow`'s
/// `aggregate_conditional_outputs` does synchronously).
async fn run_conditional(
    ctx: Arc<RunContext>,
    conditional: Conditional,
    env: Bindings<Value>,
) -> Result<Bindings<Value>, EngineError> {
    let stdlib = stdlib_shim::new_general(
        &ctx.wdl_version,
        ctx.virtualizer.clone(),
        ctx.workflow_dir.work.clone(),
    );
    let guard = conditional.expr.eval(&env, &stdlib)?;
    let should_run = match guard {
        Value::Boolean { value, .. } => value,
        Value::Null => false,
        other => {
            return Err(EngineError::TypeMismatch {
                message: format!("conditional guard must be Boolean, got {:?}", other),
                pos: None,
            })
        }
    };

    let names = potential_names(&conditional.body);
    let mut out = Bindings::new();

    if should_run {
        let body_result =
            crate::engine::builder::build_subgraph(ctx.clone(), &conditional.body, env).await?;
        for name in names {
            if let Some(value) = body_result.resolve(&name) {
                out = out.bind(name, value.clone(), None);
            }
        }
    } else {
        for name in names {
            out = out.bind(name, Value::Null, None);
        }
    }
    Ok(out)
}
