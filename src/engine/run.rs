//! Top-level entry points: translate a parsed, typechecked `Document` into
//! a job graph and run it to completion.
//!
//! Input resolution (prefixed `workflow.name` over bare `name`) and the
//! required-input check mirror `runtime::workflow::WorkflowEngine`'s
//! `resolve_workflow_inputs`/`validate_workflow_inputs`, reimplemented here
//! rather than reused because those are private instance methods on an
//! engine built around synchronous, single-context execution; the checks
//! themselves are the same.

use crate::engine::builder::{build_subgraph, resolve_workflow_outputs, seed_with_declarations};
use crate::engine::checkpoint::CheckpointLog;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::filestore::FileStore;
use crate::engine::jobengine::JobEngine;
use crate::engine::jobs::RunContext;
use crate::engine::virtualize::FileVirtualizer;
use crate::env::Bindings;
use crate::runtime::config::Config;
use crate::runtime::fs_utils::WorkflowDirectory;
use crate::runtime::task_context::TaskContext;
use crate::tree::{Document, Task};
use crate::value::Value;
use std::sync::Arc;

/// Everything a caller supplies beyond the document and its inputs: where
/// to stage files, whether to resume from a checkpoint log, and how chatty
/// the scheduler should be.
pub struct RunOptions {
    pub work_dir: std::path::PathBuf,
    pub run_id: String,
    pub config: Config,
    pub restart: bool,
    pub verbose: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            work_dir: std::env::temp_dir().join("flowy-run"),
            run_id: "run".to_string(),
            config: Config::default(),
            restart: false,
            verbose: false,
        }
    }
}

fn resolve_named_inputs(
    prefix: &str,
    decl_names: &[String],
    inputs: &Bindings<Value>,
) -> Bindings<Value> {
    let mut resolved = Bindings::new();
    for name in decl_names {
        let prefixed = format!("{}.{}", prefix, name);
        if let Some(value) = inputs.resolve(&prefixed) {
            resolved = resolved.bind(name.clone(), value.clone(), None);
        } else if let Some(value) = inputs.resolve(name) {
            resolved = resolved.bind(name.clone(), value.clone(), None);
        }
    }
    resolved
}

fn build_context(
    document: Arc<Document>,
    options: &RunOptions,
) -> EngineResult<Arc<RunContext>> {
    let workflow_dir = WorkflowDirectory::create(&options.work_dir, &options.run_id)?;
    let store = Arc::new(FileStore::new(workflow_dir.root.join("filestore"))?);
    let virtualizer = Arc::new(FileVirtualizer::new(store));
    let checkpoint = Some(Arc::new(CheckpointLog::open(
        workflow_dir.root.join("checkpoint.jsonl"),
    )?));
    let engine = JobEngine::new(checkpoint.clone(), options.verbose);
    let wdl_version = document.effective_wdl_version.clone();

    Ok(Arc::new(RunContext::with_restart(
        engine,
        document,
        workflow_dir,
        options.config.clone(),
        virtualizer,
        wdl_version,
        checkpoint,
        options.restart,
    )))
}

/// Run a document's top-level workflow: expand its body into a job graph,
/// run every element, then evaluate its `output { }` section.
pub async fn run_document(
    document: Document,
    inputs: Bindings<Value>,
    options: RunOptions,
) -> EngineResult<Bindings<Value>> {
    let workflow = document.workflow.clone().ok_or_else(|| EngineError::NameResolution {
        name: "workflow".to_string(),
        message: "document has no top-level workflow".to_string(),
    })?;

    let decl_names: Vec<String> = workflow.inputs.iter().map(|d| d.name.clone()).collect();
    let required: Vec<&String> = workflow
        .inputs
        .iter()
        .filter(|d| d.expr.is_none() && !d.decl_type.is_optional())
        .map(|d| &d.name)
        .collect();
    let resolved = resolve_named_inputs(&workflow.name, &decl_names, &inputs);
    for name in required {
        if !resolved.has_binding(name) {
            return Err(EngineError::MissingRequiredInput { name: name.clone() });
        }
    }

    let document = Arc::new(document);
    let ctx = build_context(document.clone(), &options)?;

    let seed = seed_with_declarations(&workflow.inputs, resolved)?;
    let seed = seed_with_declarations(&workflow.postinputs, seed)?;
    let sink = build_subgraph(ctx.clone(), &workflow.body, seed).await?;
    let outputs = resolve_workflow_outputs(&ctx, &workflow.outputs, &sink)?;

    let mut wrapped = Bindings::new();
    for binding in outputs.iter() {
        wrapped = wrapped.bind(
            format!("{}.{}", workflow.name, binding.name()),
            binding.value().clone(),
            None,
        );
    }
    Ok(wrapped)
}

/// Run a single task directly, bypassing workflow-body expansion entirely
/// (used by the CLI when a document declares only a task, no workflow).
pub async fn run_task(task: Task, inputs: Bindings<Value>, options: RunOptions) -> EngineResult<Bindings<Value>> {
    let decl_names: Vec<String> = task.inputs.iter().map(|d| d.name.clone()).collect();
    let required: Vec<&String> = task
        .inputs
        .iter()
        .filter(|d| d.expr.is_none() && !d.decl_type.is_optional())
        .map(|d| &d.name)
        .collect();
    let resolved = resolve_named_inputs(&task.name, &decl_names, &inputs);
    for name in required {
        if !resolved.has_binding(name) {
            return Err(EngineError::MissingRequiredInput { name: name.clone() });
        }
    }

    let workflow_dir = WorkflowDirectory::create(&options.work_dir, &options.run_id)?;
    let run_id = options.run_id.clone();
    let config = options.config.clone();

    tokio::task::spawn_blocking(move || -> EngineResult<Bindings<Value>> {
        let mut context = TaskContext::new(task, resolved, config, workflow_dir, &run_id)?;
        let result = context.execute()?;
        Ok(result.outputs)
    })
    .await
    .map_err(|e| EngineError::Scheduling {
        message: format!("task execution panicked: {}", e),
    })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourcePosition;
    use crate::expr::Expression;
    use crate::tree::{Declaration, WorkflowElement, Workflow};
    use crate::types::Type;

    fn pos() -> SourcePosition {
        SourcePosition::new("t".into(), "t".into(), 1, 1, 1, 1)
    }

    #[tokio::test]
    async fn workflow_with_no_calls_evaluates_declared_output() {
        let tmp = tempfile::tempdir().unwrap();
        let input_decl = Declaration::new(pos(), Type::int(false), "n".to_string(), None, "decl");
        let output_decl = Declaration::new(
            pos(),
            Type::int(false),
            "doubled".to_string(),
            Some(Expression::BinaryOp {
                pos: pos(),
                op: crate::expr::BinaryOperator::Add,
                left: Box::new(Expression::Ident {
                    pos: pos(),
                    name: "n".to_string(),
                    inferred_type: None,
                }),
                right: Box::new(Expression::Ident {
                    pos: pos(),
                    name: "n".to_string(),
                    inferred_type: None,
                }),
                inferred_type: None,
            }),
            "decl",
        );
        let workflow = Workflow::new(
            pos(),
            "greet".to_string(),
            vec![input_decl],
            vec![],
            vec![],
            vec![output_decl],
            Default::default(),
            Default::default(),
        );
        let document = Document::new(
            pos(),
            Some("1.2".to_string()),
            vec![],
            vec![],
            vec![],
            Some(workflow),
        );

        let inputs = Bindings::new().bind("greet.n".to_string(), Value::int(4), None);
        let options = RunOptions {
            work_dir: tmp.path().to_path_buf(),
            run_id: "r1".to_string(),
            config: Config::default(),
            restart: false,
            verbose: false,
        };
        let outputs = run_document(document, inputs, options).await.unwrap();
        assert_eq!(outputs.resolve("greet.doubled"), Some(&Value::int(8)));
    }

    #[tokio::test]
    async fn missing_required_workflow_input_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let input_decl = Declaration::new(pos(), Type::int(false), "n".to_string(), None, "decl");
        let workflow = Workflow::new(
            pos(),
            "greet".to_string(),
            vec![input_decl],
            vec![],
            vec![WorkflowElement::Declaration(Declaration::new(
                pos(),
                Type::int(false),
                "noop".to_string(),
                Some(Expression::Int {
                    pos: pos(),
                    value: 0,
                    inferred_type: None,
                }),
                "decl",
            ))],
            vec![],
            Default::default(),
            Default::default(),
        );
        let document = Document::new(
            pos(),
            Some("1.2".to_string()),
            vec![],
            vec![],
            vec![],
            Some(workflow),
        );
        let options = RunOptions {
            work_dir: tmp.path().to_path_buf(),
            run_id: "r2".to_string(),
            config: Config::default(),
            restart: false,
            verbose: false,
        };
        let result = run_document(document, Bindings::new(), options).await;
        assert!(result.is_err());
    }
}
