//! `wdl-run` CLI: translate a WDL workflow into a job graph and run it.
//!
//! `wdl-run <wdl_uri> <inputs_uri> [--restart] [-o <dir>]`. Replaces the
//! teacher's `flowy`/`flowy-server`/`flowy-client`/`daemon-flowy` cluster —
//! the distributed queue those talked to is the out-of-scope collaborator
//! this crate now schedules work onto directly via `engine::jobengine`.

use wdl_jobgraph::core::inputs::{bindings_from_json_for_document, bindings_from_json_for_task};
use wdl_jobgraph::core::outputs::bindings_to_json_with_namespace;
use wdl_jobgraph::engine::run::RunOptions;
use wdl_jobgraph::engine::{run_document, run_task};
use wdl_jobgraph::parser;
use wdl_jobgraph::{SourcePosition, WdlError};
use std::path::PathBuf;
use std::process;

struct Args {
    wdl_uri: PathBuf,
    inputs_uri: PathBuf,
    restart: bool,
    out_dir: Option<PathBuf>,
    debug: bool,
}

fn print_help(program: &str) {
    eprintln!("wdl-run - translate a WDL workflow into a job graph and run it");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {} <wdl_uri> <inputs_uri> [--restart] [-o <dir>]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --restart      Resume from a prior run's checkpoint log");
    eprintln!("  -o <dir>       Output/working directory (default: a temp directory)");
    eprintln!("  --debug        Verbose job start/finish logging");
    eprintln!("  -h, --help     Show this help message");
}

fn parse_args() -> Args {
    let argv: Vec<String> = std::env::args().collect();
    let program = argv.first().cloned().unwrap_or_else(|| "wdl-run".to_string());

    let mut positional = Vec::new();
    let mut restart = false;
    let mut out_dir = None;
    let mut debug = false;

    let mut i = 1;
    while i < argv.len() {
        match argv[i].as_str() {
            "-h" | "--help" => {
                print_help(&program);
                process::exit(0);
            }
            "--restart" => restart = true,
            "--debug" => debug = true,
            "-o" | "--output" => {
                i += 1;
                if i >= argv.len() {
                    eprintln!("Error: -o requires a directory path");
                    process::exit(1);
                }
                out_dir = Some(PathBuf::from(&argv[i]));
            }
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    if positional.len() != 2 {
        print_help(&program);
        process::exit(1);
    }

    Args {
        wdl_uri: PathBuf::from(&positional[0]),
        inputs_uri: PathBuf::from(&positional[1]),
        restart,
        out_dir,
        debug,
    }
}

fn detect_wdl_version(source: &str) -> String {
    for line in source.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("version") {
            return rest.trim().to_string();
        }
    }
    "1.0".to_string()
}

fn display_error(error: &WdlError) {
    eprintln!("Error: {}", error);
}

fn runtime_error(message: String) -> WdlError {
    WdlError::Runtime {
        message,
        more_info: Default::default(),
    }
}

fn run(args: Args) -> Result<(), WdlError> {
    let source = std::fs::read_to_string(&args.wdl_uri)
        .map_err(|e| runtime_error(format!("failed to read {}: {}", args.wdl_uri.display(), e)))?;

    let version = detect_wdl_version(&source);
    let mut document = parser::parse_document(&source, &version)?;
    document.typecheck()?;

    let inputs_content = std::fs::read_to_string(&args.inputs_uri).map_err(|e| {
        runtime_error(format!(
            "failed to read {}: {}",
            args.inputs_uri.display(),
            e
        ))
    })?;
    let inputs_json: serde_json::Value =
        serde_json::from_str(&inputs_content).map_err(|e| WdlError::Validation {
            message: format!("invalid JSON in {}: {}", args.inputs_uri.display(), e),
            pos: SourcePosition::new(
                args.inputs_uri.display().to_string(),
                args.inputs_uri.display().to_string(),
                1,
                1,
                1,
                1,
            ),
            source_text: Some(inputs_content.clone()),
            declared_wdl_version: Some(version.clone()),
        })?;

    let work_dir = args
        .out_dir
        .unwrap_or_else(|| std::env::temp_dir().join("wdl-run"));
    std::fs::create_dir_all(&work_dir)
        .map_err(|e| runtime_error(format!("failed to create output directory: {}", e)))?;

    let run_id = format!("run_{}", process::id());
    let mut config = wdl_jobgraph::runtime::Config::default();
    config.work_dir = work_dir.clone();
    config.debug = args.debug;

    let options = RunOptions {
        work_dir: work_dir.clone(),
        run_id,
        config,
        restart: args.restart,
        verbose: args.debug,
    };

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| runtime_error(format!("failed to start async runtime: {}", e)))?;

    let (outputs, namespace) = if document.workflow.is_some() {
        let inputs = bindings_from_json_for_document(inputs_json, &document)?;
        let outputs = runtime
            .block_on(run_document(document, inputs, options))
            .map_err(|e| runtime_error(e.to_string()))?;
        (outputs, None)
    } else if document.tasks.len() == 1 {
        let task = document.tasks[0].clone();
        let inputs = bindings_from_json_for_task(inputs_json, &task)?;
        let outputs = runtime
            .block_on(run_task(task, inputs, options))
            .map_err(|e| runtime_error(e.to_string()))?;
        (outputs, None)
    } else {
        return Err(runtime_error(
            "document has no workflow and is not a single-task file".to_string(),
        ));
    };

    let json = bindings_to_json_with_namespace(&outputs, namespace)?;
    println!("{}", serde_json::to_string_pretty(&json).unwrap());
    Ok(())
}

fn main() {
    let args = parse_args();
    if let Err(e) = run(args) {
        display_error(&e);
        process::exit(1);
    }
}
