//! Standard-library shims handed to expression evaluation.
//!
//! Two flavors, matching the two evaluation contexts a Node/Task Job runs
//! expressions in: the general shim (workflow declarations, call inputs,
//! scatter/conditional expressions) devirtualizes/virtualizes through the
//! shared `FileVirtualizer`, while the TaskOutputs shim additionally exposes
//! `stdout()`/`stderr()`/`glob()` scoped to one task's own directory, the
//! way `stdlib::StdLib::with_path_mapper`'s `is_task_context` flag already
//! gates those builtins.

use crate::engine::virtualize::{FileVirtualizer, VirtualizingPathMapper};
use crate::stdlib::{StdLib, TaskPathMapper};
use std::path::PathBuf;
use std::sync::Arc;

/// Standard library for evaluating workflow-level expressions: no
/// `stdout()`/`stderr()`/`glob()`, file paths routed through the run's
/// virtualizer.
pub fn new_general(wdl_version: &str, virtualizer: Arc<FileVirtualizer>, write_dir: PathBuf) -> StdLib {
    StdLib::with_path_mapper(
        wdl_version,
        Box::new(VirtualizingPathMapper::new(virtualizer)),
        false,
        write_dir.to_string_lossy().to_string(),
    )
}

/// Standard library for evaluating a task's `output { }` section: adds
/// `stdout()`/`stderr()`/`glob()` resolved against the task's own
/// directory, exactly as `stdlib::StdLib::with_path_mapper` wires them when
/// given a `TaskPathMapper` and `is_task_context = true`.
pub fn new_task_outputs(wdl_version: &str, task_dir: PathBuf) -> StdLib {
    StdLib::with_path_mapper(
        wdl_version,
        Box::new(TaskPathMapper::new(task_dir.clone())),
        true,
        task_dir.to_string_lossy().to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::filestore::FileStore;

    #[test]
    fn general_shim_has_no_stdout_function() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(tmp.path().join("store")).unwrap());
        let virtualizer = Arc::new(FileVirtualizer::new(store));
        let stdlib = new_general("1.2", virtualizer, tmp.path().to_path_buf());
        assert!(stdlib.get_function("stdout").is_none());
    }

    #[test]
    fn task_outputs_shim_has_stdout_function() {
        let tmp = tempfile::tempdir().unwrap();
        let stdlib = new_task_outputs("1.2", tmp.path().to_path_buf());
        assert!(stdlib.get_function("stdout").is_some());
        assert!(stdlib.get_function("stderr").is_some());
    }
}
