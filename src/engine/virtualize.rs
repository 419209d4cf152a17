//! File virtualization: the `toilfile:` handle scheme.
//!
//! Values of WDL type `File`/`Directory` are plain strings (see
//! `value::Value::File`); crossing a scheduled-unit boundary with a local
//! path baked into that string would tie the consuming unit to the
//! producer's filesystem. `FileVirtualizer` replaces such a path with an
//! opaque `toilfile:<key>` handle before it is bound into an outgoing
//! environment, and resolves it back to a real path (devirtualizes) only
//! when an expression actually needs to read the file's bytes.

use crate::engine::filestore::FileStore;
use crate::error::WdlError;
use crate::stdlib::PathMapper;
use crate::value::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const HANDLE_PREFIX: &str = "toilfile:";

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

/// Wraps/unwraps the `toilfile:` handle format around a `FileStore` key.
pub fn make_handle(key: &str) -> String {
    format!("{}{}", HANDLE_PREFIX, URL_SAFE_NO_PAD.encode(key.as_bytes()))
}

pub fn parse_handle(filename: &str) -> Option<String> {
    let encoded = filename.strip_prefix(HANDLE_PREFIX)?;
    let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

/// Virtualizes a local path into a `toilfile:` handle and devirtualizes a
/// handle back into a local path, backed by a shared `FileStore`.
pub struct FileVirtualizer {
    store: Arc<FileStore>,
}

impl FileVirtualizer {
    pub fn new(store: Arc<FileStore>) -> Self {
        Self { store }
    }

    pub fn virtualize(&self, path: &Path) -> Result<String, WdlError> {
        let key = self
            .store
            .import_local(path)
            .map_err(|e| WdlError::Runtime {
                message: format!("failed to virtualize {}: {}", path.display(), e),
                more_info: Default::default(),
            })?;
        Ok(make_handle(&key))
    }

    pub fn devirtualize(&self, filename: &str) -> Result<PathBuf, WdlError> {
        if let Some(key) = parse_handle(filename) {
            self.store.resolve(&key).map_err(|e| WdlError::Runtime {
                message: format!("failed to devirtualize {}: {}", filename, e),
                more_info: Default::default(),
            })
        } else if filename.starts_with("http://") || filename.starts_with("https://") {
            import_remote(&self.store, filename)
        } else if filename.starts_with("s3://") {
            Err(WdlError::Runtime {
                message: format!(
                    "s3:// URIs are not supported by this file store: {}",
                    filename
                ),
                more_info: Default::default(),
            })
        } else {
            Ok(PathBuf::from(filename))
        }
    }

    /// Replace every `File`/`Directory` value reachable from `value` with a
    /// local, readable path, recursing through compound values. Used at a
    /// Task Job boundary, where the generated command needs a real path, not
    /// an opaque handle from a producer on another scheduled unit.
    pub fn devirtualize_value(&self, value: &Value) -> Result<Value, WdlError> {
        match value {
            Value::File { value: path, wdl_type } => Ok(Value::File {
                value: self.devirtualize(path)?.to_string_lossy().to_string(),
                wdl_type: wdl_type.clone(),
            }),
            Value::Directory { value: path, wdl_type } => Ok(Value::Directory {
                value: self.devirtualize(path)?.to_string_lossy().to_string(),
                wdl_type: wdl_type.clone(),
            }),
            Value::Array { values, wdl_type } => Ok(Value::Array {
                values: values
                    .iter()
                    .map(|v| self.devirtualize_value(v))
                    .collect::<Result<Vec<_>, _>>()?,
                wdl_type: wdl_type.clone(),
            }),
            Value::Map { pairs, wdl_type } => Ok(Value::Map {
                pairs: pairs
                    .iter()
                    .map(|(k, v)| Ok((self.devirtualize_value(k)?, self.devirtualize_value(v)?)))
                    .collect::<Result<Vec<_>, WdlError>>()?,
                wdl_type: wdl_type.clone(),
            }),
            Value::Pair { left, right, wdl_type } => Ok(Value::Pair {
                left: Box::new(self.devirtualize_value(left)?),
                right: Box::new(self.devirtualize_value(right)?),
                wdl_type: wdl_type.clone(),
            }),
            Value::Struct {
                members,
                extra_keys,
                wdl_type,
            } => {
                let mut resolved = std::collections::HashMap::new();
                for (name, v) in members {
                    resolved.insert(name.clone(), self.devirtualize_value(v)?);
                }
                Ok(Value::Struct {
                    members: resolved,
                    extra_keys: extra_keys.clone(),
                    wdl_type: wdl_type.clone(),
                })
            }
            other => Ok(other.clone()),
        }
    }

    /// Replace every local `File`/`Directory` path reachable from `value`
    /// with a `toilfile:` handle, the inverse of `devirtualize_value`. Used
    /// when a job's result crosses back over the job-graph boundary so a
    /// dependent does not inherit a path on this unit's own filesystem.
    pub fn virtualize_value(&self, value: &Value) -> Result<Value, WdlError> {
        match value {
            Value::File { value: path, wdl_type } => {
                if parse_handle(path).is_some() {
                    Ok(value.clone())
                } else {
                    Ok(Value::File {
                        value: self.virtualize(Path::new(path))?,
                        wdl_type: wdl_type.clone(),
                    })
                }
            }
            Value::Directory { .. } => Ok(value.clone()),
            Value::Array { values, wdl_type } => Ok(Value::Array {
                values: values
                    .iter()
                    .map(|v| self.virtualize_value(v))
                    .collect::<Result<Vec<_>, _>>()?,
                wdl_type: wdl_type.clone(),
            }),
            Value::Map { pairs, wdl_type } => Ok(Value::Map {
                pairs: pairs
                    .iter()
                    .map(|(k, v)| Ok((self.virtualize_value(k)?, self.virtualize_value(v)?)))
                    .collect::<Result<Vec<_>, WdlError>>()?,
                wdl_type: wdl_type.clone(),
            }),
            Value::Pair { left, right, wdl_type } => Ok(Value::Pair {
                left: Box::new(self.virtualize_value(left)?),
                right: Box::new(self.virtualize_value(right)?),
                wdl_type: wdl_type.clone(),
            }),
            Value::Struct {
                members,
                extra_keys,
                wdl_type,
            } => {
                let mut resolved = std::collections::HashMap::new();
                for (name, v) in members {
                    resolved.insert(name.clone(), self.virtualize_value(v)?);
                }
                Ok(Value::Struct {
                    members: resolved,
                    extra_keys: extra_keys.clone(),
                    wdl_type: wdl_type.clone(),
                })
            }
            other => Ok(other.clone()),
        }
    }
}

/// Download a remote `http(s)://` URI into the file store and return the
/// local path, mirroring the "import, then devirtualize normally" behavior
/// external collaborators use for remote workflow inputs.
fn import_remote(store: &FileStore, uri: &str) -> Result<PathBuf, WdlError> {
    let response = reqwest::blocking::get(uri).map_err(|e| WdlError::Runtime {
        message: format!("failed to download {}: {}", uri, e),
        more_info: Default::default(),
    })?;
    let bytes = response.bytes().map_err(|e| WdlError::Runtime {
        message: format!("failed to read response body for {}: {}", uri, e),
        more_info: Default::default(),
    })?;

    let file_name = uri.rsplit('/').next().unwrap_or("download");
    let dir = store
        .local_temp_dir("remote-import")
        .map_err(|e| WdlError::Runtime {
            message: format!("failed to allocate download directory: {}", e),
            more_info: Default::default(),
        })?;
    let dest = dir.join(file_name);
    std::fs::write(&dest, &bytes).map_err(|e| WdlError::Runtime {
        message: format!("failed to write downloaded file {}: {}", dest.display(), e),
        more_info: Default::default(),
    })?;
    Ok(dest)
}

/// `PathMapper` adapter so `stdlib::StdLib` can devirtualize/virtualize
/// through the engine's file store without the stdlib crate depending on
/// `engine` directly.
pub struct VirtualizingPathMapper {
    virtualizer: Arc<FileVirtualizer>,
}

impl std::fmt::Debug for VirtualizingPathMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualizingPathMapper").finish()
    }
}

impl VirtualizingPathMapper {
    pub fn new(virtualizer: Arc<FileVirtualizer>) -> Self {
        Self { virtualizer }
    }
}

impl PathMapper for VirtualizingPathMapper {
    fn devirtualize_filename(&self, filename: &str) -> Result<PathBuf, WdlError> {
        self.virtualizer.devirtualize(filename)
    }

    fn virtualize_filename(&self, path: &Path) -> Result<String, WdlError> {
        self.virtualizer.virtualize(path)
    }

    fn clone_boxed(&self) -> Box<dyn PathMapper> {
        Box::new(VirtualizingPathMapper {
            virtualizer: self.virtualizer.clone(),
        })
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_round_trips() {
        let handle = make_handle("abc-123");
        assert_eq!(parse_handle(&handle).unwrap(), "abc-123");
    }

    #[test]
    fn non_handle_is_not_parsed() {
        assert!(parse_handle("/local/path.txt").is_none());
    }

    #[test]
    fn virtualize_then_devirtualize_round_trips_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(tmp.path().join("store")).unwrap());
        let virtualizer = FileVirtualizer::new(store);

        let src = tmp.path().join("input.txt");
        std::fs::write(&src, b"payload").unwrap();

        let handle = virtualizer.virtualize(&src).unwrap();
        assert!(handle.starts_with("toilfile:"));

        let resolved = virtualizer.devirtualize(&handle).unwrap();
        assert_eq!(std::fs::read_to_string(resolved).unwrap(), "payload");
    }

    #[test]
    fn plain_local_path_passes_through_unchanged() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(tmp.path().join("store")).unwrap());
        let virtualizer = FileVirtualizer::new(store);
        let resolved = virtualizer.devirtualize("/already/local/path.txt").unwrap();
        assert_eq!(resolved, PathBuf::from("/already/local/path.txt"));
    }

    #[test]
    fn virtualize_value_recurses_into_array_of_files() {
        use crate::types::Type;

        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(tmp.path().join("store")).unwrap());
        let virtualizer = FileVirtualizer::new(store);

        let src = tmp.path().join("a.txt");
        std::fs::write(&src, b"x").unwrap();

        let value = Value::Array {
            values: vec![Value::File {
                value: src.to_string_lossy().to_string(),
                wdl_type: Type::file(false),
            }],
            wdl_type: Type::array(Type::file(false), false, true),
        };

        let virtualized = virtualizer.virtualize_value(&value).unwrap();
        if let Value::Array { values, .. } = virtualized {
            if let Value::File { value: handle, .. } = &values[0] {
                assert!(handle.starts_with("toilfile:"));
            } else {
                panic!("expected File value");
            }
        } else {
            panic!("expected Array value");
        }
    }

    #[test]
    fn virtualize_value_is_idempotent_on_existing_handle() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(tmp.path().join("store")).unwrap());
        let virtualizer = FileVirtualizer::new(store);

        let src = tmp.path().join("b.txt");
        std::fs::write(&src, b"y").unwrap();
        let handle = virtualizer.virtualize(&src).unwrap();

        let value = Value::File {
            value: handle.clone(),
            wdl_type: crate::types::Type::file(false),
        };
        let reprocessed = virtualizer.virtualize_value(&value).unwrap();
        match reprocessed {
            Value::File { value: v, .. } => assert_eq!(v, handle),
            _ => panic!("expected File value"),
        }
    }
}
