//! String manipulation functions for WDL standard library

use crate::error::WdlError;
use crate::types::Type;
use crate::value::Value;
use super::Function;
use std::path::PathBuf;

/// Substitute function - performs regex substitution on strings
pub struct SubFunction;

impl Function for SubFunction {
    fn name(&self) -> &str { "sub" }
    
    fn infer_type(&self, args: &[Type]) -> Result<Type, WdlError> {
        if args.len() != 3 {
            return Err(WdlError::ArgumentCountMismatch {
                function: self.name().to_string(),
                expected: 3,
                actual: args.len(),
            });
        }
        
        if !matches!(args[0], Type::String { .. }) || 
           !matches!(args[1], Type::String { .. }) || 
           !matches!(args[2], Type::String { .. }) {
            return Err(WdlError::Runtime {
                message: format!("sub() expects three String arguments"),
                more_info: Default::default(),
            });
        }
        
        Ok(Type::string(false))
    }
    
    fn eval(&self, args: &[Value]) -> Result<Value, WdlError> {
        let input = args[0].as_string().ok_or_else(|| WdlError::Runtime {
            message: format!("sub() first argument must be String"),
            more_info: Default::default(),
        })?;
        
        let pattern = args[1].as_string().ok_or_else(|| WdlError::Runtime {
            message: format!("sub() second argument must be String"),
            more_info: Default::default(),
        })?;
        
        let replacement = args[2].as_string().ok_or_else(|| WdlError::Runtime {
            message: format!("sub() third argument must be String"),
            more_info: Default::default(),
        })?;
        
        // Simple string replacement for now (not full regex)
        let result = input.replace(&pattern, &replacement);
        Ok(Value::string(result))
    }
}

/// Create the sub function
pub fn create_sub_function() -> Box<dyn Function> {
    Box::new(SubFunction)
}

/// Basename function - extracts the filename from a path
pub struct BasenameFunction;

impl Function for BasenameFunction {
    fn name(&self) -> &str { "basename" }
    
    fn infer_type(&self, args: &[Type]) -> Result<Type, WdlError> {
        if args.len() < 1 || args.len() > 2 {
            return Err(WdlError::ArgumentCountMismatch {
                function: self.name().to_string(),
                expected: 1, // or 2
                actual: args.len(),
            });
        }
        
        if !matches!(args[0], Type::String { .. } | Type::File { .. }) {
            return Err(WdlError::Runtime {
                message: format!("basename() first argument must be String or File"),
                more_info: Default::default(),
            });
        }
        
        if args.len() == 2 && !matches!(args[1], Type::String { optional: true, .. }) {
            return Err(WdlError::Runtime {
                message: format!("basename() second argument must be String?"),
                more_info: Default::default(),
            });
        }
        
        Ok(Type::string(false))
    }
    
    fn eval(&self, args: &[Value]) -> Result<Value, WdlError> {
        let path = args[0].as_string().ok_or_else(|| WdlError::Runtime {
            message: format!("basename() first argument must be String"),
            more_info: Default::default(),
        })?;
        
        let base = path.rsplit('/').next().unwrap_or(&path);
        
        if args.len() == 2 {
            if let Some(suffix) = args[1].as_string() {
                if base.ends_with(&suffix) {
                    let trimmed = &base[..base.len() - suffix.len()];
                    return Ok(Value::string(trimmed.to_string()));
                }
            }
        }
        
        Ok(Value::string(base.to_string()))
    }
}

/// Create the basename function
pub fn create_basename_function() -> Box<dyn Function> {
    Box::new(BasenameFunction)
}

/// Sep function - joins array elements with a separator
pub struct SepFunction;

impl Function for SepFunction {
    fn name(&self) -> &str { "sep" }
    
    fn infer_type(&self, args: &[Type]) -> Result<Type, WdlError> {
        if args.len() != 2 {
            return Err(WdlError::ArgumentCountMismatch {
                function: self.name().to_string(),
                expected: 2,
                actual: args.len(),
            });
        }
        
        if !matches!(args[0], Type::String { .. }) {
            return Err(WdlError::Runtime {
                message: format!("sep() first argument must be String"),
                more_info: Default::default(),
            });
        }
        
        if !matches!(args[1], Type::Array { .. }) {
            return Err(WdlError::Runtime {
                message: format!("sep() second argument must be Array"),
                more_info: Default::default(),
            });
        }
        
        Ok(Type::string(false))
    }
    
    fn eval(&self, args: &[Value]) -> Result<Value, WdlError> {
        let separator = args[0].as_string().ok_or_else(|| WdlError::Runtime {
            message: format!("sep() first argument must be String"),
            more_info: Default::default(),
        })?;
        
        if let Value::Array { values, .. } = &args[1] {
            let strings: Result<Vec<String>, _> = values
                .iter()
                .map(|v| v.as_string().map(|s| s.to_string()).ok_or_else(|| WdlError::Runtime {
                    message: format!("sep() array elements must be String"),
                    more_info: Default::default(),
                }))
                .collect();
            
            Ok(Value::string(strings?.join(&separator)))
        } else {
            Err(WdlError::Runtime {
                message: format!("sep() second argument must be Array"),
                more_info: Default::default(),
            })
        }
    }
}

/// Create the sep function
pub fn create_sep_function() -> Box<dyn Function> {
    Box::new(SepFunction)
}

/// Find function - returns the first regex match in a string, or None
pub struct FindFunction;

impl Function for FindFunction {
    fn name(&self) -> &str {
        "find"
    }

    fn infer_type(&self, args: &[Type]) -> Result<Type, WdlError> {
        if args.len() != 2 {
            return Err(WdlError::ArgumentCountMismatch {
                function: self.name().to_string(),
                expected: 2,
                actual: args.len(),
            });
        }

        if !matches!(args[0], Type::String { .. }) || !matches!(args[1], Type::String { .. }) {
            return Err(WdlError::Runtime {
                message: format!("find() expects two String arguments"),
                more_info: Default::default(),
            });
        }

        Ok(Type::string(true))
    }

    fn eval(&self, args: &[Value]) -> Result<Value, WdlError> {
        let input = args[0].as_string().ok_or_else(|| WdlError::Runtime {
            message: format!("find() first argument must be String"),
            more_info: Default::default(),
        })?;

        let pattern = args[1].as_string().ok_or_else(|| WdlError::Runtime {
            message: format!("find() second argument must be String"),
            more_info: Default::default(),
        })?;

        let re = regex::Regex::new(&pattern).map_err(|e| WdlError::Runtime {
            message: format!("find() invalid regex pattern: {}", e),
            more_info: Default::default(),
        })?;

        match re.find(&input) {
            Some(m) => Ok(Value::string(m.as_str().to_string())),
            None => Ok(Value::null()),
        }
    }
}

/// Create the find function
pub fn create_find_function() -> Box<dyn Function> {
    Box::new(FindFunction)
}

/// JoinPaths function - joins a base path with one or more child paths
pub struct JoinPathsFunction;

impl Function for JoinPathsFunction {
    fn name(&self) -> &str {
        "join_paths"
    }

    fn infer_type(&self, args: &[Type]) -> Result<Type, WdlError> {
        match args.len() {
            1 => {
                if !matches!(args[0], Type::Array { .. }) {
                    return Err(WdlError::Runtime {
                        message: format!("join_paths() with one argument expects Array[String]"),
                        more_info: Default::default(),
                    });
                }
            }
            2 => {
                if !matches!(args[0], Type::String { .. } | Type::File { .. }) {
                    return Err(WdlError::Runtime {
                        message: format!("join_paths() first argument must be String or File"),
                        more_info: Default::default(),
                    });
                }
                if !matches!(args[1], Type::String { .. } | Type::Array { .. }) {
                    return Err(WdlError::Runtime {
                        message: format!(
                            "join_paths() second argument must be String or Array[String]"
                        ),
                        more_info: Default::default(),
                    });
                }
            }
            _ => {
                return Err(WdlError::ArgumentCountMismatch {
                    function: self.name().to_string(),
                    expected: 2,
                    actual: args.len(),
                })
            }
        }

        Ok(Type::file(false))
    }

    fn eval(&self, args: &[Value]) -> Result<Value, WdlError> {
        let mut segments: Vec<String> = Vec::new();

        match args.len() {
            1 => {
                if let Value::Array { values, .. } = &args[0] {
                    for v in values {
                        segments.push(v.as_string().ok_or_else(|| WdlError::Runtime {
                            message: format!("join_paths() array elements must be String"),
                            more_info: Default::default(),
                        })?.to_string());
                    }
                } else {
                    return Err(WdlError::Runtime {
                        message: format!("join_paths() expects Array[String] argument"),
                        more_info: Default::default(),
                    });
                }
            }
            2 => {
                let base = args[0].as_string().ok_or_else(|| WdlError::Runtime {
                    message: format!("join_paths() first argument must be String or File"),
                    more_info: Default::default(),
                })?;
                segments.push(base.to_string());

                match &args[1] {
                    Value::String { value, .. } => segments.push(value.clone()),
                    Value::Array { values, .. } => {
                        for v in values {
                            segments.push(v.as_string().ok_or_else(|| WdlError::Runtime {
                                message: format!("join_paths() array elements must be String"),
                                more_info: Default::default(),
                            })?.to_string());
                        }
                    }
                    _ => {
                        return Err(WdlError::Runtime {
                            message: format!(
                                "join_paths() second argument must be String or Array[String]"
                            ),
                            more_info: Default::default(),
                        })
                    }
                }
            }
            _ => {
                return Err(WdlError::Runtime {
                    message: format!("join_paths() expects 1 or 2 arguments"),
                    more_info: Default::default(),
                })
            }
        }

        let mut result = PathBuf::new();
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 && std::path::Path::new(segment).is_absolute() {
                // An absolute child path replaces everything accumulated so far.
                result = PathBuf::from(segment);
            } else {
                result.push(segment);
            }
        }

        Value::file(result.to_string_lossy().to_string())
    }
}

/// Create the join_paths function
pub fn create_join_paths_function() -> Box<dyn Function> {
    Box::new(JoinPathsFunction)
}