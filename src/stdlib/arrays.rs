//! Array manipulation functions for WDL standard library

use super::Function;
use crate::error::WdlError;
use crate::types::Type;
use crate::value::Value;

/// Length function - returns the length of arrays, strings, or maps
pub struct LengthFunction;

impl Function for LengthFunction {
    fn name(&self) -> &str {
        "length"
    }

    fn infer_type(&self, args: &[Type]) -> Result<Type, WdlError> {
        if args.len() != 1 {
            return Err(WdlError::ArgumentCountMismatch {
                function: self.name().to_string(),
                expected: 1,
                actual: args.len(),
            });
        }

        match &args[0] {
            Type::Array { .. } | Type::String { .. } | Type::Map { .. } => Ok(Type::int(false)),
            _ => Err(WdlError::Runtime {
                message: format!("length() expects Array, String, or Map argument"),
                more_info: Default::default(),
            }),
        }
    }

    fn eval(&self, args: &[Value]) -> Result<Value, WdlError> {
        match &args[0] {
            Value::Array { values, .. } => Ok(Value::int(values.len() as i64)),
            Value::String { value, .. } => Ok(Value::int(value.len() as i64)),
            Value::Map { pairs, .. } => Ok(Value::int(pairs.len() as i64)),
            _ => Err(WdlError::Runtime {
                message: format!("length() expects Array, String, or Map argument"),
                more_info: Default::default(),
            }),
        }
    }
}

/// Create the length function
pub fn create_length_function() -> Box<dyn Function> {
    Box::new(LengthFunction)
}

/// Select first non-null element from an array
pub struct SelectFirstFunction;

impl Function for SelectFirstFunction {
    fn name(&self) -> &str {
        "select_first"
    }

    fn infer_type(&self, args: &[Type]) -> Result<Type, WdlError> {
        if args.len() != 1 {
            return Err(WdlError::ArgumentCountMismatch {
                function: self.name().to_string(),
                expected: 1,
                actual: args.len(),
            });
        }

        if let Type::Array { item_type, .. } = &args[0] {
            // Return the non-optional version of the item type
            Ok(item_type.clone().with_optional(false))
        } else {
            Err(WdlError::Runtime {
                message: format!("select_first() expects Array argument"),
                more_info: Default::default(),
            })
        }
    }

    fn eval(&self, args: &[Value]) -> Result<Value, WdlError> {
        if let Value::Array { values, .. } = &args[0] {
            for value in values {
                if !matches!(value, Value::Null { .. }) {
                    return Ok(value.clone());
                }
            }
            Err(WdlError::Runtime {
                message: format!("select_first() found no non-null values"),
                more_info: Default::default(),
            })
        } else {
            Err(WdlError::Runtime {
                message: format!("select_first() expects Array argument"),
                more_info: Default::default(),
            })
        }
    }
}

/// Create the select_first function
pub fn create_select_first_function() -> Box<dyn Function> {
    Box::new(SelectFirstFunction)
}

/// Select all non-null elements from an array
pub struct SelectAllFunction;

impl Function for SelectAllFunction {
    fn name(&self) -> &str {
        "select_all"
    }

    fn infer_type(&self, args: &[Type]) -> Result<Type, WdlError> {
        if args.len() != 1 {
            return Err(WdlError::ArgumentCountMismatch {
                function: self.name().to_string(),
                expected: 1,
                actual: args.len(),
            });
        }

        if let Type::Array { item_type, .. } = &args[0] {
            // Return array of non-optional items
            Ok(Type::array(
                item_type.clone().with_optional(false),
                false,
                true,
            ))
        } else {
            Err(WdlError::Runtime {
                message: format!("select_all() expects Array argument"),
                more_info: Default::default(),
            })
        }
    }

    fn eval(&self, args: &[Value]) -> Result<Value, WdlError> {
        if let Value::Array { values, wdl_type } = &args[0] {
            let non_null_values: Vec<Value> = values
                .iter()
                .filter(|v| !matches!(v, Value::Null { .. }))
                .cloned()
                .collect();

            if let Type::Array { item_type, .. } = wdl_type {
                Ok(Value::array(
                    item_type.clone().with_optional(false),
                    non_null_values,
                ))
            } else {
                unreachable!()
            }
        } else {
            Err(WdlError::Runtime {
                message: format!("select_all() expects Array argument"),
                more_info: Default::default(),
            })
        }
    }
}

/// Create the select_all function
pub fn create_select_all_function() -> Box<dyn Function> {
    Box::new(SelectAllFunction)
}

/// Flatten a 2D array into a 1D array
pub struct FlattenFunction;

impl Function for FlattenFunction {
    fn name(&self) -> &str {
        "flatten"
    }

    fn infer_type(&self, args: &[Type]) -> Result<Type, WdlError> {
        if args.len() != 1 {
            return Err(WdlError::ArgumentCountMismatch {
                function: self.name().to_string(),
                expected: 1,
                actual: args.len(),
            });
        }

        if let Type::Array { item_type, .. } = &args[0] {
            if let Type::Array {
                item_type: inner_type,
                ..
            } = item_type.as_ref()
            {
                // Array[Array[T]] -> Array[T]
                Ok(Type::array(*inner_type.clone(), false, false))
            } else {
                Err(WdlError::Runtime {
                    message: format!("flatten() expects Array[Array[T]] argument"),
                    more_info: Default::default(),
                })
            }
        } else {
            Err(WdlError::Runtime {
                message: format!("flatten() expects Array argument"),
                more_info: Default::default(),
            })
        }
    }

    fn eval(&self, args: &[Value]) -> Result<Value, WdlError> {
        if let Value::Array { values, wdl_type } = &args[0] {
            let mut flattened = Vec::new();

            for value in values {
                if let Value::Array { values: inner, .. } = value {
                    flattened.extend(inner.clone());
                } else {
                    return Err(WdlError::Runtime {
                        message: format!("flatten() expects Array[Array[T]]"),
                        more_info: Default::default(),
                    });
                }
            }

            if let Type::Array { item_type, .. } = wdl_type {
                if let Type::Array {
                    item_type: inner_type,
                    ..
                } = item_type.as_ref()
                {
                    return Ok(Value::array(*inner_type.clone(), flattened));
                }
            }

            Err(WdlError::Runtime {
                message: format!("flatten() type error"),
                more_info: Default::default(),
            })
        } else {
            Err(WdlError::Runtime {
                message: format!("flatten() expects Array argument"),
                more_info: Default::default(),
            })
        }
    }
}

/// Create the flatten function
pub fn create_flatten_function() -> Box<dyn Function> {
    Box::new(FlattenFunction)
}

/// Generate a range of integers from 0 to n-1
pub struct RangeFunction;

impl Function for RangeFunction {
    fn name(&self) -> &str {
        "range"
    }

    fn infer_type(&self, args: &[Type]) -> Result<Type, WdlError> {
        if args.len() != 1 {
            return Err(WdlError::ArgumentCountMismatch {
                function: self.name().to_string(),
                expected: 1,
                actual: args.len(),
            });
        }

        if !matches!(args[0], Type::Int { .. }) {
            return Err(WdlError::TypeMismatch {
                expected: Type::int(false),
                actual: args[0].clone(),
            });
        }

        Ok(Type::array(Type::int(false), false, true))
    }

    fn eval(&self, args: &[Value]) -> Result<Value, WdlError> {
        if let Some(n) = args[0].as_int() {
            if n < 0 {
                return Err(WdlError::Runtime {
                    message: format!("range() expects non-negative integer"),
                    more_info: Default::default(),
                });
            }

            let values: Vec<Value> = (0..n).map(Value::int).collect();
            Ok(Value::array(Type::int(false), values))
        } else {
            Err(WdlError::Runtime {
                message: format!("range() expects Int argument"),
                more_info: Default::default(),
            })
        }
    }
}

/// Create the range function
pub fn create_range_function() -> Box<dyn Function> {
    Box::new(RangeFunction)
}

fn as_array(value: &Value, fn_name: &str) -> Result<(Type, &[Value]), WdlError> {
    if let Value::Array { values, wdl_type } = value {
        Ok((wdl_type.clone(), values.as_slice()))
    } else {
        Err(WdlError::Runtime {
            message: format!("{}() expects Array argument", fn_name),
            more_info: Default::default(),
        })
    }
}

fn array_item_type(wdl_type: &Type) -> Type {
    if let Type::Array { item_type, .. } = wdl_type {
        item_type.as_ref().clone()
    } else {
        Type::any()
    }
}

/// Render a scalar value the way WDL string interpolation would, without
/// `Value`'s `Display` quoting (used for prefix/suffix/quote/squote).
fn stringify_scalar(value: &Value, fn_name: &str) -> Result<String, WdlError> {
    match value {
        Value::String { value, .. } | Value::File { value, .. } | Value::Directory { value, .. } => {
            Ok(value.clone())
        }
        Value::Int { value, .. } => Ok(value.to_string()),
        Value::Float { value, .. } => Ok(value.to_string()),
        Value::Boolean { value, .. } => Ok(value.to_string()),
        _ => Err(WdlError::Runtime {
            message: format!("{}() array elements must be a primitive type", fn_name),
            more_info: Default::default(),
        }),
    }
}

/// Prepend a prefix string to each element of a String array
pub struct PrefixFunction;

impl Function for PrefixFunction {
    fn name(&self) -> &str {
        "prefix"
    }

    fn infer_type(&self, args: &[Type]) -> Result<Type, WdlError> {
        if args.len() != 2 {
            return Err(WdlError::ArgumentCountMismatch {
                function: self.name().to_string(),
                expected: 2,
                actual: args.len(),
            });
        }
        if !matches!(args[0], Type::String { .. }) || !matches!(args[1], Type::Array { .. }) {
            return Err(WdlError::Runtime {
                message: format!("prefix() expects (String, Array[P])"),
                more_info: Default::default(),
            });
        }
        Ok(Type::array(Type::string(false), false, false))
    }

    fn eval(&self, args: &[Value]) -> Result<Value, WdlError> {
        let prefix = args[0].as_string().ok_or_else(|| WdlError::Runtime {
            message: format!("prefix() first argument must be String"),
            more_info: Default::default(),
        })?;
        let (_, values) = as_array(&args[1], "prefix")?;
        let result = values
            .iter()
            .map(|v| stringify_scalar(v, "prefix").map(|s| Value::string(format!("{}{}", prefix, s))))
            .collect::<Result<Vec<Value>, WdlError>>()?;
        Ok(Value::array(Type::string(false), result))
    }
}

/// Create the prefix function
pub fn create_prefix_function() -> Box<dyn Function> {
    Box::new(PrefixFunction)
}

/// Append a suffix string to each element of a String array
pub struct SuffixFunction;

impl Function for SuffixFunction {
    fn name(&self) -> &str {
        "suffix"
    }

    fn infer_type(&self, args: &[Type]) -> Result<Type, WdlError> {
        if args.len() != 2 {
            return Err(WdlError::ArgumentCountMismatch {
                function: self.name().to_string(),
                expected: 2,
                actual: args.len(),
            });
        }
        if !matches!(args[0], Type::String { .. }) || !matches!(args[1], Type::Array { .. }) {
            return Err(WdlError::Runtime {
                message: format!("suffix() expects (String, Array[P])"),
                more_info: Default::default(),
            });
        }
        Ok(Type::array(Type::string(false), false, false))
    }

    fn eval(&self, args: &[Value]) -> Result<Value, WdlError> {
        let suffix = args[0].as_string().ok_or_else(|| WdlError::Runtime {
            message: format!("suffix() first argument must be String"),
            more_info: Default::default(),
        })?;
        let (_, values) = as_array(&args[1], "suffix")?;
        let result = values
            .iter()
            .map(|v| stringify_scalar(v, "suffix").map(|s| Value::string(format!("{}{}", s, suffix))))
            .collect::<Result<Vec<Value>, WdlError>>()?;
        Ok(Value::array(Type::string(false), result))
    }
}

/// Create the suffix function
pub fn create_suffix_function() -> Box<dyn Function> {
    Box::new(SuffixFunction)
}

/// Quote each element of an array with double quotes
pub struct QuoteFunction;

impl Function for QuoteFunction {
    fn name(&self) -> &str {
        "quote"
    }

    fn infer_type(&self, args: &[Type]) -> Result<Type, WdlError> {
        if args.len() != 1 {
            return Err(WdlError::ArgumentCountMismatch {
                function: self.name().to_string(),
                expected: 1,
                actual: args.len(),
            });
        }
        if !matches!(args[0], Type::Array { .. }) {
            return Err(WdlError::Runtime {
                message: format!("quote() expects Array argument"),
                more_info: Default::default(),
            });
        }
        Ok(Type::array(Type::string(false), false, false))
    }

    fn eval(&self, args: &[Value]) -> Result<Value, WdlError> {
        let (_, values) = as_array(&args[0], "quote")?;
        let result = values
            .iter()
            .map(|v| stringify_scalar(v, "quote").map(|s| Value::string(format!("\"{}\"", s))))
            .collect::<Result<Vec<Value>, WdlError>>()?;
        Ok(Value::array(Type::string(false), result))
    }
}

/// Create the quote function
pub fn create_quote_function() -> Box<dyn Function> {
    Box::new(QuoteFunction)
}

/// Quote each element of an array with single quotes
pub struct SquoteFunction;

impl Function for SquoteFunction {
    fn name(&self) -> &str {
        "squote"
    }

    fn infer_type(&self, args: &[Type]) -> Result<Type, WdlError> {
        if args.len() != 1 {
            return Err(WdlError::ArgumentCountMismatch {
                function: self.name().to_string(),
                expected: 1,
                actual: args.len(),
            });
        }
        if !matches!(args[0], Type::Array { .. }) {
            return Err(WdlError::Runtime {
                message: format!("squote() expects Array argument"),
                more_info: Default::default(),
            });
        }
        Ok(Type::array(Type::string(false), false, false))
    }

    fn eval(&self, args: &[Value]) -> Result<Value, WdlError> {
        let (_, values) = as_array(&args[0], "squote")?;
        let result = values
            .iter()
            .map(|v| stringify_scalar(v, "squote").map(|s| Value::string(format!("'{}'", s))))
            .collect::<Result<Vec<Value>, WdlError>>()?;
        Ok(Value::array(Type::string(false), result))
    }
}

/// Create the squote function
pub fn create_squote_function() -> Box<dyn Function> {
    Box::new(SquoteFunction)
}

/// Zip two arrays element-wise into an array of Pairs
pub struct ZipFunction;

impl Function for ZipFunction {
    fn name(&self) -> &str {
        "zip"
    }

    fn infer_type(&self, args: &[Type]) -> Result<Type, WdlError> {
        if args.len() != 2 {
            return Err(WdlError::ArgumentCountMismatch {
                function: self.name().to_string(),
                expected: 2,
                actual: args.len(),
            });
        }
        if !matches!(args[0], Type::Array { .. }) || !matches!(args[1], Type::Array { .. }) {
            return Err(WdlError::Runtime {
                message: format!("zip() expects two Array arguments"),
                more_info: Default::default(),
            });
        }
        let left_item = array_item_type(&args[0]);
        let right_item = array_item_type(&args[1]);
        Ok(Type::array(
            Type::pair(left_item, right_item, false),
            false,
            false,
        ))
    }

    fn eval(&self, args: &[Value]) -> Result<Value, WdlError> {
        let (left_type, left) = as_array(&args[0], "zip")?;
        let (right_type, right) = as_array(&args[1], "zip")?;
        if left.len() != right.len() {
            return Err(WdlError::Runtime {
                message: format!("zip() expects arrays of equal length"),
                more_info: Default::default(),
            });
        }
        let left_item = array_item_type(&left_type);
        let right_item = array_item_type(&right_type);
        let pairs: Vec<Value> = left
            .iter()
            .zip(right.iter())
            .map(|(l, r)| {
                Value::pair(left_item.clone(), right_item.clone(), l.clone(), r.clone())
            })
            .collect();
        Ok(Value::array(
            Type::pair(left_item, right_item, false),
            pairs,
        ))
    }
}

/// Create the zip function
pub fn create_zip_function() -> Box<dyn Function> {
    Box::new(ZipFunction)
}

/// Cross product of two arrays into an array of Pairs
pub struct CrossFunction;

impl Function for CrossFunction {
    fn name(&self) -> &str {
        "cross"
    }

    fn infer_type(&self, args: &[Type]) -> Result<Type, WdlError> {
        if args.len() != 2 {
            return Err(WdlError::ArgumentCountMismatch {
                function: self.name().to_string(),
                expected: 2,
                actual: args.len(),
            });
        }
        if !matches!(args[0], Type::Array { .. }) || !matches!(args[1], Type::Array { .. }) {
            return Err(WdlError::Runtime {
                message: format!("cross() expects two Array arguments"),
                more_info: Default::default(),
            });
        }
        let left_item = array_item_type(&args[0]);
        let right_item = array_item_type(&args[1]);
        Ok(Type::array(
            Type::pair(left_item, right_item, false),
            false,
            false,
        ))
    }

    fn eval(&self, args: &[Value]) -> Result<Value, WdlError> {
        let (left_type, left) = as_array(&args[0], "cross")?;
        let (right_type, right) = as_array(&args[1], "cross")?;
        let left_item = array_item_type(&left_type);
        let right_item = array_item_type(&right_type);
        let mut pairs = Vec::with_capacity(left.len() * right.len());
        for l in left {
            for r in right {
                pairs.push(Value::pair(
                    left_item.clone(),
                    right_item.clone(),
                    l.clone(),
                    r.clone(),
                ));
            }
        }
        Ok(Value::array(
            Type::pair(left_item, right_item, false),
            pairs,
        ))
    }
}

/// Create the cross function
pub fn create_cross_function() -> Box<dyn Function> {
    Box::new(CrossFunction)
}

/// Split an array of Pairs into a Pair of arrays
pub struct UnzipFunction;

impl Function for UnzipFunction {
    fn name(&self) -> &str {
        "unzip"
    }

    fn infer_type(&self, args: &[Type]) -> Result<Type, WdlError> {
        if args.len() != 1 {
            return Err(WdlError::ArgumentCountMismatch {
                function: self.name().to_string(),
                expected: 1,
                actual: args.len(),
            });
        }
        if let Type::Array { item_type, .. } = &args[0] {
            if let Type::Pair {
                left_type,
                right_type,
                ..
            } = item_type.as_ref()
            {
                return Ok(Type::pair(
                    Type::array(*left_type.clone(), false, false),
                    Type::array(*right_type.clone(), false, false),
                    false,
                ));
            }
        }
        Err(WdlError::Runtime {
            message: format!("unzip() expects Array[Pair[L, R]] argument"),
            more_info: Default::default(),
        })
    }

    fn eval(&self, args: &[Value]) -> Result<Value, WdlError> {
        let (_, values) = as_array(&args[0], "unzip")?;
        let mut lefts = Vec::with_capacity(values.len());
        let mut rights = Vec::with_capacity(values.len());
        let mut left_type = Type::any();
        let mut right_type = Type::any();
        for v in values {
            if let Value::Pair {
                left,
                right,
                wdl_type,
            } = v
            {
                if let Type::Pair {
                    left_type: lt,
                    right_type: rt,
                    ..
                } = wdl_type
                {
                    left_type = *lt.clone();
                    right_type = *rt.clone();
                }
                lefts.push(left.as_ref().clone());
                rights.push(right.as_ref().clone());
            } else {
                return Err(WdlError::Runtime {
                    message: format!("unzip() expects Array[Pair[L, R]] argument"),
                    more_info: Default::default(),
                });
            }
        }
        let left_array = Value::array(left_type.clone(), lefts);
        let right_array = Value::array(right_type.clone(), rights);
        Ok(Value::pair(
            Type::array(left_type, false, false),
            Type::array(right_type, false, false),
            left_array,
            right_array,
        ))
    }
}

/// Create the unzip function
pub fn create_unzip_function() -> Box<dyn Function> {
    Box::new(UnzipFunction)
}

/// Transpose a 2D array (array of rows) into an array of columns
pub struct TransposeFunction;

impl Function for TransposeFunction {
    fn name(&self) -> &str {
        "transpose"
    }

    fn infer_type(&self, args: &[Type]) -> Result<Type, WdlError> {
        if args.len() != 1 {
            return Err(WdlError::ArgumentCountMismatch {
                function: self.name().to_string(),
                expected: 1,
                actual: args.len(),
            });
        }
        if let Type::Array { item_type, .. } = &args[0] {
            if matches!(item_type.as_ref(), Type::Array { .. }) {
                return Ok(args[0].clone());
            }
        }
        Err(WdlError::Runtime {
            message: format!("transpose() expects Array[Array[T]] argument"),
            more_info: Default::default(),
        })
    }

    fn eval(&self, args: &[Value]) -> Result<Value, WdlError> {
        let (outer_type, rows) = as_array(&args[0], "transpose")?;
        let inner_item_type = array_item_type(&array_item_type(&outer_type));

        let mut row_values: Vec<&[Value]> = Vec::with_capacity(rows.len());
        for row in rows {
            if let Value::Array { values, .. } = row {
                row_values.push(values.as_slice());
            } else {
                return Err(WdlError::Runtime {
                    message: format!("transpose() expects Array[Array[T]] argument"),
                    more_info: Default::default(),
                });
            }
        }

        let num_cols = row_values.first().map(|r| r.len()).unwrap_or(0);
        if row_values.iter().any(|r| r.len() != num_cols) {
            return Err(WdlError::Runtime {
                message: format!("transpose() expects a rectangular array of arrays"),
                more_info: Default::default(),
            });
        }

        let mut columns = Vec::with_capacity(num_cols);
        for col in 0..num_cols {
            let column: Vec<Value> = row_values.iter().map(|r| r[col].clone()).collect();
            columns.push(Value::array(inner_item_type.clone(), column));
        }

        Ok(Value::array(
            Type::array(inner_item_type, false, false),
            columns,
        ))
    }
}

/// Create the transpose function
pub fn create_transpose_function() -> Box<dyn Function> {
    Box::new(TransposeFunction)
}
