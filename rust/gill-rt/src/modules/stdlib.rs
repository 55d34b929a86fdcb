//! The built-in `stdlib` module: formatted printing and small utilities.

use crate::error::RuntimeError;
use crate::native::{NativeFunction, NativeModule, NativeVariable, ParamSpec};
use crate::values::Value;
use gill_compiler::compiler::tokens::TypeTag;

pub fn load() -> Result<NativeModule, RuntimeError> {
    Ok(NativeModule {
        name: "stdlib".to_string(),
        functions: vec![
            NativeFunction::new(
                "printf",
                vec![
                    ParamSpec::positional("format", TypeTag::Str),
                    ParamSpec::varargs("args"),
                ],
                |args| {
                    let line = apply_format(args)?;
                    println!("{}", line);
                    Ok(Value::Null)
                },
            ),
            NativeFunction::new(
                "printfr",
                vec![
                    ParamSpec::positional("format", TypeTag::Str),
                    ParamSpec::varargs("args"),
                ],
                |args| {
                    let line = apply_format(args)?;
                    println!("{}", line);
                    Ok(Value::Str(line))
                },
            ),
            NativeFunction::new(
                "str_len",
                vec![ParamSpec::positional("s", TypeTag::Str)],
                |args| match &args[0] {
                    Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
                    Value::Char(_) => Ok(Value::Int(1)),
                    other => Err(RuntimeError::Type(format!(
                        "str_len expects a string, got {}",
                        other.type_name()
                    ))),
                },
            ),
            NativeFunction::new(
                "sizeof",
                vec![ParamSpec::positional("object", TypeTag::Void)],
                |args| Ok(Value::Int(args[0].size_bytes() as i64)),
            ),
            NativeFunction::new(
                "pow",
                vec![
                    ParamSpec::positional("base", TypeTag::Float),
                    ParamSpec::positional("exponent", TypeTag::Float),
                ],
                |args| {
                    let base = as_number(&args[0])?;
                    let exponent = as_number(&args[1])?;
                    Ok(Value::Float(base.powf(exponent)))
                },
            ),
        ],
        variables: vec![NativeVariable::new(
            "version",
            TypeTag::Str,
            Value::Str(env!("CARGO_PKG_VERSION").to_string()),
        )],
    })
}

/// Replace each `{}` in the format string with the next argument's
/// canonical form.
fn apply_format(args: &[Value]) -> Result<String, RuntimeError> {
    let format = match args.first() {
        Some(Value::Str(s)) => s.clone(),
        Some(other) => {
            return Err(RuntimeError::Type(format!(
                "format must be a string, got {}",
                other.type_name()
            )))
        }
        None => return Err(RuntimeError::Type("missing format string".to_string())),
    };
    let mut out = String::with_capacity(format.len());
    let mut values = args[1..].iter();
    let mut chars = format.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '{' && chars.peek() == Some(&'}') {
            chars.next();
            match values.next() {
                Some(value) => out.push_str(&value.to_string()),
                None => {
                    return Err(RuntimeError::Index(
                        "not enough arguments for format string".to_string(),
                    ))
                }
            }
        } else {
            out.push(ch);
        }
    }
    Ok(out)
}

fn as_number(value: &Value) -> Result<f64, RuntimeError> {
    match value {
        Value::Int(n) => Ok(*n as f64),
        Value::Float(f) => Ok(*f),
        other => Err(RuntimeError::Type(format!(
            "expected a number, got {}",
            other.type_name()
        ))),
    }
}
