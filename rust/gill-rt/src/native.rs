//! The stable descriptor interface host modules register through: named
//! native functions with parameter specs and a callback, plus named native
//! variables.

use crate::error::RuntimeError;
use crate::values::Value;
use gill_compiler::compiler::tokens::TypeTag;
use std::fmt;
use std::rc::Rc;

pub type NativeCallback = Rc<dyn Fn(&[Value]) -> Result<Value, RuntimeError>>;

/// How a native parameter binds its arguments. Only `Positional` and
/// `Varargs` are callable; the other kinds are reserved and error at
/// invocation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Positional,
    Varargs,
    Keywords,
    Kwargs,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParamKind::Positional => "positional",
            ParamKind::Varargs => "varargs",
            ParamKind::Keywords => "keywords",
            ParamKind::Kwargs => "kwargs",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub declared_type: TypeTag,
    pub default_value: Option<Value>,
    pub kind: ParamKind,
}

impl ParamSpec {
    pub fn positional(name: &str, declared_type: TypeTag) -> Self {
        Self {
            name: name.to_string(),
            declared_type,
            default_value: None,
            kind: ParamKind::Positional,
        }
    }

    pub fn varargs(name: &str) -> Self {
        Self {
            name: name.to_string(),
            declared_type: TypeTag::Void,
            default_value: None,
            kind: ParamKind::Varargs,
        }
    }
}

#[derive(Clone)]
pub struct NativeFunction {
    pub name: String,
    pub params: Vec<ParamSpec>,
    pub callback: NativeCallback,
}

impl NativeFunction {
    pub fn new<F>(name: &str, params: Vec<ParamSpec>, callback: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, RuntimeError> + 'static,
    {
        Self {
            name: name.to_string(),
            params,
            callback: Rc::new(callback),
        }
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct NativeVariable {
    pub name: String,
    pub declared_type: TypeTag,
    pub value: Value,
}

impl NativeVariable {
    pub fn new(name: &str, declared_type: TypeTag, value: Value) -> Self {
        Self {
            name: name.to_string(),
            declared_type,
            value,
        }
    }
}

/// Everything a host module exports; the loader turns this into a module
/// environment.
#[derive(Debug)]
pub struct NativeModule {
    pub name: String,
    pub functions: Vec<NativeFunction>,
    pub variables: Vec<NativeVariable>,
}

/// A registered module source: called at most once per program, on first
/// import.
pub type ModuleLoader = fn() -> Result<NativeModule, RuntimeError>;
