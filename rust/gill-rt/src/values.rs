//! Runtime values for the GILL interpreter.

use crate::env::EnvRef;
use gill_compiler::compiler::tokens::TypeTag;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// What a `NativeRef` points at inside a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberKind {
    Function,
    Variable,
}

/// An array with its element type fixed at definition time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    pub elements: Vec<Value>,
    pub element_type: TypeTag,
}

/// Runtime values. Arrays are wrapped in `Rc` for cheap cloning; module
/// handles are shared environments and compare by pointer identity.
///
/// Data values round-trip through serde. `Module` and `NativeRef` hold live
/// environments (with native callbacks) and are excluded from
/// (de)serialization.
#[derive(Clone, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Char(char),
    Array(Rc<ArrayValue>),
    #[serde(skip)]
    Module(EnvRef),
    #[serde(skip)]
    NativeRef {
        module: EnvRef,
        member: String,
        kind: MemberKind,
    },
}

impl Value {
    pub fn new_array(elements: Vec<Value>, element_type: TypeTag) -> Self {
        Value::Array(Rc::new(ArrayValue {
            elements,
            element_type,
        }))
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Char(_) => true,
            Value::Array(a) => !a.elements.is_empty(),
            Value::Module(_) | Value::NativeRef { .. } => true,
        }
    }

    /// Text category: strings and chars both count.
    pub fn is_text(&self) -> bool {
        matches!(self, Value::Str(_) | Value::Char(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Char(_) => "char",
            Value::Array(_) => "array",
            Value::Module(_) => "module",
            Value::NativeRef { .. } => "native ref",
        }
    }

    /// The type tag of this value's runtime category.
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Null => TypeTag::Void,
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::Str(_) => TypeTag::Str,
            Value::Char(_) => TypeTag::Char,
            Value::Array(a) => TypeTag::Array(Box::new(a.element_type.clone())),
            Value::Module(_) | Value::NativeRef { .. } => TypeTag::Module,
        }
    }

    /// Whether this value satisfies a declared type. Chars satisfy `string`
    /// and 1-length text satisfies `char` (both are the text category).
    pub fn matches_tag(&self, tag: &TypeTag) -> bool {
        match tag {
            TypeTag::Int => matches!(self, Value::Int(_)),
            TypeTag::Float => matches!(self, Value::Float(_)),
            TypeTag::Str => self.is_text(),
            TypeTag::Char => match self {
                Value::Char(_) => true,
                Value::Str(s) => s.chars().count() == 1,
                _ => false,
            },
            TypeTag::Bool => matches!(self, Value::Bool(_)),
            TypeTag::Void => matches!(self, Value::Null),
            TypeTag::Array(inner) => {
                matches!(self, Value::Array(a) if a.element_type == **inner)
            }
            TypeTag::Module | TypeTag::Namespace => {
                matches!(self, Value::Module(_))
            }
        }
    }

    /// Approximate in-memory size in bytes.
    pub fn size_bytes(&self) -> usize {
        let base = std::mem::size_of::<Value>();
        match self {
            Value::Str(s) => base + s.len(),
            Value::Array(a) => base + a.elements.iter().map(Value::size_bytes).sum::<usize>(),
            _ => base,
        }
    }

    fn as_text(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s.clone()),
            Value::Char(c) => Some(c.to_string()),
            _ => None,
        }
    }
}

/// Structural equality. Numbers compare across `Int`/`Float`; chars compare
/// with 1-length strings; module handles compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                *a as f64 == *b
            }
            (Value::Array(a), Value::Array(b)) => a.elements == b.elements,
            (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
            (
                Value::NativeRef {
                    module: m1,
                    member: n1,
                    kind: k1,
                },
                Value::NativeRef {
                    module: m2,
                    member: n2,
                    kind: k2,
                },
            ) => Rc::ptr_eq(m1, m2) && n1 == n2 && k1 == k2,
            _ => match (self.as_text(), other.as_text()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

/// Canonical display form: `true`/`false`, `null`, floats always with a
/// decimal point, arrays bracketed and comma separated.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Str(s) => write!(f, "{}", s),
            Value::Char(c) => write!(f, "{}", c),
            Value::Array(a) => {
                write!(f, "[")?;
                for (i, elem) in a.elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, "]")
            }
            Value::Module(env) => {
                let name = env.borrow().module_name.clone().unwrap_or_default();
                write!(f, "<module '{}'>", name)
            }
            Value::NativeRef {
                module,
                member,
                kind,
            } => {
                let mod_name = module.borrow().module_name.clone().unwrap_or_default();
                let what = match kind {
                    MemberKind::Function => "function",
                    MemberKind::Variable => "variable",
                };
                write!(f, "<native {} '{}.{}'>", what, mod_name, member)
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::Char(c) => write!(f, "Char({:?})", c),
            Value::Module(_) => write!(f, "Module(<{}>)", self),
            Value::NativeRef { .. } => write!(f, "NativeRef(<{}>)", self),
            other => write!(f, "{}({})", other.type_name(), other),
        }
    }
}
