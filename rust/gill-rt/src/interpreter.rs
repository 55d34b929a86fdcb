//! Tree-walking evaluator: one visitor over the AST, a current-environment
//! pointer, and a shared module registry.

use crate::env::{self, Binding, Env, EnvRef, FunctionObject};
use crate::error::{RuntimeError, Signal};
use crate::native::{ModuleLoader, NativeFunction, ParamKind};
use crate::values::{MemberKind, Value};
use gill_compiler::compiler::ast::{BinOp, FunctionDef, Node, Number};
use gill_compiler::compiler::tokens::TypeTag;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::Rc;

type EvalResult = Result<Value, Signal>;

pub struct Interpreter {
    /// The current environment; function calls and loops swap it out and
    /// restore it on every exit path.
    env: EnvRef,
    globals: EnvRef,
    loaders: HashMap<String, ModuleLoader>,
    /// Captured `out` lines (also printed to stdout).
    pub output: Vec<String>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Env::global();
        Self {
            env: globals.clone(),
            globals,
            loaders: crate::modules::builtin_loaders(),
            output: Vec::new(),
        }
    }

    /// Make another module importable. The loader runs at most once, on the
    /// first `import` of the name.
    pub fn register_module(&mut self, name: &str, loader: ModuleLoader) {
        self.loaders.insert(name.to_string(), loader);
    }

    pub fn globals(&self) -> &EnvRef {
        &self.globals
    }

    /// Evaluate a program. A `return` signal escaping the top level is a
    /// runtime error; everything else surfaces as its taxonomy kind.
    pub fn run(&mut self, program: &Node) -> Result<Value, RuntimeError> {
        match self.eval(program) {
            Ok(value) => Ok(value),
            Err(Signal::Return(_)) => Err(RuntimeError::Runtime(
                "'return' outside of a function".to_string(),
            )),
            Err(Signal::Error(err)) => Err(err),
        }
    }

    /// Run `f` with `env` as the current environment, restoring the
    /// previous one on every exit path.
    fn in_env<F>(&mut self, env: EnvRef, f: F) -> EvalResult
    where
        F: FnOnce(&mut Self) -> EvalResult,
    {
        let prev = std::mem::replace(&mut self.env, env);
        let result = f(self);
        self.env = prev;
        result
    }

    pub fn eval(&mut self, node: &Node) -> EvalResult {
        match node {
            // ── Literals ──
            Node::Number(Number::Int(n)) => Ok(Value::Int(*n)),
            Node::Number(Number::Float(f)) => Ok(Value::Float(*f)),
            Node::Str(s) => Ok(Value::Str(s.clone())),
            Node::Char(c) => Ok(Value::Char(*c)),
            Node::Boolean(spelling) => match spelling.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                other => Err(RuntimeError::Value(format!(
                    "invalid boolean literal: {}",
                    other
                ))
                .into()),
            },

            // ── References ──
            Node::Identifier { name, .. } => {
                if let Some(binding) = env::lookup(&self.env, name) {
                    Ok(binding.value)
                } else if let Some(module) = env::lookup_module(&self.env, name) {
                    Ok(Value::Module(module))
                } else {
                    Err(RuntimeError::Name(format!("variable '{}' is not defined", name)).into())
                }
            }
            Node::ArrayAccess { array, index } => {
                let binding = env::lookup(&self.env, array).ok_or_else(|| {
                    RuntimeError::Name(format!("variable '{}' is not defined", array))
                })?;
                let arr = match binding.value {
                    Value::Array(a) => a,
                    other => {
                        return Err(RuntimeError::Type(format!(
                            "variable '{}' is not an array, got {}",
                            array,
                            other.type_name()
                        ))
                        .into())
                    }
                };
                let idx = match self.eval(index)? {
                    Value::Int(n) => n,
                    other => {
                        return Err(RuntimeError::Type(format!(
                            "array index must be an integer, got {}",
                            other.type_name()
                        ))
                        .into())
                    }
                };
                if idx < 0 || idx as usize >= arr.elements.len() {
                    return Err(RuntimeError::Index(format!(
                        "index {} out of bounds for array '{}' of size {}",
                        idx,
                        array,
                        arr.elements.len()
                    ))
                    .into());
                }
                Ok(arr.elements[idx as usize].clone())
            }

            // ── Operators ──
            Node::BinOp { left, op, right } => {
                let lhs = self.eval(left)?;
                let rhs = self.eval(right)?;
                Ok(self.eval_binop(*op, lhs, rhs)?)
            }
            Node::UnaryOp { operand, .. } => {
                let value = self.eval(operand)?;
                Ok(Value::Bool(!value.is_truthy()))
            }
            Node::Cast { target, expr } => {
                let value = self.eval(expr)?;
                Ok(self.eval_cast(target, value)?)
            }
            Node::Inc(name) => self.step_binding(name, 1),
            Node::Dec(name) => self.step_binding(name, -1),

            // ── Declaration and mutation ──
            Node::Define {
                name,
                declared_type,
                value,
            } => {
                let v = self.eval(value)?;
                if let Value::Array(array) = &v {
                    for (i, element) in array.elements.iter().enumerate() {
                        if !element.matches_tag(declared_type) {
                            return Err(RuntimeError::Type(format!(
                                "type mismatch in array at index {}: expected {}, got {}",
                                i,
                                declared_type,
                                element.type_name()
                            ))
                            .into());
                        }
                    }
                    let retyped = Value::new_array(array.elements.clone(), declared_type.clone());
                    self.env.borrow_mut().define(
                        name,
                        Binding {
                            declared_type: TypeTag::Array(Box::new(declared_type.clone())),
                            value: retyped.clone(),
                        },
                    );
                    return Ok(retyped);
                }
                if !v.matches_tag(declared_type) {
                    return Err(RuntimeError::Type(format!(
                        "type mismatch: expected {}, got {}",
                        declared_type,
                        v.type_name()
                    ))
                    .into());
                }
                self.env.borrow_mut().define(
                    name,
                    Binding {
                        declared_type: declared_type.clone(),
                        value: v.clone(),
                    },
                );
                Ok(v)
            }
            Node::Assign { name, value } => {
                let v = self.eval(value)?;
                let binding = env::lookup(&self.env, name).ok_or_else(|| {
                    RuntimeError::Name(format!("variable '{}' is not defined", name))
                })?;
                if !v.matches_tag(&binding.declared_type) {
                    return Err(RuntimeError::Type(format!(
                        "type mismatch: cannot assign {} to '{}' declared {}",
                        v.type_name(),
                        name,
                        binding.declared_type
                    ))
                    .into());
                }
                env::assign(&self.env, name, v.clone());
                Ok(v)
            }

            // ── Blocks ──
            Node::Block(statements) => {
                let mut last = Value::Null;
                for statement in statements {
                    last = self.eval(statement)?;
                }
                Ok(last)
            }

            // ── Control flow ──
            Node::If {
                condition,
                then_block,
                else_block,
            } => {
                if self.eval(condition)?.is_truthy() {
                    self.eval(then_block)
                } else if let Some(else_block) = else_block {
                    self.eval(else_block)
                } else {
                    Ok(Value::Null)
                }
            }
            Node::While { condition, body } => {
                let loop_env = Env::child_of(&self.env);
                self.in_env(loop_env, |interp| {
                    while interp.eval(condition)?.is_truthy() {
                        interp.eval(body)?;
                    }
                    Ok(Value::Null)
                })
            }
            Node::For {
                init_name,
                init_value,
                condition,
                step,
                body,
            } => {
                let (declared_type, value) = match *init_value {
                    Number::Int(n) => (TypeTag::Int, Value::Int(n)),
                    Number::Float(f) => (TypeTag::Float, Value::Float(f)),
                };
                let loop_env = Env::child_of(&self.env);
                loop_env.borrow_mut().define(
                    init_name,
                    Binding {
                        declared_type,
                        value,
                    },
                );
                self.in_env(loop_env, |interp| {
                    while interp.eval(condition)?.is_truthy() {
                        interp.eval(body)?;
                        interp.eval(step)?;
                    }
                    Ok(Value::Null)
                })
            }
            Node::ForEach {
                iter_name,
                iterable,
                body,
            } => {
                let array = match self.eval(iterable)? {
                    Value::Array(a) => a,
                    other => {
                        return Err(RuntimeError::Type(format!(
                            "foreach iterable must be an array, got {}",
                            other.type_name()
                        ))
                        .into())
                    }
                };
                let loop_env = Env::child_of(&self.env);
                loop_env.borrow_mut().define(
                    iter_name,
                    Binding {
                        declared_type: array.element_type.clone(),
                        value: Value::Null,
                    },
                );
                self.in_env(loop_env.clone(), |interp| {
                    for item in &array.elements {
                        if let Some(binding) = loop_env.borrow_mut().local_binding_mut(iter_name)
                        {
                            binding.value = item.clone();
                        }
                        interp.eval(body)?;
                    }
                    Ok(Value::Null)
                })
            }
            Node::Switch {
                scrutinee,
                cases,
                default,
            } => {
                let subject = self.eval(scrutinee)?;
                for arm in cases {
                    let candidate = self.eval(&arm.value)?;
                    if subject == candidate {
                        return self.eval(&arm.body);
                    }
                }
                if let Some(default_block) = default {
                    return self.eval(default_block);
                }
                Ok(Value::Null)
            }
            Node::TryCatch {
                try_block,
                catch_block,
                finally_block,
            } => {
                // `Return` is not an error and passes straight through.
                let result = match self.eval(try_block) {
                    Err(Signal::Error(_)) => self.eval(catch_block),
                    other => other,
                };
                if let Some(finally_block) = finally_block {
                    self.eval(finally_block)?;
                }
                result
            }

            // ── Procedures ──
            Node::FunctionDef(def) => {
                self.env.borrow_mut().define_function(
                    &def.name,
                    FunctionObject::User {
                        def: def.clone(),
                        env: self.env.clone(),
                    },
                );
                Ok(Value::Null)
            }
            Node::FunctionCall { name, args, module } => {
                let func = self.resolve_function(name, module.as_deref())?;
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.eval(arg)?);
                }
                match func {
                    FunctionObject::Native(native) => Ok(self.call_native(&native, &arg_values)?),
                    FunctionObject::User { def, env } => self.call_user(&def, &env, arg_values),
                }
            }
            Node::Return(expr) => {
                let value = self.eval(expr)?;
                Err(Signal::Return(value))
            }

            // ── Data ──
            Node::Array {
                elements,
                declared_size,
            } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval(element)?);
                }
                if values.len() != *declared_size {
                    return Err(RuntimeError::Value(format!(
                        "array size mismatch: expected {}, got {}",
                        declared_size,
                        values.len()
                    ))
                    .into());
                }
                let element_type = values.first().map(Value::tag).unwrap_or(TypeTag::Void);
                Ok(Value::new_array(values, element_type))
            }

            // ── Output ──
            Node::Output(expr) => {
                let value = self.eval(expr)?;
                let line = value.to_string();
                println!("{}", line);
                self.output.push(line);
                Ok(value)
            }

            // ── Modules ──
            Node::Import(name) => {
                let handle = self.load_module(name)?;
                self.env.borrow_mut().define(
                    name,
                    Binding {
                        declared_type: TypeTag::Module,
                        value: Value::Module(handle),
                    },
                );
                Ok(Value::Null)
            }
            Node::Namespace { name, body } => {
                let ns_env = Env::child_of(&self.env);
                ns_env.borrow_mut().module_name = Some(name.clone());
                self.in_env(ns_env.clone(), |interp| interp.eval(body))?;
                let registry = self.env.borrow().modules.clone();
                registry.borrow_mut().insert(name.clone(), ns_env.clone());
                self.env.borrow_mut().define(
                    name,
                    Binding {
                        declared_type: TypeTag::Namespace,
                        value: Value::Module(ns_env),
                    },
                );
                Ok(Value::Null)
            }
            Node::ScopeRef { scope, member } => {
                let target = if let Some(module) = env::lookup_module(&self.env, scope) {
                    Value::Module(module)
                } else if let Some(binding) = env::lookup(&self.env, scope) {
                    binding.value
                } else {
                    return Err(
                        RuntimeError::Name(format!("variable '{}' is not defined", scope)).into(),
                    );
                };
                let menv = match target {
                    Value::Module(m) => m,
                    other => {
                        return Err(RuntimeError::Type(format!(
                            "left operand of '::' must be a module, got {}",
                            other.type_name()
                        ))
                        .into())
                    }
                };
                let is_function = menv.borrow().local_function(member).is_some();
                if is_function {
                    return Ok(Value::NativeRef {
                        module: menv,
                        member: member.clone(),
                        kind: MemberKind::Function,
                    });
                }
                let is_variable = menv.borrow().has_var(member);
                if is_variable {
                    return Ok(Value::NativeRef {
                        module: menv,
                        member: member.clone(),
                        kind: MemberKind::Variable,
                    });
                }
                Err(RuntimeError::Name(format!(
                    "'{}' not found in scope '{}'",
                    member, scope
                ))
                .into())
            }
        }
    }

    // ── Calls ──

    fn resolve_function(
        &self,
        name: &str,
        module: Option<&str>,
    ) -> Result<FunctionObject, RuntimeError> {
        if let Some(mod_name) = module {
            let menv = env::lookup_module(&self.env, mod_name)
                .ok_or_else(|| RuntimeError::Name(format!("module '{}' is not loaded", mod_name)))?;
            let func = menv.borrow().local_function(name);
            func.ok_or_else(|| {
                RuntimeError::Name(format!(
                    "function '{}' not found in module '{}'",
                    name, mod_name
                ))
            })
        } else {
            env::lookup_function(&self.env, name)
                .ok_or_else(|| RuntimeError::Name(format!("function '{}' is not defined", name)))
        }
    }

    fn call_user(
        &mut self,
        def: &Rc<FunctionDef>,
        def_env: &EnvRef,
        args: Vec<Value>,
    ) -> EvalResult {
        if args.len() != def.params.len() {
            return Err(RuntimeError::Type(format!(
                "function '{}' expected {} arguments, got {}",
                def.name,
                def.params.len(),
                args.len()
            ))
            .into());
        }
        let call_env = Env::child_of(def_env);
        for param in &def.params {
            // Defaults evaluate in the defining environment before the
            // positional arguments overwrite them.
            let value = match &param.default_value {
                Some(expr) => self.in_env(def_env.clone(), |interp| interp.eval(expr))?,
                None => Value::Null,
            };
            call_env.borrow_mut().define(
                &param.name,
                Binding {
                    declared_type: param.declared_type.clone(),
                    value,
                },
            );
        }
        for (param, arg) in def.params.iter().zip(args) {
            if let Some(binding) = call_env.borrow_mut().local_binding_mut(&param.name) {
                binding.value = arg;
            }
        }
        match self.in_env(call_env, |interp| interp.eval(&def.body)) {
            Err(Signal::Return(value)) => Ok(value),
            other => other,
        }
    }

    fn call_native(
        &mut self,
        native: &NativeFunction,
        args: &[Value],
    ) -> Result<Value, RuntimeError> {
        for param in &native.params {
            if matches!(param.kind, ParamKind::Keywords | ParamKind::Kwargs) {
                return Err(RuntimeError::Runtime(format!(
                    "parameter kind '{}' is not supported for native function '{}'",
                    param.kind, native.name
                )));
            }
        }
        let required = native
            .params
            .iter()
            .filter(|p| p.kind == ParamKind::Positional && p.default_value.is_none())
            .count();
        let positional = native
            .params
            .iter()
            .filter(|p| p.kind == ParamKind::Positional)
            .count();
        let has_varargs = native.params.iter().any(|p| p.kind == ParamKind::Varargs);
        if args.len() < required {
            return Err(RuntimeError::Type(format!(
                "function '{}' expected at least {} arguments, got {}",
                native.name,
                required,
                args.len()
            )));
        }
        if !has_varargs && args.len() > positional {
            return Err(RuntimeError::Type(format!(
                "function '{}' expected at most {} arguments, got {}",
                native.name,
                positional,
                args.len()
            )));
        }
        (native.callback)(args)
    }

    // ── Modules ──

    fn load_module(&mut self, name: &str) -> Result<EnvRef, RuntimeError> {
        let registry = self.globals.borrow().modules.clone();
        if let Some(cached) = registry.borrow().get(name).cloned() {
            return Ok(cached);
        }
        let loader = self
            .loaders
            .get(name)
            .copied()
            .ok_or_else(|| RuntimeError::Import(format!("module '{}' does not exist", name)))?;
        let descriptor = loader()
            .map_err(|e| RuntimeError::Import(format!("error loading module '{}': {}", name, e)))?;
        let module_env = Env::module(&descriptor.name, registry.clone());
        {
            let mut menv = module_env.borrow_mut();
            for func in descriptor.functions {
                let func_name = func.name.clone();
                menv.define_function(&func_name, FunctionObject::Native(Rc::new(func)));
            }
            for var in descriptor.variables {
                let var_name = var.name.clone();
                menv.define(
                    &var_name,
                    Binding {
                        declared_type: var.declared_type,
                        value: var.value,
                    },
                );
            }
        }
        registry.borrow_mut().insert(name.to_string(), module_env.clone());
        Ok(module_env)
    }

    // ── Mutation helpers ──

    fn step_binding(&mut self, name: &str, delta: i64) -> EvalResult {
        let verb = if delta > 0 { "increment" } else { "decrement" };
        let binding = env::lookup(&self.env, name)
            .ok_or_else(|| RuntimeError::Name(format!("variable '{}' is not defined", name)))?;
        let next = match binding.value {
            Value::Int(n) => Value::Int(
                n.checked_add(delta)
                    .ok_or_else(|| RuntimeError::Runtime("integer overflow".to_string()))?,
            ),
            Value::Float(f) => Value::Float(f + delta as f64),
            other => {
                return Err(RuntimeError::Type(format!(
                    "cannot {} '{}' of type {}",
                    verb,
                    name,
                    other.type_name()
                ))
                .into())
            }
        };
        env::assign(&self.env, name, next.clone());
        Ok(next)
    }

    // ── Operators ──

    fn eval_binop(&self, op: BinOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
        match op {
            BinOp::Add => {
                if left.is_text() || right.is_text() {
                    return Ok(Value::Str(format!("{}{}", left, right)));
                }
                self.numeric_binop(op, left, right)
            }
            BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::FloorDiv | BinOp::Mod | BinOp::Pow => {
                self.numeric_binop(op, left, right)
            }
            BinOp::Eq => Ok(Value::Bool(left == right)),
            BinOp::NotEq => Ok(Value::Bool(left != right)),
            BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => self.compare(op, left, right),
            // Both operands are already evaluated: no short-circuit.
            BinOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
            BinOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
        }
    }

    fn numeric_binop(&self, op: BinOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
        match (&left, &right) {
            (Value::Int(a), Value::Int(b)) => self.int_binop(op, *a, *b),
            _ if left.is_numeric() && right.is_numeric() => {
                self.float_binop(op, as_f64(&left), as_f64(&right))
            }
            _ => Err(RuntimeError::Type(format!(
                "unsupported operand types for '{}': {} and {}",
                op,
                left.type_name(),
                right.type_name()
            ))),
        }
    }

    fn int_binop(&self, op: BinOp, a: i64, b: i64) -> Result<Value, RuntimeError> {
        let overflow = || RuntimeError::Runtime("integer overflow".to_string());
        match op {
            BinOp::Add => a.checked_add(b).map(Value::Int).ok_or_else(overflow),
            BinOp::Sub => a.checked_sub(b).map(Value::Int).ok_or_else(overflow),
            BinOp::Mul => a.checked_mul(b).map(Value::Int).ok_or_else(overflow),
            // `/` is true division and always yields a float.
            BinOp::Div => {
                if b == 0 {
                    return Err(RuntimeError::Runtime("division by zero".to_string()));
                }
                Ok(Value::Float(a as f64 / b as f64))
            }
            BinOp::FloorDiv => {
                if b == 0 {
                    return Err(RuntimeError::Runtime("division by zero".to_string()));
                }
                floor_div(a, b).map(Value::Int).ok_or_else(overflow)
            }
            BinOp::Mod => {
                if b == 0 {
                    return Err(RuntimeError::Runtime("modulo by zero".to_string()));
                }
                Ok(Value::Int(floor_mod(a, b)))
            }
            BinOp::Pow => {
                if b >= 0 {
                    let exp = u32::try_from(b).map_err(|_| overflow())?;
                    a.checked_pow(exp).map(Value::Int).ok_or_else(overflow)
                } else {
                    Ok(Value::Float((a as f64).powi(b as i32)))
                }
            }
            other => Err(RuntimeError::Value(format!("unknown operator {}", other))),
        }
    }

    fn float_binop(&self, op: BinOp, a: f64, b: f64) -> Result<Value, RuntimeError> {
        match op {
            BinOp::Add => Ok(Value::Float(a + b)),
            BinOp::Sub => Ok(Value::Float(a - b)),
            BinOp::Mul => Ok(Value::Float(a * b)),
            BinOp::Div => {
                if b == 0.0 {
                    return Err(RuntimeError::Runtime("float division by zero".to_string()));
                }
                Ok(Value::Float(a / b))
            }
            BinOp::FloorDiv => {
                if b == 0.0 {
                    return Err(RuntimeError::Runtime("float division by zero".to_string()));
                }
                Ok(Value::Float((a / b).floor()))
            }
            BinOp::Mod => {
                if b == 0.0 {
                    return Err(RuntimeError::Runtime("float modulo by zero".to_string()));
                }
                Ok(Value::Float(a - b * (a / b).floor()))
            }
            BinOp::Pow => Ok(Value::Float(a.powf(b))),
            other => Err(RuntimeError::Value(format!("unknown operator {}", other))),
        }
    }

    fn compare(&self, op: BinOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
        let ordering = if left.is_numeric() && right.is_numeric() {
            if let (Value::Int(a), Value::Int(b)) = (&left, &right) {
                a.cmp(b)
            } else {
                as_f64(&left)
                    .partial_cmp(&as_f64(&right))
                    .ok_or_else(|| RuntimeError::Value("cannot order NaN".to_string()))?
            }
        } else if left.is_text() && right.is_text() {
            left.to_string().cmp(&right.to_string())
        } else {
            return Err(RuntimeError::Type(format!(
                "'{}' not supported between {} and {}",
                op,
                left.type_name(),
                right.type_name()
            )));
        };
        let result = match op {
            BinOp::Lt => ordering == Ordering::Less,
            BinOp::LtEq => ordering != Ordering::Greater,
            BinOp::Gt => ordering == Ordering::Greater,
            BinOp::GtEq => ordering != Ordering::Less,
            other => return Err(RuntimeError::Value(format!("unknown operator {}", other))),
        };
        Ok(Value::Bool(result))
    }

    // ── Casts ──

    fn eval_cast(&self, target: &TypeTag, value: Value) -> Result<Value, RuntimeError> {
        match target {
            TypeTag::Int => match value {
                Value::Int(n) => Ok(Value::Int(n)),
                Value::Float(f) => Ok(Value::Int(f.trunc() as i64)),
                Value::Bool(b) => Ok(Value::Int(b as i64)),
                Value::Str(_) | Value::Char(_) => {
                    let text = value.to_string();
                    text.trim().parse::<i64>().map(Value::Int).map_err(|_| {
                        RuntimeError::Value(format!("invalid literal for int cast: '{}'", text))
                    })
                }
                other => Err(RuntimeError::Type(format!(
                    "cannot cast {} to int",
                    other.type_name()
                ))),
            },
            TypeTag::Float => match value {
                Value::Int(n) => Ok(Value::Float(n as f64)),
                Value::Float(f) => Ok(Value::Float(f)),
                Value::Bool(b) => Ok(Value::Float(b as i64 as f64)),
                Value::Str(_) | Value::Char(_) => {
                    let text = value.to_string();
                    text.trim().parse::<f64>().map(Value::Float).map_err(|_| {
                        RuntimeError::Value(format!("invalid literal for float cast: '{}'", text))
                    })
                }
                other => Err(RuntimeError::Type(format!(
                    "cannot cast {} to float",
                    other.type_name()
                ))),
            },
            TypeTag::Str => Ok(Value::Str(value.to_string())),
            TypeTag::Char => value.to_string().chars().next().map(Value::Char).ok_or_else(|| {
                RuntimeError::Index("cannot take the first character of an empty string".to_string())
            }),
            TypeTag::Bool => Ok(Value::Bool(value.is_truthy())),
            TypeTag::Void => Ok(Value::Null),
            other => Err(RuntimeError::Value(format!("unknown cast type: {}", other))),
        }
    }
}

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Int(n) => *n as f64,
        Value::Float(f) => *f,
        _ => 0.0,
    }
}

/// Floor division: rounds toward negative infinity, like the `//` operator
/// of the reference semantics.
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    let r = a % b;
    if r != 0 && ((r < 0) != (b < 0)) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

/// Floored remainder: the result carries the sign of the divisor.
fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a % b;
    if r != 0 && ((r < 0) != (b < 0)) {
        r + b
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interp() -> Interpreter {
        Interpreter::new()
    }

    #[test]
    fn test_true_division_yields_float() {
        let result = interp().eval_binop(BinOp::Div, Value::Int(10), Value::Int(4)).unwrap();
        assert_eq!(result, Value::Float(2.5));
    }

    #[test]
    fn test_floor_division_stays_integer() {
        let result = interp()
            .eval_binop(BinOp::FloorDiv, Value::Int(10), Value::Int(3))
            .unwrap();
        assert_eq!(result, Value::Int(3));
        let negative = interp()
            .eval_binop(BinOp::FloorDiv, Value::Int(-7), Value::Int(2))
            .unwrap();
        assert_eq!(negative, Value::Int(-4));
    }

    #[test]
    fn test_mod_carries_sign_of_divisor() {
        let it = interp();
        assert_eq!(it.eval_binop(BinOp::Mod, Value::Int(10), Value::Int(3)).unwrap(), Value::Int(1));
        assert_eq!(it.eval_binop(BinOp::Mod, Value::Int(-7), Value::Int(3)).unwrap(), Value::Int(2));
        assert_eq!(it.eval_binop(BinOp::Mod, Value::Int(7), Value::Int(-3)).unwrap(), Value::Int(-2));
    }

    #[test]
    fn test_add_concatenates_when_either_side_is_text() {
        let it = interp();
        let result = it
            .eval_binop(BinOp::Add, Value::Str("n = ".into()), Value::Int(3))
            .unwrap();
        assert_eq!(result, Value::Str("n = 3".into()));
        let flipped = it
            .eval_binop(BinOp::Add, Value::Bool(true), Value::Str("!".into()))
            .unwrap();
        assert_eq!(flipped, Value::Str("true!".into()));
    }

    #[test]
    fn test_division_by_zero_is_runtime_error() {
        let err = interp()
            .eval_binop(BinOp::Div, Value::Int(1), Value::Int(0))
            .unwrap_err();
        assert_eq!(err.kind(), "RuntimeError");
    }

    #[test]
    fn test_mixed_operands_are_type_error() {
        let err = interp()
            .eval_binop(BinOp::Sub, Value::Str("a".into()), Value::Int(1))
            .unwrap_err();
        assert_eq!(err.kind(), "TypeError");
    }

    #[test]
    fn test_int_cast() {
        let it = interp();
        assert_eq!(it.eval_cast(&TypeTag::Int, Value::Float(3.9)).unwrap(), Value::Int(3));
        assert_eq!(
            it.eval_cast(&TypeTag::Int, Value::Str("12".into())).unwrap(),
            Value::Int(12)
        );
        let err = it.eval_cast(&TypeTag::Int, Value::Str("12.5".into())).unwrap_err();
        assert_eq!(err.kind(), "ValueError");
    }

    #[test]
    fn test_string_cast_uses_canonical_forms() {
        let it = interp();
        assert_eq!(
            it.eval_cast(&TypeTag::Str, Value::Bool(true)).unwrap(),
            Value::Str("true".into())
        );
        assert_eq!(
            it.eval_cast(&TypeTag::Str, Value::Null).unwrap(),
            Value::Str("null".into())
        );
    }

    #[test]
    fn test_void_cast_yields_null() {
        assert_eq!(interp().eval_cast(&TypeTag::Void, Value::Int(1)).unwrap(), Value::Null);
    }

    #[test]
    fn test_char_cast_takes_first_character() {
        let it = interp();
        assert_eq!(
            it.eval_cast(&TypeTag::Char, Value::Str("abc".into())).unwrap(),
            Value::Char('a')
        );
        let err = it.eval_cast(&TypeTag::Char, Value::Str(String::new())).unwrap_err();
        assert_eq!(err.kind(), "IndexError");
    }
}
