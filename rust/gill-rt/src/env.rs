//! Lexical environments: nested name → binding maps, a function table, and
//! the shared module registry.

use crate::native::NativeFunction;
use crate::values::Value;
use gill_compiler::compiler::ast::FunctionDef;
use gill_compiler::compiler::tokens::TypeTag;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

pub type EnvRef = Rc<RefCell<Env>>;

/// The process-wide module table, shared by reference from every
/// environment in a program.
pub type ModuleRegistry = Rc<RefCell<HashMap<String, EnvRef>>>;

/// A variable binding: the declared type is fixed at definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub declared_type: TypeTag,
    pub value: Value,
}

/// A callable: either a user definition bound to its defining environment,
/// or a registered native function.
#[derive(Clone)]
pub enum FunctionObject {
    User { def: Rc<FunctionDef>, env: EnvRef },
    Native(Rc<NativeFunction>),
}

impl fmt::Debug for FunctionObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionObject::User { def, .. } => write!(f, "User({})", def.name),
            FunctionObject::Native(nf) => write!(f, "Native({})", nf.name),
        }
    }
}

/// One scope node. Variables and functions are separate namespaces; the
/// module registry is shared with the parent so the top of every chain sees
/// the same table. An env with `module_name` set is a module environment.
pub struct Env {
    vars: HashMap<String, Binding>,
    functions: HashMap<String, FunctionObject>,
    pub modules: ModuleRegistry,
    parent: Option<EnvRef>,
    pub module_name: Option<String>,
}

impl Env {
    /// The root environment of a program, with a fresh module registry.
    pub fn global() -> EnvRef {
        Rc::new(RefCell::new(Env {
            vars: HashMap::new(),
            functions: HashMap::new(),
            modules: Rc::new(RefCell::new(HashMap::new())),
            parent: None,
            module_name: None,
        }))
    }

    /// A child scope sharing the parent's module registry.
    pub fn child_of(parent: &EnvRef) -> EnvRef {
        let modules = parent.borrow().modules.clone();
        Rc::new(RefCell::new(Env {
            vars: HashMap::new(),
            functions: HashMap::new(),
            modules,
            parent: Some(parent.clone()),
            module_name: None,
        }))
    }

    /// A detached module environment attached to an existing registry.
    pub fn module(name: &str, registry: ModuleRegistry) -> EnvRef {
        Rc::new(RefCell::new(Env {
            vars: HashMap::new(),
            functions: HashMap::new(),
            modules: registry,
            parent: None,
            module_name: Some(name.to_string()),
        }))
    }

    pub fn define(&mut self, name: &str, binding: Binding) {
        self.vars.insert(name.to_string(), binding);
    }

    pub fn define_function(&mut self, name: &str, func: FunctionObject) {
        self.functions.insert(name.to_string(), func);
    }

    pub fn local_binding_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.vars.get_mut(name)
    }

    pub fn local_function(&self, name: &str) -> Option<FunctionObject> {
        self.functions.get(name).cloned()
    }

    pub fn has_var(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn var_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.vars.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn function_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("vars", &self.var_names())
            .field("functions", &self.function_names())
            .field("module_name", &self.module_name)
            .finish()
    }
}

/// Walk the chain from `env` upward and return the binding for `name`.
pub fn lookup(env: &EnvRef, name: &str) -> Option<Binding> {
    let mut current = env.clone();
    loop {
        let next = {
            let e = current.borrow();
            if let Some(binding) = e.vars.get(name) {
                return Some(binding.clone());
            }
            e.parent.clone()
        };
        match next {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

/// Replace the value of the binding that owns `name` in the nearest
/// enclosing scope, preserving its declared type. Returns the binding's
/// declared type on success, `None` when the name is unbound.
pub fn assign(env: &EnvRef, name: &str, value: Value) -> Option<TypeTag> {
    let mut current = env.clone();
    loop {
        let next = {
            let mut e = current.borrow_mut();
            if let Some(binding) = e.vars.get_mut(name) {
                binding.value = value;
                return Some(binding.declared_type.clone());
            }
            e.parent.clone()
        };
        match next {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

/// Walk the chain and resolve a function by name.
pub fn lookup_function(env: &EnvRef, name: &str) -> Option<FunctionObject> {
    let mut current = env.clone();
    loop {
        let next = {
            let e = current.borrow();
            if let Some(func) = e.functions.get(name) {
                return Some(func.clone());
            }
            e.parent.clone()
        };
        match next {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

/// Resolve a loaded module from the shared registry.
pub fn lookup_module(env: &EnvRef, name: &str) -> Option<EnvRef> {
    let registry = env.borrow().modules.clone();
    let found = registry.borrow().get(name).cloned();
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_binding(n: i64) -> Binding {
        Binding {
            declared_type: TypeTag::Int,
            value: Value::Int(n),
        }
    }

    #[test]
    fn test_lookup_walks_parent_chain() {
        let global = Env::global();
        global.borrow_mut().define("x", int_binding(1));
        let child = Env::child_of(&global);
        let grandchild = Env::child_of(&child);
        let found = lookup(&grandchild, "x").unwrap();
        assert_eq!(found.value, Value::Int(1));
        assert!(lookup(&grandchild, "y").is_none());
    }

    #[test]
    fn test_assign_updates_owning_scope() {
        let global = Env::global();
        global.borrow_mut().define("x", int_binding(1));
        let child = Env::child_of(&global);
        assert_eq!(assign(&child, "x", Value::Int(2)), Some(TypeTag::Int));
        assert_eq!(lookup(&global, "x").unwrap().value, Value::Int(2));
        assert!(!child.borrow().has_var("x"));
    }

    #[test]
    fn test_assign_unbound_name_fails() {
        let global = Env::global();
        assert_eq!(assign(&global, "missing", Value::Int(1)), None);
    }

    #[test]
    fn test_shadowing_resolves_to_nearest_scope() {
        let global = Env::global();
        global.borrow_mut().define("x", int_binding(1));
        let child = Env::child_of(&global);
        child.borrow_mut().define("x", int_binding(99));
        assert_eq!(lookup(&child, "x").unwrap().value, Value::Int(99));
        assert_eq!(lookup(&global, "x").unwrap().value, Value::Int(1));
    }

    #[test]
    fn test_registry_shared_down_the_chain() {
        let global = Env::global();
        let child = Env::child_of(&global);
        let module = Env::module("m", global.borrow().modules.clone());
        global.borrow().modules.borrow_mut().insert("m".into(), module);
        assert!(lookup_module(&child, "m").is_some());
    }
}
