//! Built-in native modules.

pub mod stdlib;

use crate::native::ModuleLoader;
use std::collections::HashMap;

/// The loader table every interpreter starts with.
pub fn builtin_loaders() -> HashMap<String, ModuleLoader> {
    let mut loaders: HashMap<String, ModuleLoader> = HashMap::new();
    loaders.insert("stdlib".to_string(), stdlib::load);
    loaders
}
