use super::function::Function;
use super::Val;
use std::collections::HashMap;

/// ## Symbol environment
///
/// One flat map of identifier to value for a machine session. The
/// built-in constants are seeded here; built-in *names* (functions and
/// constants both) are reserved, and the interpreter refuses to assign
/// over them — the storage itself stays dumb.
#[derive(Debug, Default)]
pub struct Var {
    vars: HashMap<String, Val>,
}

impl Var {
    pub fn new() -> Var {
        let mut var = Var::default();
        var.vars
            .insert("pi".to_string(), Val::Float(std::f64::consts::PI));
        var.vars
            .insert("e".to_string(), Val::Float(std::f64::consts::E));
        var
    }

    /// An undefined variable reads as integer zero.
    pub fn fetch(&self, name: &str) -> Val {
        match self.vars.get(name) {
            Some(val) => val.clone(),
            None => Val::Integer(0),
        }
    }

    pub fn defined(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn is_reserved(name: &str) -> bool {
        Function::is_builtin(name)
    }

    pub fn store(&mut self, name: &str, value: Val) {
        self.vars.insert(name.to_string(), value);
    }
}
