use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use crate::interpreter::ast::FunctionDecl;
use crate::interpreter::value::Value;

/// Variables and functions visible to a running program.
///
/// Variables live in a stack of frames. The bottom frame is the global one;
/// every function call pushes a frame for its parameters and anything it
/// assigns, so lookups see the caller's variables but writes never leak out.
/// Functions share one flat table.
#[derive(Debug)]
pub struct Environment {
    frames: Vec<HashMap<String, Value>>,
    functions: HashMap<String, Rc<FunctionDecl>>,
}

impl Environment {
    pub fn new() -> Environment {
        Environment {
            frames: vec![HashMap::new()],
            functions: HashMap::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn push_frame(&mut self, bindings: HashMap<String, Value>) {
        self.frames.push(bindings);
    }

    pub fn pop_frame(&mut self) {
        // The global frame is never popped
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Binds in the innermost frame.
    pub fn assign(&mut self, name: &str, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_owned(), value);
        }
    }

    pub fn assign_global(&mut self, name: &str, value: Value) {
        self.frames[0].insert(name.to_owned(), value);
    }

    /// Every visible binding, inner frames shadowing outer ones.
    pub fn variables(&self) -> BTreeMap<String, Value> {
        let mut variables = BTreeMap::new();

        for frame in &self.frames {
            variables.extend(frame.iter().map(|(name, value)| (name.clone(), value.clone())));
        }

        variables
    }

    pub fn define_function(&mut self, function: Rc<FunctionDecl>) -> bool {
        self.functions.insert(function.name.clone(), function).is_none()
    }

    pub fn find_function(&self, name: &str) -> Option<Rc<FunctionDecl>> {
        self.functions.get(name).map(Rc::clone)
    }

    pub fn functions(&self) -> BTreeMap<String, Vec<String>> {
        self.functions.iter().map(|(name, function)| (name.clone(), function.params.clone())).collect()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.frames.push(HashMap::new());
        self.functions.clear();
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}
