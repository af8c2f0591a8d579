//! Shared `#define` registry.
//!
//! Dynamic definitions can change between compiles; every mutation bumps
//! a generation counter so the shader cache knows its compiled sources
//! may be stale. Static definitions are appended to every shader and
//! never change.

use std::collections::HashMap;

/// Formats one `#define` line. A `None` value defines a bare flag.
pub fn define_line(name: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => format!("#define {name} {value}"),
        None => format!("#define {name}"),
    }
}

#[derive(Debug, Default)]
pub struct PreDefinitions {
    definitions: HashMap<String, String>,
    static_lines: Vec<String>,
    generation: u64,
}

impl PreDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a dynamic definition and invalidates dependent caches.
    pub fn set(&mut self, name: impl Into<String>, value: Option<&str>) {
        let name = name.into();
        let line = define_line(&name, value);
        self.definitions.insert(name, line);
        self.generation += 1;
    }

    /// Removes a dynamic definition. Bumps the generation only when the
    /// name was actually defined.
    pub fn remove(&mut self, name: &str) {
        if self.definitions.remove(name).is_some() {
            self.generation += 1;
        }
    }

    /// The full `#define` line for `name`, if dynamically defined.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.definitions.get(name).map(String::as_str)
    }

    /// Adds a definition injected into every compiled shader.
    pub fn add_static(&mut self, name: &str, value: Option<&str>) {
        self.static_lines.push(define_line(name, value));
    }

    pub fn static_lines(&self) -> &[String] {
        &self.static_lines
    }

    /// Monotonic counter identifying the current definition state.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
