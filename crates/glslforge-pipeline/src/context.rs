//! Per-compile state shared by every processor pass.

use std::collections::{HashMap, HashSet};

use crate::definitions::PreDefinitions;
use crate::error::ShaderError;
use crate::program::{ProgramDefinition, ShaderStage};

/// Resource classes whose binding indices are assigned independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingClass {
    UniformBlock,
    StorageBlock,
    Sampler,
}

/// State accumulated while one shader runs through the processor chain.
/// Created fresh for every top-level compile.
pub struct CompileContext<'d> {
    name: String,
    stage: ShaderStage,
    /// True while the top-level source file is being processed, false
    /// for imported modules.
    source_file: bool,
    active_buffers: u32,
    definitions: &'d PreDefinitions,
    program: Option<&'d ProgramDefinition>,
    macros: HashMap<String, String>,
    uniform_bindings: HashMap<String, u32>,
    next_binding: HashMap<BindingClass, u32>,
    used_bindings: HashSet<(BindingClass, u32)>,
    definition_dependencies: HashSet<String>,
    included: HashSet<String>,
}

impl<'d> CompileContext<'d> {
    pub fn new(
        name: impl Into<String>,
        stage: ShaderStage,
        definitions: &'d PreDefinitions,
        program: Option<&'d ProgramDefinition>,
        active_buffers: u32,
    ) -> Self {
        Self {
            name: name.into(),
            stage,
            source_file: true,
            active_buffers,
            definitions,
            program,
            macros: HashMap::new(),
            uniform_bindings: HashMap::new(),
            next_binding: HashMap::new(),
            used_bindings: HashSet::new(),
            definition_dependencies: HashSet::new(),
            included: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn is_source_file(&self) -> bool {
        self.source_file
    }

    /// Scopes `f` to an imported module: `is_source_file` is false
    /// inside and restored afterwards.
    pub fn in_module<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let was_source = self.source_file;
        self.source_file = false;
        let result = f(self);
        self.source_file = was_source;
        result
    }

    pub fn active_buffers(&self) -> u32 {
        self.active_buffers
    }

    pub fn definitions(&self) -> &'d PreDefinitions {
        self.definitions
    }

    pub fn program(&self) -> Option<&'d ProgramDefinition> {
        self.program
    }

    pub fn add_macro(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.macros.insert(name.into(), value.into());
    }

    pub fn macros(&self) -> &HashMap<String, String> {
        &self.macros
    }

    /// Claims an explicit binding index. Two declarations of the same
    /// class claiming one index is an error.
    pub fn reserve_binding(
        &mut self,
        class: BindingClass,
        index: u32,
    ) -> Result<(), ShaderError> {
        if !self.used_bindings.insert((class, index)) {
            return Err(ShaderError::Processor(format!(
                "binding {index} used twice for {class:?} in shader '{}'",
                self.name
            )));
        }
        Ok(())
    }

    /// The next free binding index for a class, claimed monotonically
    /// and skipping explicitly reserved indices.
    pub fn next_binding(&mut self, class: BindingClass) -> u32 {
        let next = self.next_binding.entry(class).or_insert(0);
        while self.used_bindings.contains(&(class, *next)) {
            *next += 1;
        }
        let index = *next;
        self.used_bindings.insert((class, index));
        *next += 1;
        index
    }

    pub fn record_binding(&mut self, name: impl Into<String>, index: u32) {
        self.uniform_bindings.insert(name.into(), index);
    }

    pub fn uniform_bindings(&self) -> &HashMap<String, u32> {
        &self.uniform_bindings
    }

    /// Remembers that this compile consulted a definition name, so the
    /// cache can be invalidated when that definition changes.
    pub fn add_definition_dependency(&mut self, name: impl Into<String>) {
        self.definition_dependencies.insert(name.into());
    }

    pub fn definition_dependencies(&self) -> &HashSet<String> {
        &self.definition_dependencies
    }

    /// Marks a module as spliced into this compile. Returns true the
    /// first time a name is seen.
    pub fn mark_included(&mut self, name: &str) -> bool {
        self.included.insert(name.to_string())
    }

    pub fn includes(&self) -> &HashSet<String> {
        &self.included
    }
}
