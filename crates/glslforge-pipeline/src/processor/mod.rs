//! The shader processor chain.
//!
//! Processors rewrite the parsed tree before it is printed and handed
//! to the backend. The chain runs import resolution first, then every
//! registered pass in order. Imported modules run a reduced chain of
//! their own (passes registered with [`ShaderProcessorList::add_import_pass`]),
//! driven from inside the resolver.

mod binding;
mod dynamic_buffer;
mod predefinition;

pub use binding::BindingProcessor;
pub use dynamic_buffer::{DynamicBuffer, DynamicBufferProcessor};
pub use predefinition::PredefinitionProcessor;

use glslforge::ast::GlslTree;

use crate::context::CompileContext;
use crate::error::ShaderError;
use crate::import::ShaderImporter;

pub trait ShaderPreProcessor {
    /// Called once before each top-level compile so a pass can reset
    /// any per-compile state.
    fn prepare(&mut self) {}

    fn modify(
        &mut self,
        ctx: &mut CompileContext<'_>,
        tree: &mut GlslTree,
    ) -> Result<(), ShaderError>;
}

pub struct ShaderProcessorList {
    importer: ShaderImporter,
    passes: Vec<Box<dyn ShaderPreProcessor>>,
    import_passes: Vec<Box<dyn ShaderPreProcessor>>,
}

impl ShaderProcessorList {
    pub fn new(importer: ShaderImporter) -> Self {
        Self {
            importer,
            passes: Vec::new(),
            import_passes: Vec::new(),
        }
    }

    pub fn importer_mut(&mut self) -> &mut ShaderImporter {
        &mut self.importer
    }

    /// Registers a pass on the full chain.
    pub fn add_pass(&mut self, pass: Box<dyn ShaderPreProcessor>) {
        self.passes.push(pass);
    }

    /// Registers a pass on the reduced chain run over imported modules.
    pub fn add_import_pass(&mut self, pass: Box<dyn ShaderPreProcessor>) {
        self.import_passes.push(pass);
    }

    pub fn prepare(&mut self) {
        for pass in self.passes.iter_mut().chain(self.import_passes.iter_mut()) {
            pass.prepare();
        }
    }

    /// Runs the whole chain over one top-level tree.
    pub fn run(
        &mut self,
        ctx: &mut CompileContext<'_>,
        tree: &mut GlslTree,
    ) -> Result<(), ShaderError> {
        self.importer
            .resolve(ctx, tree, &mut self.import_passes)?;
        for pass in &mut self.passes {
            pass.modify(ctx, tree)?;
        }
        Ok(())
    }
}
