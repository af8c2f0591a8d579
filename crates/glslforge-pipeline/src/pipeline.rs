//! The pipeline front door: source text in, compiled shader out.

use tracing::{debug, error};

use crate::compiler::{CachedShaderCompiler, CompiledShader, ShaderBackend, ShaderCompiler};
use crate::context::CompileContext;
use crate::definitions::PreDefinitions;
use crate::error::ShaderError;
use crate::import::ShaderImporter;
use crate::processor::{
    BindingProcessor, DynamicBufferProcessor, PredefinitionProcessor, ShaderPreProcessor,
    ShaderProcessorList,
};
use crate::program::{ProgramDefinition, ShaderStage};

/// Runs lex, parse, the processor chain, print, and backend compilation
/// in order. On failure nothing is evicted, so the caller keeps
/// whatever shader it got from the last good compile.
pub struct ShaderCompilerPipeline<B: ShaderBackend> {
    backend: B,
    processors: ShaderProcessorList,
    definitions: PreDefinitions,
    compiler: Box<dyn ShaderCompiler>,
}

impl<B: ShaderBackend> ShaderCompilerPipeline<B> {
    /// An empty pipeline with the caching compiler and no passes.
    pub fn new(backend: B, importer: ShaderImporter) -> Self {
        Self {
            backend,
            processors: ShaderProcessorList::new(importer),
            definitions: PreDefinitions::new(),
            compiler: Box::new(CachedShaderCompiler::new()),
        }
    }

    /// A pipeline with the standard pass chain: pre-definitions, then
    /// dynamic buffers, then binding assignment last so it sees every
    /// injected declaration.
    pub fn with_standard_passes(backend: B, importer: ShaderImporter) -> Self {
        let mut pipeline = Self::new(backend, importer);
        pipeline.add_pass(Box::new(PredefinitionProcessor::new()));
        pipeline.add_pass(Box::new(DynamicBufferProcessor::new()));
        pipeline.add_pass(Box::new(BindingProcessor::new()));
        pipeline
    }

    pub fn set_compiler(&mut self, compiler: Box<dyn ShaderCompiler>) {
        self.compiler = compiler;
    }

    pub fn add_pass(&mut self, pass: Box<dyn ShaderPreProcessor>) {
        self.processors.add_pass(pass);
    }

    pub fn add_import_pass(&mut self, pass: Box<dyn ShaderPreProcessor>) {
        self.processors.add_import_pass(pass);
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn definitions(&self) -> &PreDefinitions {
        &self.definitions
    }

    /// Mutating definitions bumps their generation; the next compile
    /// flushes the shader cache.
    pub fn definitions_mut(&mut self) -> &mut PreDefinitions {
        &mut self.definitions
    }

    pub fn importer_mut(&mut self) -> &mut ShaderImporter {
        self.processors.importer_mut()
    }

    /// Compiles one shader with no program manifest and no active
    /// feature buffers.
    pub fn compile(
        &mut self,
        name: &str,
        stage: ShaderStage,
        source: &str,
    ) -> Result<CompiledShader, ShaderError> {
        self.compile_configured(name, stage, source, None, 0)
    }

    pub fn compile_configured(
        &mut self,
        name: &str,
        stage: ShaderStage,
        source: &str,
        program: Option<&ProgramDefinition>,
        active_buffers: u32,
    ) -> Result<CompiledShader, ShaderError> {
        match self.compile_inner(name, stage, source, program, active_buffers) {
            Ok(shader) => {
                debug!(shader = name, %stage, handle = shader.handle.0, "compiled shader");
                Ok(shader)
            }
            Err(shader_error) => {
                error!(shader = name, %stage, error = %shader_error, "shader compilation failed");
                Err(shader_error)
            }
        }
    }

    fn compile_inner(
        &mut self,
        name: &str,
        stage: ShaderStage,
        source: &str,
        program: Option<&ProgramDefinition>,
        active_buffers: u32,
    ) -> Result<CompiledShader, ShaderError> {
        let mut tree = glslforge::parse(source)?;

        self.processors.prepare();
        let mut ctx =
            CompileContext::new(name, stage, &self.definitions, program, active_buffers);
        self.processors.run(&mut ctx, &mut tree)?;

        let printed = tree.to_source_string();
        self.compiler.compile(
            &mut self.backend,
            &ctx,
            stage,
            &printed,
            self.definitions.generation(),
        )
    }

    /// Compiles every stage a program manifest declares, loading each
    /// stage's source through the import source.
    pub fn compile_program(
        &mut self,
        program: &ProgramDefinition,
    ) -> Result<Vec<(ShaderStage, CompiledShader)>, ShaderError> {
        let stages: Vec<(ShaderStage, String)> = program
            .stages()
            .map(|(stage, source)| (stage, source.to_string()))
            .collect();

        let mut shaders = Vec::with_capacity(stages.len());
        for (stage, module) in stages {
            let text = self.processors.importer_mut().load_raw(&module)?;
            let shader =
                self.compile_configured(&program.name, stage, &text, Some(program), 0)?;
            shaders.push((stage, shader));
        }
        Ok(shaders)
    }

    /// Releases every backend shader the compiler still holds.
    pub fn free(&mut self) {
        self.compiler.free(&mut self.backend);
    }
}
