//! GLSL transform pipeline built on the `glslforge` front end.
//!
//! Shaders flow through [`pipeline::ShaderCompilerPipeline`]: the
//! source is parsed, import directives are resolved against an
//! [`import::ImportSource`], processor passes rewrite the tree, and the
//! printed result is handed to a [`compiler::ShaderBackend`]. Compiled
//! shaders are cached by final source until the shared definitions
//! change.

pub mod compiler;
pub mod context;
pub mod definitions;
pub mod error;
pub mod import;
pub mod pipeline;
pub mod processor;
pub mod program;

pub use compiler::{
    CachedShaderCompiler, CompiledShader, DirectShaderCompiler, ShaderBackend, ShaderCompiler,
    ShaderHandle,
};
pub use context::{BindingClass, CompileContext};
pub use definitions::PreDefinitions;
pub use error::ShaderError;
pub use import::{ImportSource, ShaderImporter};
pub use pipeline::ShaderCompilerPipeline;
pub use processor::{
    BindingProcessor, DynamicBuffer, DynamicBufferProcessor, PredefinitionProcessor,
    ShaderPreProcessor, ShaderProcessorList,
};
pub use program::{DefinitionRequest, ProgramDefinition, ShaderStage};
