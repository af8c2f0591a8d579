//! Backend hand-off and the compiled-shader cache.

use std::collections::{HashMap, HashSet};
use std::hash::{DefaultHasher, Hash, Hasher};

use tracing::debug;

use crate::context::CompileContext;
use crate::error::ShaderError;
use crate::program::ShaderStage;

/// Opaque backend shader identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u64);

/// Compiles final GLSL source into backend shader objects. Real GPU
/// compilation lives behind this seam.
pub trait ShaderBackend {
    fn compile(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle, String>;
    fn free(&mut self, handle: ShaderHandle);
}

/// One successfully compiled shader plus everything the host needs to
/// bind it.
#[derive(Debug, Clone)]
pub struct CompiledShader {
    pub handle: ShaderHandle,
    /// Hash of `(stage, final source)`, the cache key.
    pub source_hash: u64,
    pub uniform_bindings: HashMap<String, u32>,
    pub definition_dependencies: HashSet<String>,
    pub includes: HashSet<String>,
}

fn source_hash(stage: ShaderStage, source: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    stage.hash(&mut hasher);
    source.hash(&mut hasher);
    hasher.finish()
}

fn compiled(
    backend: &mut dyn ShaderBackend,
    ctx: &CompileContext<'_>,
    stage: ShaderStage,
    source: &str,
    hash: u64,
) -> Result<CompiledShader, ShaderError> {
    let handle = backend
        .compile(stage, source)
        .map_err(ShaderError::Backend)?;
    Ok(CompiledShader {
        handle,
        source_hash: hash,
        uniform_bindings: ctx.uniform_bindings().clone(),
        definition_dependencies: ctx.definition_dependencies().clone(),
        includes: ctx.includes().clone(),
    })
}

/// Strategy seam between the pipeline and the backend.
pub trait ShaderCompiler {
    fn compile(
        &mut self,
        backend: &mut dyn ShaderBackend,
        ctx: &CompileContext<'_>,
        stage: ShaderStage,
        source: &str,
        generation: u64,
    ) -> Result<CompiledShader, ShaderError>;

    /// Releases every backend object this compiler still tracks.
    fn free(&mut self, backend: &mut dyn ShaderBackend);
}

/// Invokes the backend on every call.
#[derive(Debug, Default)]
pub struct DirectShaderCompiler;

impl ShaderCompiler for DirectShaderCompiler {
    fn compile(
        &mut self,
        backend: &mut dyn ShaderBackend,
        ctx: &CompileContext<'_>,
        stage: ShaderStage,
        source: &str,
        _generation: u64,
    ) -> Result<CompiledShader, ShaderError> {
        compiled(backend, ctx, stage, source, source_hash(stage, source))
    }

    fn free(&mut self, _backend: &mut dyn ShaderBackend) {}
}

/// Caches compiled shaders by source hash. The whole cache is flushed
/// when the definitions generation moves, since any cached source may
/// have been produced under stale `#define`s. A failed compile never
/// evicts a previously cached good shader.
#[derive(Debug, Default)]
pub struct CachedShaderCompiler {
    cache: HashMap<u64, CompiledShader>,
    generation: u64,
}

impl CachedShaderCompiler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShaderCompiler for CachedShaderCompiler {
    fn compile(
        &mut self,
        backend: &mut dyn ShaderBackend,
        ctx: &CompileContext<'_>,
        stage: ShaderStage,
        source: &str,
        generation: u64,
    ) -> Result<CompiledShader, ShaderError> {
        if generation != self.generation {
            debug!(
                shaders = self.cache.len(),
                "definitions changed, flushing shader cache"
            );
            self.free(backend);
            self.generation = generation;
        }

        let hash = source_hash(stage, source);
        if let Some(shader) = self.cache.get(&hash) {
            debug!(shader = ctx.name(), %stage, "shader cache hit");
            return Ok(shader.clone());
        }

        let shader = compiled(backend, ctx, stage, source, hash)?;
        self.cache.insert(hash, shader.clone());
        Ok(shader)
    }

    fn free(&mut self, backend: &mut dyn ShaderBackend) {
        for shader in self.cache.values() {
            backend.free(shader.handle);
        }
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::PreDefinitions;

    #[derive(Default)]
    struct CountingBackend {
        compiles: u64,
        freed: Vec<ShaderHandle>,
    }

    impl ShaderBackend for CountingBackend {
        fn compile(&mut self, _stage: ShaderStage, _source: &str) -> Result<ShaderHandle, String> {
            self.compiles += 1;
            Ok(ShaderHandle(self.compiles))
        }

        fn free(&mut self, handle: ShaderHandle) {
            self.freed.push(handle);
        }
    }

    #[test]
    fn repeated_source_hits_the_cache() {
        let definitions = PreDefinitions::new();
        let ctx = CompileContext::new("t", ShaderStage::Fragment, &definitions, None, 0);
        let mut backend = CountingBackend::default();
        let mut compiler = CachedShaderCompiler::new();

        let first = compiler
            .compile(&mut backend, &ctx, ShaderStage::Fragment, "void main(){}", 0)
            .unwrap();
        let second = compiler
            .compile(&mut backend, &ctx, ShaderStage::Fragment, "void main(){}", 0)
            .unwrap();
        assert_eq!(first.handle, second.handle);
        assert_eq!(backend.compiles, 1);

        // Same source, different stage: different key.
        compiler
            .compile(&mut backend, &ctx, ShaderStage::Vertex, "void main(){}", 0)
            .unwrap();
        assert_eq!(backend.compiles, 2);
    }

    #[test]
    fn generation_change_flushes_and_frees() {
        let definitions = PreDefinitions::new();
        let ctx = CompileContext::new("t", ShaderStage::Fragment, &definitions, None, 0);
        let mut backend = CountingBackend::default();
        let mut compiler = CachedShaderCompiler::new();

        let first = compiler
            .compile(&mut backend, &ctx, ShaderStage::Fragment, "void main(){}", 0)
            .unwrap();
        let second = compiler
            .compile(&mut backend, &ctx, ShaderStage::Fragment, "void main(){}", 1)
            .unwrap();
        assert_ne!(first.handle, second.handle);
        assert_eq!(backend.freed, vec![first.handle]);
    }

    #[test]
    fn failed_compiles_leave_the_cache_untouched() {
        struct FailingBackend;
        impl ShaderBackend for FailingBackend {
            fn compile(&mut self, _: ShaderStage, _: &str) -> Result<ShaderHandle, String> {
                Err("no device".to_string())
            }
            fn free(&mut self, _: ShaderHandle) {}
        }

        let definitions = PreDefinitions::new();
        let ctx = CompileContext::new("t", ShaderStage::Fragment, &definitions, None, 0);
        let mut good = CountingBackend::default();
        let mut compiler = CachedShaderCompiler::new();
        let cached = compiler
            .compile(&mut good, &ctx, ShaderStage::Fragment, "void main(){}", 0)
            .unwrap();

        let error = compiler
            .compile(&mut FailingBackend, &ctx, ShaderStage::Fragment, "float x;", 0)
            .unwrap_err();
        assert!(matches!(error, ShaderError::Backend(_)));

        // The earlier shader is still served from cache.
        let again = compiler
            .compile(&mut good, &ctx, ShaderStage::Fragment, "void main(){}", 0)
            .unwrap();
        assert_eq!(again.handle, cached.handle);
        assert_eq!(good.compiles, 1);
    }
}
