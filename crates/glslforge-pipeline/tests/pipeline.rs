//! End-to-end pipeline scenarios against a recording backend.

use std::collections::HashMap;
use std::io;

use glslforge_pipeline::{
    DynamicBuffer, ProgramDefinition, ShaderBackend, ShaderCompilerPipeline, ShaderError,
    ShaderHandle, ShaderImporter, ShaderStage,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Hands out sequential handles and records every compile verbatim.
#[derive(Default)]
struct RecordingBackend {
    compiles: Vec<(ShaderStage, String)>,
    freed: Vec<ShaderHandle>,
}

impl ShaderBackend for RecordingBackend {
    fn compile(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle, String> {
        self.compiles.push((stage, source.to_string()));
        Ok(ShaderHandle(self.compiles.len() as u64))
    }

    fn free(&mut self, handle: ShaderHandle) {
        self.freed.push(handle);
    }
}

fn importer(entries: &[(&str, &str)]) -> ShaderImporter {
    let modules: HashMap<String, String> = entries
        .iter()
        .map(|(name, text)| (name.to_string(), text.to_string()))
        .collect();
    ShaderImporter::new(Box::new(move |name: &str| {
        modules
            .get(name)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such module"))
    }))
}

fn pipeline(entries: &[(&str, &str)]) -> ShaderCompilerPipeline<RecordingBackend> {
    ShaderCompilerPipeline::with_standard_passes(RecordingBackend::default(), importer(entries))
}

fn last_source(pipeline: &ShaderCompilerPipeline<RecordingBackend>) -> &str {
    let (_, source) = pipeline.backend().compiles.last().expect("no compiles");
    source
}

#[test]
fn end_to_end_compile() {
    init_tracing();
    let mut pipeline = pipeline(&[]);
    let shader = pipeline
        .compile(
            "basic",
            ShaderStage::Fragment,
            "uniform float a; void main(){ float b = a + 1.0; }",
        )
        .expect("compile");

    let source = last_source(&pipeline);
    assert!(source.starts_with("#version 110 core"), "{source}");
    assert!(source.contains("uniform float a;"), "{source}");
    assert!(source.contains("float b = a + 1.0;"), "{source}");
    assert_eq!(shader.handle, ShaderHandle(1));
    assert!(shader.includes.is_empty());
}

#[test]
fn duplicate_imports_splice_once() {
    init_tracing();
    let mut pipeline = pipeline(&[
        ("common", "float shared_value = 1.0;"),
        ("util", "#include common\nfloat util_value = shared_value;"),
    ]);

    let shader = pipeline
        .compile(
            "layered",
            ShaderStage::Fragment,
            "#include common\n#include util\nvoid main() { }",
        )
        .expect("compile");

    let source = last_source(&pipeline);
    assert_eq!(source.matches("float shared_value").count(), 1, "{source}");
    assert!(source.contains("float util_value"), "{source}");
    assert!(shader.includes.contains("common"));
    assert!(shader.includes.contains("util"));
}

#[test]
fn force_overrides_duplicate_suppression() {
    init_tracing();
    let mut pipeline = pipeline(&[("common", "float shared_value = 1.0;")]);
    pipeline
        .compile(
            "forced",
            ShaderStage::Fragment,
            "#include common\n#include common force\nvoid main() { }",
        )
        .expect("compile");

    let source = last_source(&pipeline);
    assert_eq!(source.matches("float shared_value").count(), 2, "{source}");
}

#[test]
fn circular_includes_terminate() {
    init_tracing();
    let mut pipeline = pipeline(&[
        ("a", "#include b\nfloat from_a;"),
        ("b", "#include a\nfloat from_b;"),
    ]);
    pipeline
        .compile("cyclic", ShaderStage::Fragment, "#include a\nvoid main() { }")
        .expect("compile");

    let source = last_source(&pipeline);
    assert_eq!(source.matches("float from_a").count(), 1, "{source}");
    assert_eq!(source.matches("float from_b").count(), 1, "{source}");
}

#[test]
fn buffer_permutations_produce_distinct_shaders() {
    init_tracing();
    let mut pipeline = pipeline(&[]);
    let source = "void main() {}";

    let plain = pipeline
        .compile_configured("permuted", ShaderStage::Fragment, source, None, 0)
        .expect("compile");
    let albedo = pipeline
        .compile_configured(
            "permuted",
            ShaderStage::Fragment,
            source,
            None,
            DynamicBuffer::Albedo.mask(),
        )
        .expect("compile");
    let albedo_debug = pipeline
        .compile_configured(
            "permuted",
            ShaderStage::Fragment,
            source,
            None,
            DynamicBuffer::Albedo.mask() | DynamicBuffer::Debug.mask(),
        )
        .expect("compile");

    let handles = [plain.handle, albedo.handle, albedo_debug.handle];
    assert_eq!(pipeline.backend().compiles.len(), 3);
    assert!(handles[0] != handles[1] && handles[1] != handles[2] && handles[0] != handles[2]);

    // The same permutation again is a cache hit: same handle, no new
    // backend compile.
    let again = pipeline
        .compile_configured(
            "permuted",
            ShaderStage::Fragment,
            source,
            None,
            DynamicBuffer::Albedo.mask(),
        )
        .expect("compile");
    assert_eq!(again.handle, albedo.handle);
    assert_eq!(pipeline.backend().compiles.len(), 3);
}

#[test]
fn import_failures_are_contained() {
    init_tracing();
    let mut pipeline = pipeline(&[("broken", "float = oops")]);

    let error = pipeline
        .compile("damaged", ShaderStage::Fragment, "#include broken\nvoid main() { }")
        .expect_err("should fail");
    let ShaderError::Import { name, source } = &error else {
        panic!("expected import error, got {error:?}");
    };
    assert_eq!(name, "broken");
    assert!(matches!(**source, ShaderError::Syntax(_)));

    // A sibling shader that does not import the module is unaffected.
    pipeline
        .compile("healthy", ShaderStage::Fragment, "void main() { }")
        .expect("sibling compile");

    // The module is remembered as failed and not reparsed.
    let error = pipeline
        .compile("damaged", ShaderStage::Fragment, "#include broken\nvoid main() { }")
        .expect_err("should fail again");
    assert!(matches!(error.root_cause(), ShaderError::Load { .. }));
}

#[test]
fn definition_changes_invalidate_the_cache() {
    init_tracing();
    let mut pipeline = pipeline(&[]);
    let program = ProgramDefinition::from_json(
        r#"{
            "name": "lit",
            "fragment": "lit.fsh",
            "definitions": [{ "name": "MAX_LIGHTS", "default": "4" }]
        }"#,
    )
    .expect("manifest");
    let source = "void main() {}";

    let first = pipeline
        .compile_configured("lit", ShaderStage::Fragment, source, Some(&program), 0)
        .expect("compile");
    assert!(last_source(&pipeline).contains("#define MAX_LIGHTS 4"));
    assert!(first.definition_dependencies.contains("MAX_LIGHTS"));

    pipeline.definitions_mut().set("MAX_LIGHTS", Some("8"));
    let second = pipeline
        .compile_configured("lit", ShaderStage::Fragment, source, Some(&program), 0)
        .expect("recompile");

    assert_ne!(first.handle, second.handle);
    assert!(last_source(&pipeline).contains("#define MAX_LIGHTS 8"));
    assert_eq!(pipeline.backend().freed, vec![first.handle]);
}

#[test]
fn programs_compile_every_declared_stage() {
    init_tracing();
    let mut pipeline = pipeline(&[
        ("entity.vsh", "in vec3 position; void main() { gl_Position = vec4(position, 1.0); }"),
        ("entity.fsh", "out vec4 color; void main() { color = vec4(1.0); }"),
    ]);
    let program = ProgramDefinition::from_json(
        r#"{ "name": "entity", "vertex": "entity.vsh", "fragment": "entity.fsh" }"#,
    )
    .expect("manifest");

    let shaders = pipeline.compile_program(&program).expect("compile program");
    assert_eq!(shaders.len(), 2);
    assert_eq!(shaders[0].0, ShaderStage::Vertex);
    assert_eq!(shaders[1].0, ShaderStage::Fragment);
    assert_ne!(shaders[0].1.handle, shaders[1].1.handle);
}

#[test]
fn free_releases_cached_shaders() {
    init_tracing();
    let mut pipeline = pipeline(&[]);
    let shader = pipeline
        .compile("transient", ShaderStage::Fragment, "void main() {}")
        .expect("compile");
    pipeline.free();
    assert_eq!(pipeline.backend().freed, vec![shader.handle]);
}
