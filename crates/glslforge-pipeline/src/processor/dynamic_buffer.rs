//! Feature-permutation buffer injection.
//!
//! A fixed set of optional render targets can be switched on per
//! compile through a bitmask. For every active buffer the fragment
//! stage gains a `layout(location = N) out vec4 <name>;` declaration and
//! a default store at the top of `main`, and every stage gains a
//! `#define DYNAMIC_* 1` flag. The same nominal shader therefore
//! produces a different final source per bitmask.

use glslforge::ast::{
    BuiltinType, Directive, GlslTree, InjectionPoint, Stmt, TypeSpecifier, VersionStatement,
};

use crate::context::CompileContext;
use crate::error::ShaderError;
use crate::processor::ShaderPreProcessor;
use crate::program::ShaderStage;

/// Output locations require at least this version.
const MIN_VERSION: u32 = 330;

/// The closed set of optional feature buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DynamicBuffer {
    Albedo,
    Normal,
    LightUv,
    LightColor,
    Debug,
}

impl DynamicBuffer {
    pub const ALL: &'static [DynamicBuffer] = &[
        DynamicBuffer::Albedo,
        DynamicBuffer::Normal,
        DynamicBuffer::LightUv,
        DynamicBuffer::LightColor,
        DynamicBuffer::Debug,
    ];

    /// This buffer's bit in the active-buffer mask.
    pub fn mask(&self) -> u32 {
        1 << Self::ALL.iter().position(|b| b == self).unwrap_or(0)
    }

    /// Name of the injected output variable.
    pub fn source_name(&self) -> &'static str {
        match self {
            DynamicBuffer::Albedo => "DynamicAlbedo",
            DynamicBuffer::Normal => "DynamicNormal",
            DynamicBuffer::LightUv => "DynamicLightUv",
            DynamicBuffer::LightColor => "DynamicLightColor",
            DynamicBuffer::Debug => "DynamicDebug",
        }
    }

    /// Name of the feature-flag macro.
    pub fn macro_name(&self) -> &'static str {
        match self {
            DynamicBuffer::Albedo => "DYNAMIC_ALBEDO",
            DynamicBuffer::Normal => "DYNAMIC_NORMAL",
            DynamicBuffer::LightUv => "DYNAMIC_LIGHT_UV",
            DynamicBuffer::LightColor => "DYNAMIC_LIGHT_COLOR",
            DynamicBuffer::Debug => "DYNAMIC_DEBUG",
        }
    }
}

#[derive(Debug, Default)]
pub struct DynamicBufferProcessor;

impl DynamicBufferProcessor {
    pub fn new() -> Self {
        Self
    }
}

/// `name = vec4(0.0);`
fn default_store(name: &str) -> Result<Stmt, ShaderError> {
    let store = glslforge::parse_expression(&format!("{name} = vec4(0.0);"))?;
    Ok(Stmt::Expr(store))
}

impl ShaderPreProcessor for DynamicBufferProcessor {
    fn modify(
        &mut self,
        ctx: &mut CompileContext<'_>,
        tree: &mut GlslTree,
    ) -> Result<(), ShaderError> {
        let active = ctx.active_buffers();
        if active == 0 || !ctx.is_source_file() {
            return Ok(());
        }

        if tree.version.number < MIN_VERSION {
            tree.version = VersionStatement::new(MIN_VERSION, true);
        }

        for buffer in DynamicBuffer::ALL {
            if active & buffer.mask() == 0 {
                continue;
            }
            tree.directives.push(Directive::new(
                format!("#define {} 1", buffer.macro_name()),
                0,
            ));
            ctx.add_macro(buffer.macro_name(), "1");
        }

        if ctx.stage() != ShaderStage::Fragment {
            return Ok(());
        }

        let mut next = tree.mark_outputs();
        for buffer in DynamicBuffer::ALL {
            if active & buffer.mask() == 0 {
                continue;
            }
            let name = buffer.source_name();
            if tree.field(name).is_some() {
                continue;
            }
            tree.inject(
                InjectionPoint::BeforeMain,
                GlslTree::out_variable(next, TypeSpecifier::Builtin(BuiltinType::Vec4), name),
            );
            next += 1;

            // A marker comment naming the buffer means the shader
            // stores into it itself.
            if tree.markers.contains_key(&name.to_lowercase()) {
                continue;
            }
            let store = default_store(name)?;
            if let Some(body) = tree.main_body_mut() {
                body.insert(0, store);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::PreDefinitions;

    fn run(source: &str, stage: ShaderStage, active: u32) -> (GlslTree, Vec<String>) {
        let definitions = PreDefinitions::new();
        let mut ctx = CompileContext::new("test", stage, &definitions, None, active);
        let mut tree = glslforge::parse(source).expect("parse");
        DynamicBufferProcessor::new()
            .modify(&mut ctx, &mut tree)
            .expect("modify");
        let macros = ctx.macros().keys().cloned().collect();
        (tree, macros)
    }

    #[test]
    fn masks_are_distinct_bits() {
        let mut seen = 0u32;
        for buffer in DynamicBuffer::ALL {
            assert_eq!(seen & buffer.mask(), 0);
            seen |= buffer.mask();
        }
        assert_eq!(seen, 0b11111);
    }

    #[test]
    fn active_buffers_inject_outputs_and_stores() {
        let mask = DynamicBuffer::Albedo.mask() | DynamicBuffer::Debug.mask();
        let (tree, macros) = run("void main() {}", ShaderStage::Fragment, mask);
        let printed = tree.to_source_string();

        assert!(printed.starts_with("#version 330 core"), "{printed}");
        assert!(printed.contains("layout(location = 0) out vec4 DynamicAlbedo;"), "{printed}");
        assert!(printed.contains("layout(location = 1) out vec4 DynamicDebug;"), "{printed}");
        assert!(printed.contains("DynamicAlbedo = vec4(0.0);"), "{printed}");
        assert!(printed.contains("#define DYNAMIC_ALBEDO 1"), "{printed}");
        assert!(macros.contains(&"DYNAMIC_DEBUG".to_string()));
        assert!(!printed.contains("DynamicNormal"), "{printed}");
    }

    #[test]
    fn locations_start_after_existing_outputs() {
        let (tree, _) = run(
            "#version 330 core\nlayout(location = 0) out vec4 fragColor;\nvoid main() {}",
            ShaderStage::Fragment,
            DynamicBuffer::Normal.mask(),
        );
        let printed = tree.to_source_string();
        assert!(printed.contains("layout(location = 1) out vec4 DynamicNormal;"), "{printed}");
    }

    #[test]
    fn marker_comment_opts_out_of_the_default_store() {
        let (tree, _) = run(
            "void main() {\n// #DynamicAlbedo\n}",
            ShaderStage::Fragment,
            DynamicBuffer::Albedo.mask(),
        );
        let printed = tree.to_source_string();
        assert!(printed.contains("out vec4 DynamicAlbedo;"), "{printed}");
        assert!(!printed.contains("DynamicAlbedo = vec4(0.0);"), "{printed}");
    }

    #[test]
    fn vertex_stages_only_get_macros() {
        let (tree, macros) = run(
            "void main() {}",
            ShaderStage::Vertex,
            DynamicBuffer::Albedo.mask(),
        );
        let printed = tree.to_source_string();
        assert!(printed.contains("#define DYNAMIC_ALBEDO 1"), "{printed}");
        assert!(!printed.contains("out vec4"), "{printed}");
        assert!(macros.contains(&"DYNAMIC_ALBEDO".to_string()));
    }

    #[test]
    fn inactive_mask_is_a_no_op() {
        let (tree, macros) = run("void main() {}", ShaderStage::Fragment, 0);
        assert_eq!(tree.version, VersionStatement::new(110, true));
        assert!(tree.directives.is_empty());
        assert!(macros.is_empty());
    }
}
