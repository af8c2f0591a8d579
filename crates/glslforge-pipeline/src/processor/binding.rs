//! Binding index assignment.
//!
//! GLSL gained `layout(binding = N)` in 420. For older targets the
//! processor strips explicit bindings out of the source and into the
//! compile context so the host can bind them itself; for 420 and newer
//! it instead fills in a unique index wherever one is missing. Indices
//! are assigned per class: uniform blocks, storage blocks, and opaque
//! sampler/image uniforms each count from zero.

use glslforge::ast::{
    self, GlslTree, StorageQualifier, TopLevel, TypeQualifier, TypeSpecifier,
};

use crate::context::{BindingClass, CompileContext};
use crate::error::ShaderError;
use crate::processor::ShaderPreProcessor;

const EXPLICIT_BINDING_VERSION: u32 = 420;

#[derive(Debug, Default)]
pub struct BindingProcessor;

impl BindingProcessor {
    pub fn new() -> Self {
        Self
    }
}

/// The binding class of a top-level declaration, if it takes a binding.
fn binding_class(item: &TopLevel) -> Option<(BindingClass, &str)> {
    match item {
        TopLevel::InterfaceBlock { qualifiers, name, instance, .. } => {
            let class = qualifiers.iter().find_map(|q| match q {
                TypeQualifier::Storage(StorageQualifier::Uniform) => {
                    Some(BindingClass::UniformBlock)
                }
                TypeQualifier::Storage(StorageQualifier::Buffer) => {
                    Some(BindingClass::StorageBlock)
                }
                _ => None,
            })?;
            let name = instance.as_ref().map_or(name.as_str(), |i| i.name.as_str());
            Some((class, name))
        }
        TopLevel::Variable(declaration) => {
            if !declaration.ty.has_storage(StorageQualifier::Uniform) {
                return None;
            }
            let TypeSpecifier::Builtin(builtin) = declaration.ty.specifier.element_type() else {
                return None;
            };
            if !builtin.is_opaque() {
                return None;
            }
            let name = declaration.declarators.first()?.name.as_str();
            Some((BindingClass::Sampler, name))
        }
        _ => None,
    }
}

impl ShaderPreProcessor for BindingProcessor {
    fn modify(
        &mut self,
        ctx: &mut CompileContext<'_>,
        tree: &mut GlslTree,
    ) -> Result<(), ShaderError> {
        let explicit_supported = tree.version.number >= EXPLICIT_BINDING_VERSION;

        for item in &mut tree.body {
            let Some((class, name)) = binding_class(item) else {
                continue;
            };
            let name = name.to_string();
            let qualifiers = match item {
                TopLevel::InterfaceBlock { qualifiers, .. } => qualifiers,
                TopLevel::Variable(declaration) => &mut declaration.ty.qualifiers,
                _ => continue,
            };

            if explicit_supported {
                let existing = qualifiers.iter().find_map(|q| match q {
                    TypeQualifier::Layout(ids) => ids
                        .iter()
                        .find(|id| id.name == "binding")
                        .and_then(|id| id.value.as_ref())
                        .and_then(|v| v.as_const_int()),
                    _ => None,
                });
                let index = match existing {
                    Some(index) => {
                        let index = u32::try_from(index).map_err(|_| {
                            ShaderError::Processor(format!(
                                "negative binding on '{name}' in shader '{}'",
                                ctx.name()
                            ))
                        })?;
                        ctx.reserve_binding(class, index)?;
                        index
                    }
                    None => {
                        let index = ctx.next_binding(class);
                        ast::set_layout_value(qualifiers, "binding", i64::from(index));
                        index
                    }
                };
                ctx.record_binding(name, index);
            } else {
                // Older targets cannot express bindings in source; move
                // them into the context for the host to apply.
                let existing = ast::take_layout_value(qualifiers, "binding")
                    .and_then(|v| v.as_const_int());
                let index = match existing {
                    Some(index) => {
                        let index = u32::try_from(index).map_err(|_| {
                            ShaderError::Processor(format!(
                                "negative binding on '{name}' in shader '{}'",
                                ctx.name()
                            ))
                        })?;
                        ctx.reserve_binding(class, index)?;
                        index
                    }
                    None => ctx.next_binding(class),
                };
                ctx.record_binding(name, index);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::PreDefinitions;
    use crate::program::ShaderStage;

    fn run(source: &str) -> (GlslTree, std::collections::HashMap<String, u32>) {
        let definitions = PreDefinitions::new();
        let mut ctx = CompileContext::new("test", ShaderStage::Fragment, &definitions, None, 0);
        let mut tree = glslforge::parse(source).expect("parse");
        BindingProcessor::new().modify(&mut ctx, &mut tree).expect("modify");
        (tree, ctx.uniform_bindings().clone())
    }

    #[test]
    fn modern_targets_get_missing_bindings_filled_in() {
        let (tree, bindings) = run(
            "#version 450 core\n\
             uniform sampler2D albedo;\n\
             layout(binding = 1) uniform sampler2D normal;\n\
             uniform sampler2D depth;",
        );
        assert_eq!(bindings["albedo"], 0);
        assert_eq!(bindings["normal"], 1);
        assert_eq!(bindings["depth"], 2);
        let printed = tree.to_source_string();
        assert!(printed.contains("layout(binding = 0) uniform sampler2D albedo;"), "{printed}");
        assert!(printed.contains("layout(binding = 2) uniform sampler2D depth;"), "{printed}");
    }

    #[test]
    fn legacy_targets_strip_bindings_into_the_context() {
        let (tree, bindings) = run(
            "#version 330 core\n\
             layout(binding = 3) uniform sampler2D albedo;\n\
             uniform Camera { mat4 view; } camera;",
        );
        assert_eq!(bindings["albedo"], 3);
        assert_eq!(bindings["camera"], 0);
        let printed = tree.to_source_string();
        assert!(!printed.contains("binding"), "{printed}");
    }

    #[test]
    fn classes_count_independently() {
        let (_, bindings) = run(
            "#version 450 core\n\
             uniform Camera { mat4 view; } camera;\n\
             buffer Particles { vec4 positions[]; } particles;\n\
             uniform sampler2D albedo;",
        );
        assert_eq!(bindings["camera"], 0);
        assert_eq!(bindings["particles"], 0);
        assert_eq!(bindings["albedo"], 0);
    }

    #[test]
    fn explicit_binding_collisions_are_rejected() {
        let definitions = PreDefinitions::new();
        let mut ctx = CompileContext::new("test", ShaderStage::Fragment, &definitions, None, 0);
        let mut tree = glslforge::parse(
            "#version 450 core\n\
             layout(binding = 1) uniform sampler2D a;\n\
             layout(binding = 1) uniform sampler2D b;",
        )
        .expect("parse");
        let result = BindingProcessor::new().modify(&mut ctx, &mut tree);
        assert!(matches!(result, Err(ShaderError::Processor(_))));
    }
}
