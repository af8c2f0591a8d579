//! Injects shared `#define` directives.

use glslforge::ast::{Directive, GlslTree};

use crate::context::CompileContext;
use crate::definitions::define_line;
use crate::error::ShaderError;
use crate::processor::ShaderPreProcessor;

/// Prepends the static definitions and the program-requested dynamic
/// definitions to the top-level source file. Every name the program
/// asks about is recorded as a definition dependency, whether or not it
/// currently has a value.
#[derive(Debug, Default)]
pub struct PredefinitionProcessor;

impl PredefinitionProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl ShaderPreProcessor for PredefinitionProcessor {
    fn modify(
        &mut self,
        ctx: &mut CompileContext<'_>,
        tree: &mut GlslTree,
    ) -> Result<(), ShaderError> {
        // Definitions belong to the shader, not to imported modules.
        if !ctx.is_source_file() {
            return Ok(());
        }

        let mut lines: Vec<String> = ctx.definitions().static_lines().to_vec();

        if let Some(program) = ctx.program() {
            let requests: Vec<_> = program.definitions.to_vec();
            for request in requests {
                ctx.add_definition_dependency(&request.name);
                let line = match ctx.definitions().get(&request.name) {
                    Some(line) => Some(line.to_string()),
                    None => request
                        .default
                        .as_deref()
                        .map(|value| define_line(&request.name, Some(value))),
                };
                if let Some(line) = line {
                    lines.push(line);
                }
            }
        }

        for line in lines {
            tree.directives.push(Directive::new(line, 0));
        }
        Ok(())
    }
}
