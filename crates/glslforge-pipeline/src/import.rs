//! Shader module import resolution.
//!
//! `#include <name> [force]` directives are replaced by the named
//! module's declarations, spliced at the directive's position. Module
//! text is cached for the life of the importer; a module that fails to
//! load or parse is remembered as failed and not retried until
//! [`ShaderImporter::clear`]. Each top-level compile tracks its own
//! spliced set on the [`CompileContext`], so a module lands at most once
//! per shader unless `force` is given.

use std::collections::{HashMap, HashSet};

use glslforge::ast::{Directive, GlslTree};
use tracing::warn;

use crate::context::CompileContext;
use crate::error::ShaderError;
use crate::processor::ShaderPreProcessor;

/// Provides raw module text by name.
pub trait ImportSource {
    fn load(&self, name: &str) -> Result<String, std::io::Error>;
}

impl<F> ImportSource for F
where
    F: Fn(&str) -> Result<String, std::io::Error>,
{
    fn load(&self, name: &str) -> Result<String, std::io::Error> {
        self(name)
    }
}

pub struct ShaderImporter {
    source: Box<dyn ImportSource>,
    /// Raw module text, loaded once per importer lifetime.
    sources: HashMap<String, String>,
    /// Modules that failed to load or parse, never retried.
    failed: HashSet<String>,
    in_flight: HashSet<String>,
    strict_cycles: bool,
}

impl ShaderImporter {
    pub fn new(source: Box<dyn ImportSource>) -> Self {
        Self {
            source,
            sources: HashMap::new(),
            failed: HashSet::new(),
            in_flight: HashSet::new(),
            strict_cycles: false,
        }
    }

    /// When set, a module including itself while in flight is an error
    /// instead of a silent no-op.
    pub fn set_strict_cycles(&mut self, strict: bool) {
        self.strict_cycles = strict;
    }

    /// Drops the raw-text cache and the permanent failure set.
    pub fn clear(&mut self) {
        self.sources.clear();
        self.failed.clear();
    }

    /// The raw text of a module, loading and caching it on first use.
    pub fn load_raw(&mut self, name: &str) -> Result<String, ShaderError> {
        if self.failed.contains(name) {
            return Err(ShaderError::Load {
                name: name.to_string(),
                message: "module previously failed".to_string(),
            });
        }
        if let Some(text) = self.sources.get(name) {
            return Ok(text.clone());
        }
        match self.source.load(name) {
            Ok(text) => {
                self.sources.insert(name.to_string(), text.clone());
                Ok(text)
            }
            Err(error) => {
                self.failed.insert(name.to_string());
                Err(ShaderError::Load {
                    name: name.to_string(),
                    message: error.to_string(),
                })
            }
        }
    }

    /// Resolves every include directive in `tree`, recursively, running
    /// `passes` (the reduced chain) over each spliced module.
    pub fn resolve(
        &mut self,
        ctx: &mut CompileContext<'_>,
        tree: &mut GlslTree,
        passes: &mut [Box<dyn ShaderPreProcessor>],
    ) -> Result<(), ShaderError> {
        while let Some(position) = tree
            .directives
            .iter()
            .position(|d| parse_include(&d.content).is_some())
        {
            let directive = tree.directives.remove(position);
            let Some((name, force)) = parse_include(&directive.content) else {
                continue;
            };
            let first = ctx.mark_included(&name);
            if !first && !force {
                continue;
            }
            if self.in_flight.contains(&name) {
                if self.strict_cycles {
                    return Err(ShaderError::Load {
                        name,
                        message: "circular include".to_string(),
                    });
                }
                continue;
            }

            let module = self.include(ctx, &name, passes)?;
            let at = directive.index.min(tree.body.len());
            let spliced = module.body.len();
            tree.splice(at, module.body);
            for sub in module.directives {
                tree.directives
                    .push(Directive::new(sub.content, at + sub.index.min(spliced)));
            }
            for (marker, index) in module.markers {
                tree.markers
                    .entry(marker)
                    .or_insert(at + index.min(spliced));
            }
        }
        Ok(())
    }

    /// Loads, parses, and fully processes one module. Any failure is
    /// wrapped in an [`ShaderError::Import`] naming the module.
    fn include(
        &mut self,
        ctx: &mut CompileContext<'_>,
        name: &str,
        passes: &mut [Box<dyn ShaderPreProcessor>],
    ) -> Result<GlslTree, ShaderError> {
        self.include_inner(ctx, name, passes)
            .map_err(|error| ShaderError::Import {
                name: name.to_string(),
                source: Box::new(error),
            })
    }

    fn include_inner(
        &mut self,
        ctx: &mut CompileContext<'_>,
        name: &str,
        passes: &mut [Box<dyn ShaderPreProcessor>],
    ) -> Result<GlslTree, ShaderError> {
        let text = self.load_raw(name)?;

        // Never reuse a previously parsed tree; the processors mutate it.
        let mut tree = match glslforge::parse(&text) {
            Ok(tree) => tree,
            Err(error) => {
                self.failed.insert(name.to_string());
                return Err(error.into());
            }
        };
        strip_deprecations(name, &mut tree);

        self.in_flight.insert(name.to_string());
        let result = ctx.in_module(|ctx| {
            self.resolve(ctx, &mut tree, passes)?;
            for pass in passes.iter_mut() {
                pass.modify(ctx, &mut tree)?;
            }
            Ok(())
        });
        self.in_flight.remove(name);
        result.map(|()| tree)
    }
}

/// Parses `#include <name> [force]`, returning the module name and the
/// force flag.
fn parse_include(content: &str) -> Option<(String, bool)> {
    let body = content.trim_start_matches('#').trim_start();
    let rest = body.strip_prefix("include")?;
    let mut parts = rest.split_whitespace();
    let name = parts.next()?.to_string();
    let force = parts.next() == Some("force");
    Some((name, force))
}

/// Drops `#deprecated` notices from an included module, logging each.
fn strip_deprecations(name: &str, tree: &mut GlslTree) {
    tree.directives.retain(|directive| {
        let body = directive.content.trim_start_matches('#').trim_start();
        if let Some(notice) = body.strip_prefix("deprecated") {
            warn!(
                module = name,
                notice = notice.trim(),
                "including deprecated shader module"
            );
            false
        } else {
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn include_directives_parse_name_and_force() {
        assert_eq!(
            parse_include("#include lighting/common"),
            Some(("lighting/common".to_string(), false))
        );
        assert_eq!(
            parse_include("# include math force"),
            Some(("math".to_string(), true))
        );
        assert_eq!(parse_include("#define FOO 1"), None);
        assert_eq!(parse_include("#include"), None);
    }

    #[test]
    fn deprecation_notices_are_stripped() {
        let mut tree = glslforge::parse("#deprecated use lighting/v2 instead\nfloat a;")
            .expect("parse");
        assert_eq!(tree.directives.len(), 1);
        strip_deprecations("lighting", &mut tree);
        assert!(tree.directives.is_empty());
        assert_eq!(tree.body.len(), 1);
    }
}
