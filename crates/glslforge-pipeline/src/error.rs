//! Pipeline error type.

use glslforge::{GlslError, LexError, SyntaxError};
use thiserror::Error;

/// Anything that can go wrong between raw source and a backend handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShaderError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// A failure anywhere inside an imported module, naming the module.
    #[error("failed to import shader module '{name}'")]
    Import {
        name: String,
        #[source]
        source: Box<ShaderError>,
    },
    #[error("shader processor failed: {0}")]
    Processor(String),
    /// The import source could not provide a module's text, or the
    /// module is remembered as permanently failed.
    #[error("failed to load shader module '{name}': {message}")]
    Load { name: String, message: String },
    #[error("backend compilation failed: {0}")]
    Backend(String),
}

impl From<GlslError> for ShaderError {
    fn from(error: GlslError) -> Self {
        match error {
            GlslError::Lex(e) => ShaderError::Lex(e),
            GlslError::Syntax(e) => ShaderError::Syntax(e),
        }
    }
}

impl ShaderError {
    /// The innermost non-import error, unwrapping nested module names.
    pub fn root_cause(&self) -> &ShaderError {
        match self {
            ShaderError::Import { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_errors_name_the_module_and_keep_the_cause() {
        let cause = ShaderError::Load {
            name: "math".to_string(),
            message: "not found".to_string(),
        };
        let error = ShaderError::Import {
            name: "lighting".to_string(),
            source: Box::new(cause.clone()),
        };
        assert!(error.to_string().contains("lighting"));
        assert_eq!(error.root_cause(), &cause);
    }
}
