//! Backtracking recursive-descent parser.
//!
//! Alternatives are tried in a fixed order. A failed alternative
//! records its error as a candidate and restores the reader cursor, so
//! the next alternative starts from a clean slate; if everything fails
//! the candidate that got furthest becomes the reported error. A
//! partial tree is never returned.

mod decl;
mod expr;
mod stmt;

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::ast::{Directive, Expr, GlslTree, VersionStatement};
use crate::error::{GlslError, SyntaxError};
use crate::lexer;
use crate::reader::TokenReader;
use crate::token::{Token, TokenKind};

/// Matches `#name` marker comments, e.g. `// #uv_setup`.
static MARKER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#\s*(.+)").unwrap_or_else(|e| panic!("invalid marker pattern: {e}"))
});

/// Runs one alternative. On failure the error becomes a candidate and
/// the cursor is restored, upholding the backtracking purity contract.
fn attempt<T>(
    reader: &mut TokenReader,
    rule: impl FnOnce(&mut TokenReader) -> Result<T, SyntaxError>,
) -> Option<T> {
    let saved = reader.cursor();
    match rule(reader) {
        Ok(value) => Some(value),
        Err(error) => {
            reader.mark_error(error.message);
            reader.set_cursor(saved);
            None
        }
    }
}

/// Parses a whole shader into a [`GlslTree`].
pub fn parse(source: &str) -> Result<GlslTree, GlslError> {
    let mut markers = HashMap::new();
    let tokens = lexer::tokenize_with_comments(source, |index, comment| {
        if let Some(name) = marker_name(comment) {
            markers.insert(name, index);
        }
    })?;
    let mut reader = TokenReader::with_markers(&tokens, markers);
    Ok(parse_tree(&mut reader)?)
}

/// Parses a single expression, e.g. for injected assignments.
pub fn parse_expression(source: &str) -> Result<Expr, GlslError> {
    let tokens = lexer::tokenize(source)?;
    let mut reader = TokenReader::new(&tokens);
    let expression = expr::parse_expression(&mut reader)?;
    reader.try_consume(&[TokenKind::Semicolon]);
    if reader.can_read() {
        return Err(reader.error("Unexpected trailing tokens").into());
    }
    Ok(expression)
}

fn marker_name(comment: &Token) -> Option<String> {
    let text = match comment.kind {
        TokenKind::MultiComment => comment
            .lexeme
            .trim_start_matches("/*")
            .trim_end_matches("*/"),
        _ => comment.lexeme.trim_start_matches("//"),
    };
    MARKER_PATTERN
        .captures(text)
        .map(|captures| captures[1].trim().to_lowercase())
}

fn parse_tree(reader: &mut TokenReader) -> Result<GlslTree, SyntaxError> {
    let mut tree = GlslTree::new();
    while reader.can_read() {
        if reader.can_consume(TokenKind::Directive) {
            let content = reader.consume(TokenKind::Directive)?.lexeme.clone();
            handle_directive(reader, &mut tree, content)?;
            continue;
        }

        let start = reader.cursor();
        let Some(item) = decl::parse_top_level(reader) else {
            return Err(reader.best_error("Invalid top-level declaration"));
        };
        let index = tree.body.len();
        tree.body.push(item);
        for name in reader.markers_in(start, reader.cursor()) {
            tree.markers.insert(name, index);
        }
    }
    Ok(tree)
}

fn handle_directive(
    reader: &TokenReader,
    tree: &mut GlslTree,
    content: String,
) -> Result<(), SyntaxError> {
    let body = content.trim_start_matches('#').trim();
    if let Some(rest) = body.strip_prefix("version") {
        let mut parts = rest.split_whitespace();
        let number = parts
            .next()
            .and_then(|n| n.parse::<u32>().ok())
            .ok_or_else(|| reader.error("Invalid version directive"))?;
        let core = match parts.next() {
            Some("compatibility") | Some("es") => false,
            _ => true,
        };
        tree.version = VersionStatement::new(number, core);
    } else {
        tree.directives.push(Directive::new(content, tree.body.len()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        BinaryOp, BuiltinType, Declarator, StorageQualifier, Stmt, TopLevel, TypeSpecifier,
    };

    #[test]
    fn end_to_end_declaration_and_main() {
        let tree = parse("uniform float a; void main(){ float b = a + 1.0; }").expect("parse");
        assert_eq!(tree.version, VersionStatement::new(110, true));
        assert_eq!(tree.body.len(), 2);

        let TopLevel::Variable(declaration) = &tree.body[0] else {
            panic!("expected variable");
        };
        assert!(declaration.ty.has_storage(StorageQualifier::Uniform));
        assert_eq!(declaration.declarators, vec![Declarator::named("a")]);

        let TopLevel::Function { header, body: Some(statements) } = &tree.body[1] else {
            panic!("expected main definition");
        };
        assert_eq!(header.name, "main");
        assert_eq!(header.return_type.specifier, TypeSpecifier::Builtin(BuiltinType::Void));
        assert_eq!(statements.len(), 1);
        let Stmt::Declaration(local) = &statements[0] else {
            panic!("expected local declaration");
        };
        let init = local.declarators[0].init.as_ref().expect("initializer");
        assert!(matches!(init, Expr::Binary { op: BinaryOp::Add, .. }));
    }

    #[test]
    fn version_directive_is_parsed() {
        let tree = parse("#version 450 core\nvoid main() {}").expect("parse");
        assert_eq!(tree.version, VersionStatement::new(450, true));
        assert!(tree.directives.is_empty());

        let tree = parse("#version 150 compatibility\nvoid main() {}").expect("parse");
        assert_eq!(tree.version, VersionStatement::new(150, false));
    }

    #[test]
    fn unknown_directives_are_kept_opaque_with_positions() {
        let tree = parse("float a;\n#include light:common\nfloat b;").expect("parse");
        assert_eq!(tree.directives.len(), 1);
        assert_eq!(tree.directives[0].content, "#include light:common");
        assert_eq!(tree.directives[0].index, 1);
    }

    #[test]
    fn markers_attach_to_the_following_declaration() {
        let tree = parse("float a;\n// #Main Entry\nvoid main() {}").expect("parse");
        assert_eq!(tree.markers.get("main entry"), Some(&1));
    }

    #[test]
    fn syntax_errors_return_no_partial_tree() {
        let error = parse("void main( {}").expect_err("should fail");
        assert!(matches!(error, GlslError::Syntax(_)));
    }

    #[test]
    fn parse_expression_round_trip() {
        let expression = parse_expression("a + b * 2.0").expect("parse");
        let Expr::Binary { op: BinaryOp::Add, right, .. } = expression else {
            panic!("expected addition");
        };
        assert!(matches!(*right, Expr::Binary { op: BinaryOp::Multiply, .. }));
    }

    #[test]
    fn trailing_garbage_in_expression_is_rejected() {
        assert!(parse_expression("a + b c").is_err());
    }
}
