//! Statement parsing.

use crate::ast::Stmt;
use crate::error::SyntaxError;
use crate::parser::{attempt, decl, expr};
use crate::reader::TokenReader;
use crate::token::TokenKind;

/// `{ statement* }` as a statement list.
pub(super) fn parse_compound(reader: &mut TokenReader) -> Result<Vec<Stmt>, SyntaxError> {
    reader.consume(TokenKind::LeftBrace)?;
    let mut statements = Vec::new();
    while !reader.try_consume(&[TokenKind::RightBrace]) {
        if !reader.can_read() {
            return Err(reader.error("Unterminated block"));
        }
        statements.push(parse_statement(reader)?);
    }
    Ok(statements)
}

pub(super) fn parse_statement(reader: &mut TokenReader) -> Result<Stmt, SyntaxError> {
    match reader.peek_kind(0) {
        Some(TokenKind::LeftBrace) => Ok(Stmt::Compound(parse_compound(reader)?)),
        Some(TokenKind::Semicolon) => {
            reader.skip();
            Ok(Stmt::Empty)
        }
        Some(TokenKind::If) => parse_if(reader),
        Some(TokenKind::Switch) => parse_switch(reader),
        Some(TokenKind::Case) => {
            reader.skip();
            let label = expr::parse_expression(reader)?;
            reader.consume(TokenKind::Colon)?;
            Ok(Stmt::CaseLabel(Some(label)))
        }
        Some(TokenKind::Default) => {
            reader.skip();
            reader.consume(TokenKind::Colon)?;
            Ok(Stmt::CaseLabel(None))
        }
        Some(TokenKind::While) => parse_while(reader),
        Some(TokenKind::Do) => parse_do_while(reader),
        Some(TokenKind::For) => parse_for(reader),
        Some(TokenKind::Continue) => {
            reader.skip();
            reader.consume(TokenKind::Semicolon)?;
            Ok(Stmt::Continue)
        }
        Some(TokenKind::Break) => {
            reader.skip();
            reader.consume(TokenKind::Semicolon)?;
            Ok(Stmt::Break)
        }
        Some(TokenKind::Discard) => {
            reader.skip();
            reader.consume(TokenKind::Semicolon)?;
            Ok(Stmt::Discard)
        }
        Some(TokenKind::Return) => {
            reader.skip();
            if reader.try_consume(&[TokenKind::Semicolon]) {
                return Ok(Stmt::Return(None));
            }
            let value = expr::parse_expression(reader)?;
            reader.consume(TokenKind::Semicolon)?;
            Ok(Stmt::Return(Some(value)))
        }
        _ => parse_simple(reader),
    }
}

/// Declaration or expression statement. A declaration is attempted
/// first since `S s;` is ambiguous with an expression up to the second
/// identifier.
fn parse_simple(reader: &mut TokenReader) -> Result<Stmt, SyntaxError> {
    if let Some(declaration) = attempt(reader, decl::parse_declaration_body) {
        return Ok(Stmt::Declaration(declaration));
    }
    let expression = expr::parse_expression(reader)?;
    reader.consume(TokenKind::Semicolon)?;
    Ok(Stmt::Expr(expression))
}

fn parse_if(reader: &mut TokenReader) -> Result<Stmt, SyntaxError> {
    reader.consume(TokenKind::If)?;
    reader.consume(TokenKind::LeftParen)?;
    let condition = expr::parse_expression(reader)?;
    reader.consume(TokenKind::RightParen)?;
    let then_branch = Box::new(parse_statement(reader)?);
    let else_branch = if reader.try_consume(&[TokenKind::Else]) {
        Some(Box::new(parse_statement(reader)?))
    } else {
        None
    };
    Ok(Stmt::If { condition, then_branch, else_branch })
}

fn parse_switch(reader: &mut TokenReader) -> Result<Stmt, SyntaxError> {
    reader.consume(TokenKind::Switch)?;
    reader.consume(TokenKind::LeftParen)?;
    let condition = expr::parse_expression(reader)?;
    reader.consume(TokenKind::RightParen)?;
    let body = parse_compound(reader)?;
    Ok(Stmt::Switch { condition, body })
}

fn parse_while(reader: &mut TokenReader) -> Result<Stmt, SyntaxError> {
    reader.consume(TokenKind::While)?;
    reader.consume(TokenKind::LeftParen)?;
    let condition = expr::parse_expression(reader)?;
    reader.consume(TokenKind::RightParen)?;
    let body = Box::new(parse_statement(reader)?);
    Ok(Stmt::While { condition, body })
}

fn parse_do_while(reader: &mut TokenReader) -> Result<Stmt, SyntaxError> {
    reader.consume(TokenKind::Do)?;
    let body = Box::new(parse_statement(reader)?);
    reader.consume(TokenKind::While)?;
    reader.consume(TokenKind::LeftParen)?;
    let condition = expr::parse_expression(reader)?;
    reader.consume(TokenKind::RightParen)?;
    reader.consume(TokenKind::Semicolon)?;
    Ok(Stmt::DoWhile { condition, body })
}

fn parse_for(reader: &mut TokenReader) -> Result<Stmt, SyntaxError> {
    reader.consume(TokenKind::For)?;
    reader.consume(TokenKind::LeftParen)?;

    let init = if reader.try_consume(&[TokenKind::Semicolon]) {
        Stmt::Empty
    } else if let Some(declaration) = attempt(reader, decl::parse_declaration_body) {
        Stmt::Declaration(declaration)
    } else {
        let expression = expr::parse_expression(reader)?;
        reader.consume(TokenKind::Semicolon)?;
        Stmt::Expr(expression)
    };

    let condition = if reader.can_consume(TokenKind::Semicolon) {
        None
    } else {
        Some(expr::parse_expression(reader)?)
    };
    reader.consume(TokenKind::Semicolon)?;

    let update = if reader.can_consume(TokenKind::RightParen) {
        None
    } else {
        Some(expr::parse_expression(reader)?)
    };
    reader.consume(TokenKind::RightParen)?;

    let body = Box::new(parse_statement(reader)?);
    Ok(Stmt::For { init: Box::new(init), condition, update, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, Expr, TopLevel};
    use crate::parser::parse;

    fn main_body(source: &str) -> Vec<Stmt> {
        let tree = parse(source).expect("parse");
        let Some(TopLevel::Function { body: Some(body), .. }) = tree.body.into_iter().next()
        else {
            panic!("expected main definition");
        };
        body
    }

    #[test]
    fn dangling_else_binds_to_the_nearest_if() {
        let body = main_body("void main() { if (a) if (b) x = 1; else x = 2; }");
        let Stmt::If { else_branch: None, then_branch, .. } = &body[0] else {
            panic!("outer if must not own the else");
        };
        assert!(matches!(**then_branch, Stmt::If { else_branch: Some(_), .. }));
    }

    #[test]
    fn for_loop_with_declaration_init() {
        let body = main_body("void main() { for (int i = 0; i < 4; i++) total += i; }");
        let Stmt::For { init, condition, update, .. } = &body[0] else {
            panic!("expected for");
        };
        assert!(matches!(**init, Stmt::Declaration(_)));
        assert!(matches!(
            condition,
            Some(Expr::Binary { op: BinaryOp::Less, .. })
        ));
        assert!(update.is_some());
    }

    #[test]
    fn for_loop_headers_may_be_empty() {
        let body = main_body("void main() { for (;;) break; }");
        let Stmt::For { init, condition, update, .. } = &body[0] else {
            panic!("expected for");
        };
        assert!(matches!(**init, Stmt::Empty));
        assert!(condition.is_none());
        assert!(update.is_none());
    }

    #[test]
    fn switch_with_case_labels() {
        let body = main_body(
            "void main() { switch (mode) { case 0: x = 1.0; break; default: x = 0.0; } }",
        );
        let Stmt::Switch { body: arms, .. } = &body[0] else {
            panic!("expected switch");
        };
        assert!(matches!(arms[0], Stmt::CaseLabel(Some(_))));
        assert!(matches!(arms[3], Stmt::CaseLabel(None)));
    }

    #[test]
    fn do_while_requires_trailing_semicolon() {
        let body = main_body("void main() { do { x += 1.0; } while (x < 4.0); }");
        assert!(matches!(body[0], Stmt::DoWhile { .. }));
        assert!(parse("void main() { do { } while (x < 4.0) }").is_err());
    }

    #[test]
    fn declaration_wins_over_expression_in_statement_scope() {
        let body = main_body("void main() { Light probe; probe.range = 1.0; }");
        assert!(matches!(body[0], Stmt::Declaration(_)));
        assert!(matches!(body[1], Stmt::Expr(Expr::Assign { .. })));
    }

    #[test]
    fn discard_and_return_statements() {
        let body = main_body("void main() { if (a < 0.5) discard; return; }");
        let Stmt::If { then_branch, .. } = &body[0] else {
            panic!("expected if");
        };
        assert!(matches!(**then_branch, Stmt::Discard));
        assert!(matches!(body[1], Stmt::Return(None)));
    }
}
