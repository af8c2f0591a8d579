//! Expression parsing.
//!
//! One function per precedence tier, from the comma sequence at the
//! bottom to primaries at the top. The binary tiers share a single
//! table-driven left fold.

use crate::ast::{AssignOp, BinaryOp, Expr, IntFormat, UnaryOp};
use crate::error::SyntaxError;
use crate::parser::{attempt, decl};
use crate::reader::TokenReader;
use crate::token::TokenKind;

/// Binary tiers from loosest to tightest. Each entry lists the operator
/// tokens folded at that tier.
const BINARY_LEVELS: &[&[(TokenKind, BinaryOp)]] = &[
    &[(TokenKind::OrOp, BinaryOp::LogicalOr)],
    &[(TokenKind::XorOp, BinaryOp::LogicalXor)],
    &[(TokenKind::AndOp, BinaryOp::LogicalAnd)],
    &[(TokenKind::VerticalBar, BinaryOp::BitOr)],
    &[(TokenKind::Caret, BinaryOp::BitXor)],
    &[(TokenKind::Ampersand, BinaryOp::BitAnd)],
    &[(TokenKind::EqOp, BinaryOp::Equal), (TokenKind::NeOp, BinaryOp::NotEqual)],
    &[
        (TokenKind::LeftAngle, BinaryOp::Less),
        (TokenKind::RightAngle, BinaryOp::Greater),
        (TokenKind::LeOp, BinaryOp::LessEqual),
        (TokenKind::GeOp, BinaryOp::GreaterEqual),
    ],
    &[(TokenKind::LeftOp, BinaryOp::LeftShift), (TokenKind::RightOp, BinaryOp::RightShift)],
    &[(TokenKind::Plus, BinaryOp::Add), (TokenKind::Dash, BinaryOp::Subtract)],
    &[
        (TokenKind::Star, BinaryOp::Multiply),
        (TokenKind::Slash, BinaryOp::Divide),
        (TokenKind::Percent, BinaryOp::Modulo),
    ],
];

/// Comma-sequence expression.
pub(super) fn parse_expression(reader: &mut TokenReader) -> Result<Expr, SyntaxError> {
    let mut items = vec![parse_assignment(reader)?];
    while reader.try_consume(&[TokenKind::Comma]) {
        items.push(parse_assignment(reader)?);
    }
    if items.len() == 1 {
        Ok(items.remove(0))
    } else {
        Ok(Expr::Sequence(items))
    }
}

/// `unary op= assignment` (right associative) or a conditional.
pub(super) fn parse_assignment(reader: &mut TokenReader) -> Result<Expr, SyntaxError> {
    let saved = reader.cursor();
    if let Some(target) = attempt(reader, parse_unary) {
        if let Some(op) = assignment_op(reader) {
            let value = parse_assignment(reader)?;
            return Ok(Expr::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            });
        }
        reader.set_cursor(saved);
    }
    parse_conditional(reader)
}

fn assignment_op(reader: &mut TokenReader) -> Option<AssignOp> {
    let op = reader.peek_kind(0)?.as_assignment_op()?;
    reader.skip();
    Some(op)
}

pub(super) fn parse_conditional(reader: &mut TokenReader) -> Result<Expr, SyntaxError> {
    let condition = parse_binary_level(reader, 0)?;
    if !reader.try_consume(&[TokenKind::Question]) {
        return Ok(condition);
    }
    let then_branch = parse_expression(reader)?;
    reader.consume(TokenKind::Colon)?;
    let else_branch = parse_assignment(reader)?;
    Ok(Expr::Conditional {
        condition: Box::new(condition),
        then_branch: Box::new(then_branch),
        else_branch: Box::new(else_branch),
    })
}

fn parse_binary_level(reader: &mut TokenReader, level: usize) -> Result<Expr, SyntaxError> {
    if level == BINARY_LEVELS.len() {
        return parse_unary(reader);
    }
    let mut left = parse_binary_level(reader, level + 1)?;
    'fold: loop {
        for (kind, op) in BINARY_LEVELS[level] {
            if reader.can_consume(*kind) {
                reader.skip();
                let right = parse_binary_level(reader, level + 1)?;
                left = Expr::Binary {
                    op: *op,
                    left: Box::new(left),
                    right: Box::new(right),
                };
                continue 'fold;
            }
        }
        break;
    }
    Ok(left)
}

pub(super) fn parse_unary(reader: &mut TokenReader) -> Result<Expr, SyntaxError> {
    let op = match reader.peek_kind(0) {
        Some(TokenKind::IncOp) => Some(UnaryOp::PrefixIncrement),
        Some(TokenKind::DecOp) => Some(UnaryOp::PrefixDecrement),
        Some(kind) => kind.as_unary_op(),
        None => None,
    };
    if let Some(op) = op {
        reader.skip();
        let operand = parse_unary(reader)?;
        return Ok(Expr::Unary { op, operand: Box::new(operand) });
    }
    parse_postfix(reader)
}

fn parse_postfix(reader: &mut TokenReader) -> Result<Expr, SyntaxError> {
    let mut base = parse_primary(reader)?;
    loop {
        match reader.peek_kind(0) {
            Some(TokenKind::LeftBracket) => {
                reader.skip();
                let index = parse_expression(reader)?;
                reader.consume(TokenKind::RightBracket)?;
                base = Expr::Index { base: Box::new(base), index: Box::new(index) };
            }
            Some(TokenKind::Dot) => {
                reader.skip();
                let field = reader.consume_identifier()?;
                base = Expr::Field { base: Box::new(base), field };
            }
            Some(TokenKind::LeftParen)
                if matches!(
                    base,
                    Expr::Variable(_) | Expr::Constructor(_) | Expr::Field { .. }
                ) =>
            {
                let args = parse_call_args(reader)?;
                base = Expr::Call { target: Box::new(base), args };
            }
            Some(TokenKind::IncOp) => {
                reader.skip();
                base = Expr::Unary { op: UnaryOp::PostfixIncrement, operand: Box::new(base) };
            }
            Some(TokenKind::DecOp) => {
                reader.skip();
                base = Expr::Unary { op: UnaryOp::PostfixDecrement, operand: Box::new(base) };
            }
            _ => break,
        }
    }
    Ok(base)
}

fn parse_call_args(reader: &mut TokenReader) -> Result<Vec<Expr>, SyntaxError> {
    reader.consume(TokenKind::LeftParen)?;
    if reader.try_consume(&[TokenKind::RightParen]) {
        return Ok(Vec::new());
    }
    // `f(void)` is an empty argument list.
    if reader.try_consume(&[
        TokenKind::Type(crate::ast::BuiltinType::Void),
        TokenKind::RightParen,
    ]) {
        return Ok(Vec::new());
    }
    let mut args = vec![parse_assignment(reader)?];
    while reader.try_consume(&[TokenKind::Comma]) {
        args.push(parse_assignment(reader)?);
    }
    reader.consume(TokenKind::RightParen)?;
    Ok(args)
}

fn parse_primary(reader: &mut TokenReader) -> Result<Expr, SyntaxError> {
    let Some(token) = reader.peek(0) else {
        return Err(reader.error("Expected expression"));
    };
    let kind = token.kind;
    let lexeme = token.lexeme.clone();
    match kind {
        TokenKind::IntConstant(format) => {
            let value = parse_int_value(&lexeme, format)
                .ok_or_else(|| reader.error("Invalid integer constant"))?;
            reader.skip();
            Ok(Expr::Int { format, value })
        }
        TokenKind::UintConstant(format) => {
            let value = parse_uint_value(&lexeme, format)
                .ok_or_else(|| reader.error("Invalid integer constant"))?;
            reader.skip();
            Ok(Expr::Uint { format, value })
        }
        TokenKind::FloatConstant => {
            let digits = lexeme.trim_end_matches(['f', 'F']);
            let value = digits
                .parse::<f32>()
                .map_err(|_| reader.error("Invalid float constant"))?;
            reader.skip();
            Ok(Expr::Float(value))
        }
        TokenKind::DoubleConstant => {
            let digits = lexeme
                .trim_end_matches(['f', 'F'])
                .trim_end_matches(['l', 'L']);
            let value = digits
                .parse::<f64>()
                .map_err(|_| reader.error("Invalid double constant"))?;
            reader.skip();
            Ok(Expr::Double(value))
        }
        TokenKind::BoolConstant => {
            reader.skip();
            Ok(Expr::Bool(lexeme == "true"))
        }
        TokenKind::Identifier | TokenKind::GlslMacro => {
            reader.skip();
            Ok(Expr::Variable(lexeme))
        }
        TokenKind::Type(builtin) => {
            // Type names only appear in expressions as constructor
            // calls, e.g. `vec3(1.0)` or `float[3](...)`.
            reader.skip();
            let sizes = decl::parse_array_suffixes(reader)?;
            if !reader.can_consume(TokenKind::LeftParen) {
                return Err(reader.error("Expected constructor call"));
            }
            Ok(Expr::Constructor(
                crate::ast::TypeSpecifier::Builtin(builtin).with_arrays(sizes),
            ))
        }
        TokenKind::LeftParen => {
            reader.skip();
            let inner = parse_expression(reader)?;
            reader.consume(TokenKind::RightParen)?;
            Ok(inner)
        }
        _ => Err(reader.error("Expected expression")),
    }
}

fn parse_int_value(lexeme: &str, format: IntFormat) -> Option<i64> {
    let digits = lexeme.trim_end_matches(['u', 'U']);
    match format {
        IntFormat::Decimal => digits.parse().ok(),
        IntFormat::Octal => i64::from_str_radix(digits, 8).ok(),
        IntFormat::Hexadecimal => i64::from_str_radix(&digits[2..], 16).ok(),
    }
}

fn parse_uint_value(lexeme: &str, format: IntFormat) -> Option<u64> {
    let digits = lexeme.trim_end_matches(['u', 'U']);
    match format {
        IntFormat::Decimal => digits.parse().ok(),
        IntFormat::Octal => u64::from_str_radix(digits, 8).ok(),
        IntFormat::Hexadecimal => u64::from_str_radix(&digits[2..], 16).ok(),
    }
}
