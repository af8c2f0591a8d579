//! Expression nodes.

use crate::ast::types::TypeSpecifier;

/// Radix a literal was written in. Printing preserves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntFormat {
    Decimal,
    Octal,
    Hexadecimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Negate,
    Not,
    BitNot,
    PrefixIncrement,
    PrefixDecrement,
    PostfixIncrement,
    PostfixDecrement,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::PrefixIncrement | UnaryOp::PostfixIncrement => "++",
            UnaryOp::PrefixDecrement | UnaryOp::PostfixDecrement => "--",
        }
    }

    pub fn is_postfix(&self) -> bool {
        matches!(self, UnaryOp::PostfixIncrement | UnaryOp::PostfixDecrement)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Multiply,
    Divide,
    Modulo,
    Add,
    Subtract,
    LeftShift,
    RightShift,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
    BitAnd,
    BitXor,
    BitOr,
    LogicalAnd,
    LogicalXor,
    LogicalOr,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::LeftShift => "<<",
            BinaryOp::RightShift => ">>",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalXor => "^^",
            BinaryOp::LogicalOr => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Multiply,
    Divide,
    Modulo,
    Add,
    Subtract,
    LeftShift,
    RightShift,
    And,
    Xor,
    Or,
}

impl AssignOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Multiply => "*=",
            AssignOp::Divide => "/=",
            AssignOp::Modulo => "%=",
            AssignOp::Add => "+=",
            AssignOp::Subtract => "-=",
            AssignOp::LeftShift => "<<=",
            AssignOp::RightShift => ">>=",
            AssignOp::And => "&=",
            AssignOp::Xor => "^=",
            AssignOp::Or => "|=",
        }
    }
}

/// A GLSL expression. Parenthesization is not preserved; the printer
/// re-inserts parentheses from operator precedence.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int {
        format: IntFormat,
        value: i64,
    },
    Uint {
        format: IntFormat,
        value: u64,
    },
    Float(f32),
    Double(f64),
    Bool(bool),
    Variable(String),
    /// A type used as a constructor call target, e.g. `vec3` in
    /// `vec3(1.0)`.
    Constructor(TypeSpecifier),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Call {
        target: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Field {
        base: Box<Expr>,
        field: String,
    },
    /// Comma sequence; evaluates left to right.
    Sequence(Vec<Expr>),
}

impl Expr {
    /// A decimal int constant.
    pub fn int(value: i64) -> Expr {
        Expr::Int {
            format: IntFormat::Decimal,
            value,
        }
    }

    pub fn variable(name: impl Into<String>) -> Expr {
        Expr::Variable(name.into())
    }

    /// The constant integer value of this expression, if it is a plain
    /// int or uint literal.
    pub fn as_const_int(&self) -> Option<i64> {
        match self {
            Expr::Int { value, .. } => Some(*value),
            Expr::Uint { value, .. } => i64::try_from(*value).ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn const_int_extraction() {
        assert_eq!(Expr::int(7).as_const_int(), Some(7));
        let uint = Expr::Uint {
            format: IntFormat::Hexadecimal,
            value: 31,
        };
        assert_eq!(uint.as_const_int(), Some(31));
        assert_eq!(Expr::variable("x").as_const_int(), None);
    }
}
