//! Token classes produced by the lexer.

use std::fmt;

use crate::ast::{
    AssignOp, BuiltinType, IntFormat, InterpolationQualifier, PrecisionQualifier,
    StorageQualifier, UnaryOp,
};

/// The closed set of lexical classes. Keyword classes are declared
/// before [`TokenKind::Identifier`] in the lexer table, so equal-length
/// matches resolve to the keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A whole `#...` line, kept as opaque text.
    Directive,
    /// `__LINE__`, `__FILE__`, or `__VERSION__`.
    GlslMacro,
    Comment,
    MultiComment,

    Type(BuiltinType),
    Storage(StorageQualifier),
    Interpolation(InterpolationQualifier),
    PrecisionQualifier(PrecisionQualifier),
    Layout,
    Invariant,
    Precise,
    Precision,
    Struct,
    Subroutine,

    While,
    Break,
    Continue,
    Do,
    Else,
    For,
    If,
    Discard,
    Return,
    Switch,
    Case,
    Default,

    FloatConstant,
    DoubleConstant,
    IntConstant(IntFormat),
    UintConstant(IntFormat),
    BoolConstant,

    LeftOp,
    RightOp,
    IncOp,
    DecOp,
    LeOp,
    GeOp,
    EqOp,
    NeOp,
    AndOp,
    OrOp,
    XorOp,
    MulAssign,
    DivAssign,
    AddAssign,
    ModAssign,
    LeftAssign,
    RightAssign,
    AndAssign,
    XorAssign,
    OrAssign,
    SubAssign,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Dot,
    Comma,
    Colon,
    Equal,
    Semicolon,
    Bang,
    Dash,
    Tilde,
    Plus,
    Star,
    Slash,
    Percent,
    LeftAngle,
    RightAngle,
    VerticalBar,
    Caret,
    Ampersand,
    Question,

    Identifier,
}

impl TokenKind {
    pub fn as_builtin_type(&self) -> Option<BuiltinType> {
        match self {
            TokenKind::Type(ty) => Some(*ty),
            _ => None,
        }
    }

    pub fn as_storage_qualifier(&self) -> Option<StorageQualifier> {
        match self {
            TokenKind::Storage(storage) => Some(*storage),
            _ => None,
        }
    }

    pub fn as_interpolation_qualifier(&self) -> Option<InterpolationQualifier> {
        match self {
            TokenKind::Interpolation(interpolation) => Some(*interpolation),
            _ => None,
        }
    }

    pub fn as_precision_qualifier(&self) -> Option<PrecisionQualifier> {
        match self {
            TokenKind::PrecisionQualifier(precision) => Some(*precision),
            _ => None,
        }
    }

    pub fn as_assignment_op(&self) -> Option<AssignOp> {
        match self {
            TokenKind::Equal => Some(AssignOp::Assign),
            TokenKind::MulAssign => Some(AssignOp::Multiply),
            TokenKind::DivAssign => Some(AssignOp::Divide),
            TokenKind::ModAssign => Some(AssignOp::Modulo),
            TokenKind::AddAssign => Some(AssignOp::Add),
            TokenKind::SubAssign => Some(AssignOp::Subtract),
            TokenKind::LeftAssign => Some(AssignOp::LeftShift),
            TokenKind::RightAssign => Some(AssignOp::RightShift),
            TokenKind::AndAssign => Some(AssignOp::And),
            TokenKind::XorAssign => Some(AssignOp::Xor),
            TokenKind::OrAssign => Some(AssignOp::Or),
            _ => None,
        }
    }

    pub fn as_unary_op(&self) -> Option<UnaryOp> {
        match self {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Dash => Some(UnaryOp::Negate),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            _ => None,
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, TokenKind::Comment | TokenKind::MultiComment)
    }
}

/// A lexed token. `lexeme` is the exact source text, so concatenating
/// lexemes reconstructs the token stream for error reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>) -> Self {
        Self { kind, lexeme: lexeme.into() }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}[{}]", self.kind, self.lexeme)
    }
}
