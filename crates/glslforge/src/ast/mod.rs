//! Abstract syntax tree for GLSL shaders.
//!
//! The node enums are closed: every consumer matches exhaustively, so
//! adding a construct is a compile error until all passes handle it.

mod decl;
mod expr;
mod stmt;
mod tree;
mod types;

pub use decl::{Declaration, Declarator, FunctionHeader, Parameter, TopLevel};
pub use expr::{AssignOp, BinaryOp, Expr, IntFormat, UnaryOp};
pub use stmt::Stmt;
pub use tree::{Directive, GlslTree, InjectionPoint, VersionStatement};
pub use types::{
    BuiltinType, InterpolationQualifier, LayoutId, PrecisionQualifier, SpecifiedType,
    StorageQualifier, StructField, StructSpecifier, TypeQualifier, TypeSpecifier,
};

pub use tree::{set_layout_value, take_layout_value};
