//! Declaration nodes.

use crate::ast::expr::Expr;
use crate::ast::stmt::Stmt;
use crate::ast::types::{
    PrecisionQualifier, SpecifiedType, StructField, StructSpecifier, TypeQualifier, TypeSpecifier,
};

/// Return type, name, and parameters of a function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionHeader {
    pub return_type: SpecifiedType,
    pub name: String,
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub ty: SpecifiedType,
    pub name: Option<String>,
}

/// One declared name. Array suffixes on the name (`float a[2]`) are
/// kept here, independent of the shared type specifier, so every
/// declarator in `float a, b = 1.0, c[2];` stands on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: String,
    pub arrays: Vec<Option<Expr>>,
    pub init: Option<Expr>,
}

impl Declarator {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arrays: Vec::new(),
            init: None,
        }
    }
}

/// A variable declaration: one specified type and one or more
/// declarators.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub ty: SpecifiedType,
    pub declarators: Vec<Declarator>,
}

/// An external (file scope) declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum TopLevel {
    /// Definition when `body` is present, prototype otherwise.
    Function {
        header: FunctionHeader,
        body: Option<Vec<Stmt>>,
    },
    Variable(Declaration),
    /// A struct type declaration with no declared variables.
    Struct(StructSpecifier),
    /// `uniform Block { ... } instance;`
    InterfaceBlock {
        qualifiers: Vec<TypeQualifier>,
        name: String,
        fields: Vec<StructField>,
        instance: Option<Declarator>,
    },
    /// `precision highp float;`
    Precision {
        precision: PrecisionQualifier,
        specifier: TypeSpecifier,
    },
    /// A bare qualifier declaration such as `invariant gl_Position;` or
    /// `layout(early_fragment_tests) in;`.
    QualifierOnly {
        qualifiers: Vec<TypeQualifier>,
        names: Vec<String>,
    },
}

impl TopLevel {
    /// The primary declared name, used for lookups by field name.
    pub fn declared_name(&self) -> Option<&str> {
        match self {
            TopLevel::Function { header, .. } => Some(&header.name),
            TopLevel::Variable(declaration) => {
                declaration.declarators.first().map(|d| d.name.as_str())
            }
            TopLevel::Struct(spec) => spec.name.as_deref(),
            TopLevel::InterfaceBlock { name, instance, .. } => {
                Some(instance.as_ref().map_or(name.as_str(), |i| i.name.as_str()))
            }
            TopLevel::Precision { .. } | TopLevel::QualifierOnly { .. } => None,
        }
    }
}
