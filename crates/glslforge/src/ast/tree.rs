//! The parsed shader tree.

use std::collections::HashMap;
use std::fmt;

use crate::ast::decl::{Declaration, Declarator, FunctionHeader, TopLevel};
use crate::ast::expr::Expr;
use crate::ast::stmt::Stmt;
use crate::ast::types::{LayoutId, StorageQualifier, TypeQualifier};

/// The `#version` statement. Shaders without one default to `110 core`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionStatement {
    pub number: u32,
    pub core: bool,
}

impl VersionStatement {
    pub fn new(number: u32, core: bool) -> Self {
        Self { number, core }
    }
}

impl Default for VersionStatement {
    fn default() -> Self {
        Self { number: 110, core: true }
    }
}

impl fmt::Display for VersionStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#version {} {}",
            self.number,
            if self.core { "core" } else { "compatibility" }
        )
    }
}

/// A preprocessor directive kept as opaque text, remembering where in
/// the body it appeared so later passes can splice at that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Full directive text including the leading `#`.
    pub content: String,
    /// Index into [`GlslTree::body`] of the declaration that followed
    /// the directive when it was parsed.
    pub index: usize,
}

impl Directive {
    pub fn new(content: impl Into<String>, index: usize) -> Self {
        Self { content: content.into(), index }
    }
}

/// Where [`GlslTree::inject`] places a new declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionPoint {
    /// Before all existing declarations.
    Start,
    /// Immediately before the `main` function, or at the end if there
    /// is none.
    BeforeMain,
    /// After all existing declarations.
    End,
}

/// A complete parsed shader.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlslTree {
    pub version: VersionStatement,
    pub directives: Vec<Directive>,
    pub body: Vec<TopLevel>,
    /// `// #name` comment markers, mapping the lowercase marker name to
    /// the index of the declaration it preceded.
    pub markers: HashMap<String, usize>,
}

impl GlslTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the `void main()` definition.
    pub fn main_function(&self) -> Option<usize> {
        self.body.iter().position(|item| {
            matches!(item, TopLevel::Function { header, body: Some(_) } if header.name == "main")
        })
    }

    /// Statements of the `main` function.
    pub fn main_body_mut(&mut self) -> Option<&mut Vec<Stmt>> {
        self.body.iter_mut().find_map(|item| match item {
            TopLevel::Function { header, body: Some(stmts) } if header.name == "main" => {
                Some(stmts)
            }
            _ => None,
        })
    }

    /// All function definitions and prototypes.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionHeader> {
        self.body.iter().filter_map(|item| match item {
            TopLevel::Function { header, .. } => Some(header),
            _ => None,
        })
    }

    /// All file scope variable declarations.
    pub fn fields(&self) -> impl Iterator<Item = &Declaration> {
        self.body.iter().filter_map(|item| match item {
            TopLevel::Variable(declaration) => Some(declaration),
            _ => None,
        })
    }

    /// Finds the file scope variable declaring `name`.
    pub fn field(&self, name: &str) -> Option<&Declaration> {
        self.fields()
            .find(|d| d.declarators.iter().any(|decl| decl.name == name))
    }

    /// Inserts a declaration, keeping directive indices and markers in
    /// step with the shifted body.
    pub fn inject(&mut self, point: InjectionPoint, declaration: TopLevel) {
        let index = match point {
            InjectionPoint::Start => 0,
            InjectionPoint::BeforeMain => self.main_function().unwrap_or(self.body.len()),
            InjectionPoint::End => self.body.len(),
        };
        self.shift_anchors(index, 1);
        self.body.insert(index, declaration);
    }

    /// Splices a whole list of declarations at `index`.
    pub fn splice(&mut self, index: usize, declarations: Vec<TopLevel>) {
        self.shift_anchors(index, declarations.len());
        self.body.splice(index..index, declarations);
    }

    fn shift_anchors(&mut self, index: usize, amount: usize) {
        for directive in &mut self.directives {
            if directive.index >= index {
                directive.index += amount;
            }
        }
        for marker in self.markers.values_mut() {
            if *marker >= index {
                *marker += amount;
            }
        }
    }

    /// Assigns `layout(location = N)` to every `out` variable that does
    /// not already have one. Returns the next free output location.
    pub fn mark_outputs(&mut self) -> i64 {
        let mut used = Vec::new();
        let mut missing = Vec::new();
        for (index, item) in self.body.iter().enumerate() {
            let TopLevel::Variable(declaration) = item else {
                continue;
            };
            if !declaration.ty.has_storage(StorageQualifier::Out) {
                continue;
            }
            match declaration.ty.layout_value("location").and_then(Expr::as_const_int) {
                Some(location) => used.push(location),
                None => missing.push(index),
            }
        }

        let mut next = 0;
        for index in missing {
            while used.contains(&next) {
                next += 1;
            }
            let TopLevel::Variable(declaration) = &mut self.body[index] else {
                continue;
            };
            set_layout_value(&mut declaration.ty.qualifiers, "location", next);
            used.push(next);
        }
        (0..).find(|candidate| !used.contains(candidate)).unwrap_or(0)
    }
}

/// Sets `name = value` in the first layout qualifier, adding a layout
/// qualifier at the front if the list has none.
pub fn set_layout_value(qualifiers: &mut Vec<TypeQualifier>, name: &str, value: i64) {
    let id = LayoutId::new(name, Some(Expr::int(value)));
    for qualifier in qualifiers.iter_mut() {
        if let TypeQualifier::Layout(ids) = qualifier {
            if let Some(existing) = ids.iter_mut().find(|i| i.name == name) {
                existing.value = Some(Expr::int(value));
            } else {
                ids.push(id);
            }
            return;
        }
    }
    qualifiers.insert(0, TypeQualifier::Layout(vec![id]));
}

/// Removes `name` from every layout qualifier, dropping qualifiers that
/// become empty. Returns the removed value, if any.
pub fn take_layout_value(qualifiers: &mut Vec<TypeQualifier>, name: &str) -> Option<Expr> {
    let mut taken = None;
    for qualifier in qualifiers.iter_mut() {
        if let TypeQualifier::Layout(ids) = qualifier {
            if let Some(position) = ids.iter().position(|i| i.name == name) {
                taken = ids.remove(position).value;
            }
        }
    }
    qualifiers.retain(|q| !matches!(q, TypeQualifier::Layout(ids) if ids.is_empty()));
    taken
}

impl GlslTree {
    /// Convenience constructor for injected `out` variables.
    pub fn out_variable(
        location: i64,
        specifier: crate::ast::types::TypeSpecifier,
        name: &str,
    ) -> TopLevel {
        TopLevel::Variable(Declaration {
            ty: crate::ast::types::SpecifiedType::new(
                vec![
                    TypeQualifier::Layout(vec![LayoutId::new(
                        "location",
                        Some(Expr::int(location)),
                    )]),
                    TypeQualifier::Storage(StorageQualifier::Out),
                ],
                specifier,
            ),
            declarators: vec![Declarator::named(name)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::types::{BuiltinType, SpecifiedType, TypeSpecifier};

    fn out_var(name: &str, location: Option<i64>) -> TopLevel {
        let mut qualifiers = vec![TypeQualifier::Storage(StorageQualifier::Out)];
        if let Some(location) = location {
            qualifiers.insert(
                0,
                TypeQualifier::Layout(vec![LayoutId::new("location", Some(Expr::int(location)))]),
            );
        }
        TopLevel::Variable(Declaration {
            ty: SpecifiedType::new(qualifiers, TypeSpecifier::Builtin(BuiltinType::Vec4)),
            declarators: vec![Declarator::named(name)],
        })
    }

    #[test]
    fn mark_outputs_fills_gaps() {
        let mut tree = GlslTree::new();
        tree.body.push(out_var("a", Some(1)));
        tree.body.push(out_var("b", None));
        tree.body.push(out_var("c", None));
        let next = tree.mark_outputs();

        let TopLevel::Variable(b) = &tree.body[1] else { panic!() };
        assert_eq!(b.ty.layout_value("location").and_then(Expr::as_const_int), Some(0));
        let TopLevel::Variable(c) = &tree.body[2] else { panic!() };
        assert_eq!(c.ty.layout_value("location").and_then(Expr::as_const_int), Some(2));
        assert_eq!(next, 3);
    }

    #[test]
    fn inject_shifts_directives_and_markers() {
        let mut tree = GlslTree::new();
        tree.body.push(out_var("a", Some(0)));
        tree.directives.push(Directive::new("#include foo", 1));
        tree.markers.insert("main".to_string(), 0);
        tree.inject(InjectionPoint::Start, out_var("b", Some(1)));
        assert_eq!(tree.directives[0].index, 2);
        assert_eq!(tree.markers["main"], 1);
    }

    #[test]
    fn take_layout_value_drops_empty_layouts() {
        let mut qualifiers = vec![
            TypeQualifier::Layout(vec![LayoutId::new("binding", Some(Expr::int(3)))]),
            TypeQualifier::Storage(StorageQualifier::Uniform),
        ];
        let value = take_layout_value(&mut qualifiers, "binding");
        assert_eq!(value.and_then(|e| e.as_const_int()), Some(3));
        assert_eq!(qualifiers, vec![TypeQualifier::Storage(StorageQualifier::Uniform)]);
    }
}
