//! Source printer.
//!
//! Turns a [`GlslTree`] back into compilable GLSL. Parentheses are not
//! stored in the tree, so the printer re-inserts them from operator
//! precedence: a subexpression is parenthesized exactly when its
//! precedence is below the minimum its position requires. Printing a
//! tree and reparsing the output yields an equal tree.

use std::fmt::Write;

use crate::ast::{
    BinaryOp, Declaration, Declarator, Directive, Expr, FunctionHeader, GlslTree, IntFormat,
    Parameter, Stmt, StructField, TopLevel, TypeQualifier, TypeSpecifier,
};

const INDENT: &str = "    ";

/// Precedence of the sequence operator, the loosest tier.
const PREC_SEQUENCE: u8 = 0;
const PREC_ASSIGN: u8 = 1;
const PREC_CONDITIONAL: u8 = 2;
/// Prefix unary operators. Operands of prefix operators are printed one
/// tier tighter so `-(-a)` keeps its parentheses instead of relexing as
/// a `--` token.
const PREC_UNARY: u8 = 14;
const PREC_POSTFIX: u8 = 15;
const PREC_PRIMARY: u8 = 16;

fn binary_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::LogicalOr => 3,
        BinaryOp::LogicalXor => 4,
        BinaryOp::LogicalAnd => 5,
        BinaryOp::BitOr => 6,
        BinaryOp::BitXor => 7,
        BinaryOp::BitAnd => 8,
        BinaryOp::Equal | BinaryOp::NotEqual => 9,
        BinaryOp::Less | BinaryOp::Greater | BinaryOp::LessEqual | BinaryOp::GreaterEqual => 10,
        BinaryOp::LeftShift | BinaryOp::RightShift => 11,
        BinaryOp::Add | BinaryOp::Subtract => 12,
        BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo => 13,
    }
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Sequence(_) => PREC_SEQUENCE,
        Expr::Assign { .. } => PREC_ASSIGN,
        Expr::Conditional { .. } => PREC_CONDITIONAL,
        Expr::Binary { op, .. } => binary_precedence(*op),
        Expr::Unary { op, .. } if !op.is_postfix() => PREC_UNARY,
        Expr::Unary { .. } | Expr::Call { .. } | Expr::Index { .. } | Expr::Field { .. } => {
            PREC_POSTFIX
        }
        _ => PREC_PRIMARY,
    }
}

impl GlslTree {
    /// Prints the whole tree as GLSL source.
    pub fn to_source_string(&self) -> String {
        let mut printer = Printer::new();
        printer.tree(self);
        printer.out
    }
}

struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn new() -> Self {
        Self { out: String::new(), indent: 0 }
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
    }

    fn tree(&mut self, tree: &GlslTree) {
        let _ = write!(self.out, "{}", tree.version);
        self.out.push('\n');

        for index in 0..=tree.body.len() {
            self.directives_at(&tree.directives, index, tree.body.len());
            if let Some(item) = tree.body.get(index) {
                self.newline();
                self.top_level(item);
            }
        }
        self.out.push('\n');
    }

    fn directives_at(&mut self, directives: &[Directive], index: usize, body_len: usize) {
        for directive in directives {
            if directive.index.min(body_len) == index {
                self.newline();
                self.out.push_str(&directive.content);
            }
        }
    }

    fn top_level(&mut self, item: &TopLevel) {
        match item {
            TopLevel::Function { header, body } => {
                self.function_header(header);
                match body {
                    Some(statements) => {
                        self.out.push_str(" {");
                        self.block(statements);
                        self.newline();
                        self.out.push('}');
                    }
                    None => self.out.push(';'),
                }
            }
            TopLevel::Variable(declaration) => {
                self.declaration(declaration);
                self.out.push(';');
            }
            TopLevel::Struct(spec) => {
                self.out.push_str("struct ");
                if let Some(name) = &spec.name {
                    self.out.push_str(name);
                    self.out.push(' ');
                }
                self.field_block(&spec.fields);
                self.out.push(';');
            }
            TopLevel::InterfaceBlock { qualifiers, name, fields, instance } => {
                self.qualifiers(qualifiers);
                self.out.push_str(name);
                self.out.push(' ');
                self.field_block(fields);
                if let Some(instance) = instance {
                    self.out.push(' ');
                    self.declarator(instance);
                }
                self.out.push(';');
            }
            TopLevel::Precision { precision, specifier } => {
                let _ = write!(self.out, "precision {} ", precision.keyword());
                self.type_specifier(specifier);
                self.out.push(';');
            }
            TopLevel::QualifierOnly { qualifiers, names } => {
                self.qualifiers(qualifiers);
                if names.is_empty() {
                    // `layout(...) in;` keeps its trailing qualifier, so
                    // only trim the separator space.
                    self.out.truncate(self.out.trim_end().len());
                } else {
                    self.out.push_str(&names.join(", "));
                }
                self.out.push(';');
            }
        }
    }

    fn function_header(&mut self, header: &FunctionHeader) {
        self.qualifiers(&header.return_type.qualifiers);
        self.type_specifier(&header.return_type.specifier);
        let _ = write!(self.out, " {}(", header.name);
        for (position, parameter) in header.parameters.iter().enumerate() {
            if position > 0 {
                self.out.push_str(", ");
            }
            self.parameter(parameter);
        }
        self.out.push(')');
    }

    fn parameter(&mut self, parameter: &Parameter) {
        self.qualifiers(&parameter.ty.qualifiers);
        self.type_specifier(&parameter.ty.specifier);
        if let Some(name) = &parameter.name {
            self.out.push(' ');
            self.out.push_str(name);
        }
    }

    fn declaration(&mut self, declaration: &Declaration) {
        self.qualifiers(&declaration.ty.qualifiers);
        self.type_specifier(&declaration.ty.specifier);
        for (position, declarator) in declaration.declarators.iter().enumerate() {
            self.out.push_str(if position > 0 { ", " } else { " " });
            self.declarator(declarator);
        }
    }

    fn declarator(&mut self, declarator: &Declarator) {
        self.out.push_str(&declarator.name);
        for size in &declarator.arrays {
            self.array_suffix(size.as_ref());
        }
        if let Some(init) = &declarator.init {
            self.out.push_str(" = ");
            self.expr(init, PREC_ASSIGN);
        }
    }

    fn array_suffix(&mut self, size: Option<&Expr>) {
        self.out.push('[');
        if let Some(size) = size {
            self.expr(size, PREC_CONDITIONAL);
        }
        self.out.push(']');
    }

    fn qualifiers(&mut self, qualifiers: &[TypeQualifier]) {
        for qualifier in qualifiers {
            match qualifier {
                TypeQualifier::Storage(storage) => self.out.push_str(storage.keyword()),
                TypeQualifier::Layout(ids) => {
                    self.out.push_str("layout(");
                    for (position, id) in ids.iter().enumerate() {
                        if position > 0 {
                            self.out.push_str(", ");
                        }
                        self.out.push_str(&id.name);
                        if let Some(value) = &id.value {
                            self.out.push_str(" = ");
                            self.expr(value, PREC_CONDITIONAL);
                        }
                    }
                    self.out.push(')');
                }
                TypeQualifier::Precision(precision) => self.out.push_str(precision.keyword()),
                TypeQualifier::Interpolation(interpolation) => {
                    self.out.push_str(interpolation.keyword())
                }
                TypeQualifier::Invariant => self.out.push_str("invariant"),
                TypeQualifier::Precise => self.out.push_str("precise"),
                TypeQualifier::Subroutine(type_names) => {
                    self.out.push_str("subroutine");
                    if !type_names.is_empty() {
                        let _ = write!(self.out, "({})", type_names.join(", "));
                    }
                }
            }
            self.out.push(' ');
        }
    }

    fn type_specifier(&mut self, specifier: &TypeSpecifier) {
        match specifier {
            TypeSpecifier::Builtin(builtin) => self.out.push_str(builtin.glsl_name()),
            TypeSpecifier::Named(name) => self.out.push_str(name),
            TypeSpecifier::Struct(spec) => {
                self.out.push_str("struct ");
                if let Some(name) = &spec.name {
                    self.out.push_str(name);
                    self.out.push(' ');
                }
                self.field_block(&spec.fields);
            }
            TypeSpecifier::Array { .. } => {
                self.type_specifier(specifier.element_type());
                // Array tiers print outermost first: `float[2][3]`.
                let mut current = specifier;
                while let TypeSpecifier::Array { element, size } = current {
                    self.array_suffix(size.as_deref());
                    current = element;
                }
            }
        }
    }

    fn field_block(&mut self, fields: &[StructField]) {
        self.out.push('{');
        self.indent += 1;
        for field in fields {
            self.newline();
            self.struct_field(field);
        }
        self.indent -= 1;
        self.newline();
        self.out.push('}');
    }

    fn struct_field(&mut self, field: &StructField) {
        self.qualifiers(&field.ty.qualifiers);
        self.type_specifier(&field.ty.specifier);
        self.out.push(' ');
        self.out.push_str(&field.name);
        self.out.push(';');
    }

    fn block(&mut self, statements: &[Stmt]) {
        self.indent += 1;
        for statement in statements {
            self.newline();
            self.statement(statement);
        }
        self.indent -= 1;
    }

    /// Loop and branch bodies: compound statements stay on the same
    /// line, anything else goes on its own indented line.
    fn embedded(&mut self, statement: &Stmt) {
        if let Stmt::Compound(statements) = statement {
            self.out.push_str(" {");
            self.block(statements);
            self.newline();
            self.out.push('}');
        } else {
            self.indent += 1;
            self.newline();
            self.statement(statement);
            self.indent -= 1;
        }
    }

    fn statement(&mut self, statement: &Stmt) {
        match statement {
            Stmt::Empty => self.out.push(';'),
            Stmt::Compound(statements) => {
                self.out.push('{');
                self.block(statements);
                self.newline();
                self.out.push('}');
            }
            Stmt::Expr(expression) => {
                self.expr(expression, PREC_SEQUENCE);
                self.out.push(';');
            }
            Stmt::Declaration(declaration) => {
                self.declaration(declaration);
                self.out.push(';');
            }
            Stmt::If { condition, then_branch, else_branch } => {
                self.out.push_str("if (");
                self.expr(condition, PREC_SEQUENCE);
                self.out.push(')');
                self.embedded(then_branch);
                if let Some(else_branch) = else_branch {
                    if matches!(**then_branch, Stmt::Compound(_)) {
                        self.out.push(' ');
                    } else {
                        self.newline();
                    }
                    self.out.push_str("else");
                    if matches!(**else_branch, Stmt::If { .. }) {
                        self.out.push(' ');
                        self.statement(else_branch);
                    } else {
                        self.embedded(else_branch);
                    }
                }
            }
            Stmt::Switch { condition, body } => {
                self.out.push_str("switch (");
                self.expr(condition, PREC_SEQUENCE);
                self.out.push_str(") {");
                self.indent += 1;
                for statement in body {
                    if matches!(statement, Stmt::CaseLabel(_)) {
                        self.newline();
                    } else {
                        self.indent += 1;
                        self.newline();
                        self.indent -= 1;
                    }
                    self.statement(statement);
                }
                self.indent -= 1;
                self.newline();
                self.out.push('}');
            }
            Stmt::CaseLabel(Some(label)) => {
                self.out.push_str("case ");
                self.expr(label, PREC_SEQUENCE);
                self.out.push(':');
            }
            Stmt::CaseLabel(None) => self.out.push_str("default:"),
            Stmt::While { condition, body } => {
                self.out.push_str("while (");
                self.expr(condition, PREC_SEQUENCE);
                self.out.push(')');
                self.embedded(body);
            }
            Stmt::DoWhile { body, condition } => {
                self.out.push_str("do");
                self.embedded(body);
                if matches!(**body, Stmt::Compound(_)) {
                    self.out.push(' ');
                } else {
                    self.newline();
                }
                self.out.push_str("while (");
                self.expr(condition, PREC_SEQUENCE);
                self.out.push_str(");");
            }
            Stmt::For { init, condition, update, body } => {
                self.out.push_str("for (");
                match init.as_ref() {
                    Stmt::Empty => self.out.push(';'),
                    Stmt::Declaration(declaration) => {
                        self.declaration(declaration);
                        self.out.push(';');
                    }
                    Stmt::Expr(expression) => {
                        self.expr(expression, PREC_SEQUENCE);
                        self.out.push(';');
                    }
                    // The parser only produces the three arms above.
                    other => self.statement(other),
                }
                if let Some(condition) = condition {
                    self.out.push(' ');
                    self.expr(condition, PREC_SEQUENCE);
                }
                self.out.push(';');
                if let Some(update) = update {
                    self.out.push(' ');
                    self.expr(update, PREC_SEQUENCE);
                }
                self.out.push(')');
                self.embedded(body);
            }
            Stmt::Break => self.out.push_str("break;"),
            Stmt::Continue => self.out.push_str("continue;"),
            Stmt::Discard => self.out.push_str("discard;"),
            Stmt::Return(None) => self.out.push_str("return;"),
            Stmt::Return(Some(value)) => {
                self.out.push_str("return ");
                self.expr(value, PREC_SEQUENCE);
                self.out.push(';');
            }
        }
    }

    fn expr(&mut self, expression: &Expr, min: u8) {
        if precedence(expression) < min {
            self.out.push('(');
            self.expr_inner(expression);
            self.out.push(')');
        } else {
            self.expr_inner(expression);
        }
    }

    fn expr_inner(&mut self, expression: &Expr) {
        match expression {
            Expr::Int { format, value } => self.int_literal(*format, *value as u64),
            Expr::Uint { format, value } => {
                self.int_literal(*format, *value);
                self.out.push('u');
            }
            Expr::Float(value) => {
                let _ = write!(self.out, "{}", format_float(f64::from(*value)));
            }
            Expr::Double(value) => {
                let _ = write!(self.out, "{}lf", format_float(*value));
            }
            Expr::Bool(value) => {
                self.out.push_str(if *value { "true" } else { "false" });
            }
            Expr::Variable(name) => self.out.push_str(name),
            Expr::Constructor(specifier) => self.type_specifier(specifier),
            Expr::Unary { op, operand } if op.is_postfix() => {
                self.expr(operand, PREC_POSTFIX);
                self.out.push_str(op.symbol());
            }
            Expr::Unary { op, operand } => {
                self.out.push_str(op.symbol());
                self.expr(operand, PREC_POSTFIX);
            }
            Expr::Binary { op, left, right } => {
                let prec = binary_precedence(*op);
                self.expr(left, prec);
                let _ = write!(self.out, " {} ", op.symbol());
                self.expr(right, prec + 1);
            }
            Expr::Assign { op, target, value } => {
                self.expr(target, PREC_UNARY);
                let _ = write!(self.out, " {} ", op.symbol());
                self.expr(value, PREC_ASSIGN);
            }
            Expr::Conditional { condition, then_branch, else_branch } => {
                self.expr(condition, PREC_CONDITIONAL + 1);
                self.out.push_str(" ? ");
                self.expr(then_branch, PREC_SEQUENCE);
                self.out.push_str(" : ");
                self.expr(else_branch, PREC_ASSIGN);
            }
            Expr::Call { target, args } => {
                self.expr(target, PREC_POSTFIX);
                self.out.push('(');
                for (position, arg) in args.iter().enumerate() {
                    if position > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(arg, PREC_ASSIGN);
                }
                self.out.push(')');
            }
            Expr::Index { base, index } => {
                self.expr(base, PREC_POSTFIX);
                self.out.push('[');
                self.expr(index, PREC_SEQUENCE);
                self.out.push(']');
            }
            Expr::Field { base, field } => {
                self.expr(base, PREC_POSTFIX);
                self.out.push('.');
                self.out.push_str(field);
            }
            Expr::Sequence(items) => {
                for (position, item) in items.iter().enumerate() {
                    if position > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(item, PREC_ASSIGN);
                }
            }
        }
    }

    fn int_literal(&mut self, format: IntFormat, value: u64) {
        let _ = match format {
            IntFormat::Decimal => write!(self.out, "{value}"),
            IntFormat::Octal if value == 0 => write!(self.out, "0"),
            IntFormat::Octal => write!(self.out, "0{value:o}"),
            IntFormat::Hexadecimal => write!(self.out, "0x{value:X}"),
        };
    }
}

/// Formats a float so it relexes as a floating constant: a bare integer
/// rendering gains a `.0`.
fn format_float(value: f64) -> String {
    let text = format!("{value}");
    if text.contains('.') || text.contains('e') || !value.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}
