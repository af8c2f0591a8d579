//! External declarations, types, and qualifiers.

use crate::ast::{
    BuiltinType, Declaration, Declarator, Expr, FunctionHeader, LayoutId, Parameter,
    SpecifiedType, StructField, StructSpecifier, TopLevel, TypeQualifier, TypeSpecifier,
};
use crate::error::SyntaxError;
use crate::parser::{attempt, expr, stmt};
use crate::reader::TokenReader;
use crate::token::TokenKind;

/// Tries the external-declaration alternatives in fixed order.
pub(super) fn parse_top_level(reader: &mut TokenReader) -> Option<TopLevel> {
    if let Some(function) = attempt(reader, parse_function) {
        return Some(function);
    }
    if let Some(declaration) = attempt(reader, parse_variable_declaration) {
        return Some(declaration);
    }
    if let Some(precision) = attempt(reader, parse_precision) {
        return Some(precision);
    }
    if let Some(qualified) = attempt(reader, parse_qualifier_declaration) {
        return Some(qualified);
    }
    None
}

/// Function prototype or definition.
fn parse_function(reader: &mut TokenReader) -> Result<TopLevel, SyntaxError> {
    let header = parse_function_header(reader)?;
    if reader.try_consume(&[TokenKind::Semicolon]) {
        return Ok(TopLevel::Function { header, body: None });
    }
    let body = stmt::parse_compound(reader)?;
    Ok(TopLevel::Function { header, body: Some(body) })
}

fn parse_function_header(reader: &mut TokenReader) -> Result<FunctionHeader, SyntaxError> {
    let return_type = parse_fully_specified_type(reader)?;
    let name = reader.consume_identifier()?;
    reader.consume(TokenKind::LeftParen)?;

    let mut parameters = Vec::new();
    if !reader.try_consume(&[TokenKind::RightParen])
        && !reader.try_consume(&[TokenKind::Type(BuiltinType::Void), TokenKind::RightParen])
    {
        loop {
            parameters.push(parse_parameter(reader)?);
            if !reader.try_consume(&[TokenKind::Comma]) {
                break;
            }
        }
        reader.consume(TokenKind::RightParen)?;
    }

    Ok(FunctionHeader { return_type, name, parameters })
}

fn parse_parameter(reader: &mut TokenReader) -> Result<Parameter, SyntaxError> {
    let mut ty = parse_fully_specified_type(reader)?;
    let name = if reader.can_consume(TokenKind::Identifier) {
        Some(reader.consume_identifier()?)
    } else {
        None
    };
    // An array suffix on the parameter name wraps the parameter type.
    let sizes = parse_array_suffixes(reader)?;
    ty.specifier = ty.specifier.with_arrays(sizes);
    Ok(Parameter { ty, name })
}

fn parse_variable_declaration(reader: &mut TokenReader) -> Result<TopLevel, SyntaxError> {
    let declaration = parse_declaration_body(reader)?;
    if declaration.declarators.is_empty() {
        return match declaration.ty.specifier {
            TypeSpecifier::Struct(spec) => Ok(TopLevel::Struct(spec)),
            _ => Err(reader.error("Expected declarator")),
        };
    }
    Ok(TopLevel::Variable(declaration))
}

/// `type declarator (, declarator)* ;` — shared between file scope and
/// statement scope. Declarators keep their own array suffixes and
/// initializers.
pub(super) fn parse_declaration_body(reader: &mut TokenReader) -> Result<Declaration, SyntaxError> {
    let ty = parse_fully_specified_type(reader)?;
    if reader.try_consume(&[TokenKind::Semicolon]) {
        return Ok(Declaration { ty, declarators: Vec::new() });
    }

    let mut declarators = Vec::new();
    loop {
        let name = reader.consume_identifier()?;
        let arrays = parse_array_suffixes(reader)?;
        let init = if reader.try_consume(&[TokenKind::Equal]) {
            Some(expr::parse_assignment(reader)?)
        } else {
            None
        };
        declarators.push(Declarator { name, arrays, init });
        if !reader.try_consume(&[TokenKind::Comma]) {
            break;
        }
    }
    reader.consume(TokenKind::Semicolon)?;
    Ok(Declaration { ty, declarators })
}

fn parse_precision(reader: &mut TokenReader) -> Result<TopLevel, SyntaxError> {
    reader.consume(TokenKind::Precision)?;
    let Some(TokenKind::PrecisionQualifier(precision)) = reader.peek_kind(0) else {
        return Err(reader.error("Expected precision qualifier"));
    };
    reader.skip();
    let specifier = parse_type_specifier(reader)?;
    reader.consume(TokenKind::Semicolon)?;
    Ok(TopLevel::Precision { precision, specifier })
}

/// Qualifier-led declarations: interface blocks, bare qualifier
/// statements like `invariant gl_Position;`, and `layout(...) in;`.
fn parse_qualifier_declaration(reader: &mut TokenReader) -> Result<TopLevel, SyntaxError> {
    let qualifiers = parse_type_qualifiers(reader)?;
    if qualifiers.is_empty() {
        return Err(reader.error("Expected qualifier"));
    }
    if reader.try_consume(&[TokenKind::Semicolon]) {
        return Ok(TopLevel::QualifierOnly { qualifiers, names: Vec::new() });
    }

    let name = reader.consume_identifier()?;
    if reader.try_consume(&[TokenKind::LeftBrace]) {
        let fields = parse_struct_fields(reader)?;
        let instance = if reader.can_consume(TokenKind::Identifier) {
            let instance_name = reader.consume_identifier()?;
            let arrays = parse_array_suffixes(reader)?;
            Some(Declarator { name: instance_name, arrays, init: None })
        } else {
            None
        };
        reader.consume(TokenKind::Semicolon)?;
        return Ok(TopLevel::InterfaceBlock { qualifiers, name, fields, instance });
    }

    let mut names = vec![name];
    while reader.try_consume(&[TokenKind::Comma]) {
        names.push(reader.consume_identifier()?);
    }
    reader.consume(TokenKind::Semicolon)?;
    Ok(TopLevel::QualifierOnly { qualifiers, names })
}

pub(super) fn parse_fully_specified_type(
    reader: &mut TokenReader,
) -> Result<SpecifiedType, SyntaxError> {
    let qualifiers = parse_type_qualifiers(reader)?;
    let specifier = parse_type_specifier(reader)?;
    Ok(SpecifiedType::new(qualifiers, specifier))
}

pub(super) fn parse_type_qualifiers(
    reader: &mut TokenReader,
) -> Result<Vec<TypeQualifier>, SyntaxError> {
    let mut qualifiers = Vec::new();
    loop {
        match reader.peek_kind(0) {
            Some(TokenKind::Storage(storage)) => {
                reader.skip();
                qualifiers.push(TypeQualifier::Storage(storage));
            }
            Some(TokenKind::Interpolation(interpolation)) => {
                reader.skip();
                qualifiers.push(TypeQualifier::Interpolation(interpolation));
            }
            Some(TokenKind::PrecisionQualifier(precision)) => {
                reader.skip();
                qualifiers.push(TypeQualifier::Precision(precision));
            }
            Some(TokenKind::Invariant) => {
                reader.skip();
                qualifiers.push(TypeQualifier::Invariant);
            }
            Some(TokenKind::Precise) => {
                reader.skip();
                qualifiers.push(TypeQualifier::Precise);
            }
            Some(TokenKind::Layout) => qualifiers.push(parse_layout(reader)?),
            Some(TokenKind::Subroutine) => qualifiers.push(parse_subroutine(reader)?),
            _ => break,
        }
    }
    Ok(qualifiers)
}

fn parse_layout(reader: &mut TokenReader) -> Result<TypeQualifier, SyntaxError> {
    reader.consume(TokenKind::Layout)?;
    reader.consume(TokenKind::LeftParen)?;
    let mut ids = Vec::new();
    loop {
        // `shared` lexes as a storage keyword but is a layout id here.
        if reader.try_consume(&[TokenKind::Storage(crate::ast::StorageQualifier::Shared)]) {
            ids.push(LayoutId::shared());
        } else {
            let name = reader.consume_identifier()?;
            let value = if reader.try_consume(&[TokenKind::Equal]) {
                Some(expr::parse_conditional(reader)?)
            } else {
                None
            };
            ids.push(LayoutId::new(name, value));
        }
        if !reader.try_consume(&[TokenKind::Comma]) {
            break;
        }
    }
    reader.consume(TokenKind::RightParen)?;
    Ok(TypeQualifier::Layout(ids))
}

fn parse_subroutine(reader: &mut TokenReader) -> Result<TypeQualifier, SyntaxError> {
    reader.consume(TokenKind::Subroutine)?;
    let mut type_names = Vec::new();
    if reader.try_consume(&[TokenKind::LeftParen]) {
        loop {
            type_names.push(reader.consume_identifier()?);
            if !reader.try_consume(&[TokenKind::Comma]) {
                break;
            }
        }
        reader.consume(TokenKind::RightParen)?;
    }
    Ok(TypeQualifier::Subroutine(type_names))
}

pub(super) fn parse_type_specifier(reader: &mut TokenReader) -> Result<TypeSpecifier, SyntaxError> {
    let base = match reader.peek_kind(0) {
        Some(TokenKind::Type(builtin)) => {
            reader.skip();
            TypeSpecifier::Builtin(builtin)
        }
        Some(TokenKind::Struct) => TypeSpecifier::Struct(parse_struct_specifier(reader)?),
        Some(TokenKind::Identifier) => TypeSpecifier::Named(reader.consume_identifier()?),
        _ => return Err(reader.error("Expected type specifier")),
    };
    let sizes = parse_array_suffixes(reader)?;
    Ok(base.with_arrays(sizes))
}

/// Zero or more `[size?]` suffixes, outermost first.
pub(super) fn parse_array_suffixes(
    reader: &mut TokenReader,
) -> Result<Vec<Option<Expr>>, SyntaxError> {
    let mut sizes = Vec::new();
    while reader.try_consume(&[TokenKind::LeftBracket]) {
        if reader.try_consume(&[TokenKind::RightBracket]) {
            sizes.push(None);
            continue;
        }
        let size = expr::parse_conditional(reader)?;
        reader.consume(TokenKind::RightBracket)?;
        sizes.push(Some(size));
    }
    Ok(sizes)
}

fn parse_struct_specifier(reader: &mut TokenReader) -> Result<StructSpecifier, SyntaxError> {
    reader.consume(TokenKind::Struct)?;
    let name = if reader.can_consume(TokenKind::Identifier) {
        Some(reader.consume_identifier()?)
    } else {
        None
    };
    reader.consume(TokenKind::LeftBrace)?;
    let fields = parse_struct_fields(reader)?;
    Ok(StructSpecifier { name, fields })
}

/// Field lines up to and including the closing brace. Multi-declarator
/// lines expand into one field per declarator, each with its own array
/// suffix folded into the field type.
pub(super) fn parse_struct_fields(
    reader: &mut TokenReader,
) -> Result<Vec<StructField>, SyntaxError> {
    let mut fields = Vec::new();
    while !reader.try_consume(&[TokenKind::RightBrace]) {
        let ty = parse_fully_specified_type(reader)?;
        loop {
            let name = reader.consume_identifier()?;
            let sizes = parse_array_suffixes(reader)?;
            fields.push(StructField {
                ty: SpecifiedType::new(ty.qualifiers.clone(), ty.specifier.clone().with_arrays(sizes)),
                name,
            });
            if !reader.try_consume(&[TokenKind::Comma]) {
                break;
            }
        }
        reader.consume(TokenKind::Semicolon)?;
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{IntFormat, StorageQualifier};
    use crate::lexer::tokenize;
    use crate::parser::parse;
    use crate::token::Token;

    fn reader_for(tokens: &[Token]) -> TokenReader<'_> {
        TokenReader::new(tokens)
    }

    #[test]
    fn multi_declarator_lists_are_independent() {
        let tree = parse("float a, b = 1.0, c[2];").expect("parse");
        let crate::ast::TopLevel::Variable(declaration) = &tree.body[0] else {
            panic!("expected variable");
        };
        let declarators = &declaration.declarators;
        assert_eq!(declarators.len(), 3);
        assert_eq!(declarators[0], Declarator::named("a"));
        assert!(declarators[1].init.is_some());
        assert!(declarators[1].arrays.is_empty());
        assert!(declarators[2].init.is_none());
        assert_eq!(declarators[2].arrays.len(), 1);
    }

    #[test]
    fn interface_block_with_instance_name() {
        let tree = parse("uniform CameraMatrices { mat4 view; mat4 projection; } camera;")
            .expect("parse");
        let crate::ast::TopLevel::InterfaceBlock { qualifiers, name, fields, instance } =
            &tree.body[0]
        else {
            panic!("expected interface block");
        };
        assert_eq!(
            qualifiers,
            &vec![TypeQualifier::Storage(StorageQualifier::Uniform)]
        );
        assert_eq!(name, "CameraMatrices");
        assert_eq!(fields.len(), 2);
        assert_eq!(instance.as_ref().map(|i| i.name.as_str()), Some("camera"));
    }

    #[test]
    fn bare_qualifier_declaration() {
        let tree = parse("invariant gl_Position;").expect("parse");
        let crate::ast::TopLevel::QualifierOnly { qualifiers, names } = &tree.body[0] else {
            panic!("expected qualifier declaration");
        };
        assert_eq!(qualifiers, &vec![TypeQualifier::Invariant]);
        assert_eq!(names, &vec!["gl_Position".to_string()]);
    }

    #[test]
    fn layout_ids_with_and_without_values() {
        let tokens = tokenize("layout(std140, binding = 2, shared)").expect("tokenize");
        let mut reader = reader_for(&tokens);
        let TypeQualifier::Layout(ids) = parse_layout(&mut reader).expect("parse") else {
            panic!("expected layout");
        };
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[0].name, "std140");
        assert!(ids[0].value.is_none());
        assert_eq!(ids[1].name, "binding");
        assert_eq!(ids[1].value.as_ref().and_then(Expr::as_const_int), Some(2));
        assert_eq!(ids[2].name, "shared");
    }

    #[test]
    fn failed_alternatives_restore_the_cursor() {
        let tokens = tokenize("uniform float a;").expect("tokenize");
        let mut reader = reader_for(&tokens);
        // Not a function: the attempt must rewind to token zero.
        assert!(attempt(&mut reader, parse_function).is_none());
        assert_eq!(reader.cursor(), 0);
        assert!(attempt(&mut reader, parse_variable_declaration).is_some());
    }

    #[test]
    fn function_prototype_and_definition() {
        let tree = parse("float square(float x);\nfloat square(float x) { return x * x; }")
            .expect("parse");
        assert!(matches!(
            &tree.body[0],
            TopLevel::Function { body: None, .. }
        ));
        assert!(matches!(
            &tree.body[1],
            TopLevel::Function { body: Some(_), .. }
        ));
    }

    #[test]
    fn void_parameter_list_is_empty() {
        let tree = parse("void main(void) {}").expect("parse");
        let TopLevel::Function { header, .. } = &tree.body[0] else {
            panic!("expected function");
        };
        assert!(header.parameters.is_empty());
    }

    #[test]
    fn struct_declaration_and_usage() {
        let tree = parse("struct Light { vec3 position; float intensity, range; };")
            .expect("parse");
        let TopLevel::Struct(spec) = &tree.body[0] else {
            panic!("expected struct");
        };
        assert_eq!(spec.name.as_deref(), Some("Light"));
        assert_eq!(spec.fields.len(), 3);
        assert_eq!(spec.fields[1].name, "intensity");
        assert_eq!(spec.fields[2].name, "range");
    }

    #[test]
    fn array_specifier_on_type_wraps_right_to_left() {
        let tree = parse("float[2][3] grid;").expect("parse");
        let TopLevel::Variable(declaration) = &tree.body[0] else {
            panic!("expected variable");
        };
        let TypeSpecifier::Array { size, element } = &declaration.ty.specifier else {
            panic!("expected array");
        };
        assert_eq!(size.as_deref().and_then(Expr::as_const_int), Some(2));
        assert!(matches!(element.as_ref(), TypeSpecifier::Array { .. }));
    }

    #[test]
    fn uint_initializers_keep_their_format() {
        let tree = parse("uint mask = 0x1Fu;").expect("parse");
        let TopLevel::Variable(declaration) = &tree.body[0] else {
            panic!("expected variable");
        };
        assert_eq!(
            declaration.declarators[0].init,
            Some(Expr::Uint { format: IntFormat::Hexadecimal, value: 31 })
        );
    }
}
