//! Numeric literal scanner.
//!
//! Numeric constants are scanned by hand before the lexer consults its
//! token table, because the radix prefixes and type suffixes interact:
//! `0x1Fu` is one uint token while `5.0e-3f` is one float token, and a
//! digit sequence with no `.` or exponent must fall through to the
//! integer rules.

use crate::ast::IntFormat;
use crate::token::TokenKind;

/// Scans a numeric constant starting at byte `start`. Returns the token
/// kind and the end offset of the consumed text, or `None` if the input
/// does not start with a numeric constant.
pub(crate) fn scan(source: &str, start: usize) -> Option<(TokenKind, usize)> {
    let bytes = source.as_bytes();
    if start >= bytes.len() {
        return None;
    }
    scan_float(bytes, start).or_else(|| scan_integer(bytes, start))
}

fn digits_end(bytes: &[u8], mut index: usize) -> usize {
    while index < bytes.len() && bytes[index].is_ascii_digit() {
        index += 1;
    }
    index
}

// floating grammar:
//   digits . digits? exponent? suffix?
//   . digits exponent? suffix?
//   digits exponent suffix?
fn scan_float(bytes: &[u8], start: usize) -> Option<(TokenKind, usize)> {
    let integer_end = digits_end(bytes, start);
    let has_integer = integer_end > start;
    let mut end = integer_end;

    let mut has_fraction = false;
    if end < bytes.len() && bytes[end] == b'.' {
        let fraction_end = digits_end(bytes, end + 1);
        if has_integer || fraction_end > end + 1 {
            has_fraction = true;
            end = fraction_end;
        }
    }
    if !has_integer && !has_fraction {
        return None;
    }

    let exponent_end = scan_exponent(bytes, end);
    if !has_fraction && exponent_end == end {
        return None;
    }
    end = exponent_end;

    if end < bytes.len() && (bytes[end] == b'f' || bytes[end] == b'F') {
        return Some((TokenKind::FloatConstant, end + 1));
    }
    if end + 1 < bytes.len() {
        let suffix = (bytes[end], bytes[end + 1]);
        if suffix == (b'l', b'f') || suffix == (b'L', b'F') {
            return Some((TokenKind::DoubleConstant, end + 2));
        }
    }
    Some((TokenKind::FloatConstant, end))
}

/// Returns the end of an `e[+-]?digits` exponent, or `index` unchanged
/// if there is no complete exponent here.
fn scan_exponent(bytes: &[u8], index: usize) -> usize {
    if index >= bytes.len() || (bytes[index] != b'e' && bytes[index] != b'E') {
        return index;
    }
    let mut cursor = index + 1;
    if cursor < bytes.len() && (bytes[cursor] == b'+' || bytes[cursor] == b'-') {
        cursor += 1;
    }
    let end = digits_end(bytes, cursor);
    if end == cursor { index } else { end }
}

fn scan_integer(bytes: &[u8], start: usize) -> Option<(TokenKind, usize)> {
    let (format, mut end) = if bytes[start] == b'0' {
        if start + 1 < bytes.len() && (bytes[start + 1] == b'x' || bytes[start + 1] == b'X') {
            let hex_end = hex_digits_end(bytes, start + 2);
            if hex_end == start + 2 {
                // A lone "0x" is not a constant; take the zero by itself.
                return Some((TokenKind::IntConstant(IntFormat::Octal), start + 1));
            }
            (IntFormat::Hexadecimal, hex_end)
        } else {
            (IntFormat::Octal, octal_digits_end(bytes, start + 1))
        }
    } else if bytes[start].is_ascii_digit() {
        (IntFormat::Decimal, digits_end(bytes, start))
    } else {
        return None;
    };

    if end < bytes.len() && (bytes[end] == b'u' || bytes[end] == b'U') {
        end += 1;
        Some((TokenKind::UintConstant(format), end))
    } else {
        Some((TokenKind::IntConstant(format), end))
    }
}

fn hex_digits_end(bytes: &[u8], mut index: usize) -> usize {
    while index < bytes.len() && bytes[index].is_ascii_hexdigit() {
        index += 1;
    }
    index
}

fn octal_digits_end(bytes: &[u8], mut index: usize) -> usize {
    while index < bytes.len() && (b'0'..=b'7').contains(&bytes[index]) {
        index += 1;
    }
    index
}
