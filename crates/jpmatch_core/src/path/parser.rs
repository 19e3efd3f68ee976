//! Recursive-descent parser for brace-delimited path expressions.

use super::ast::{is_identifier_char, CompareOp, FilterExpr, JsonPath, Operand, Segment};
use super::cursor::Cursor;
use super::SyntaxError;
use serde_json::{Number, Value};

type ParseResult<T> = Result<T, SyntaxError>;

/// Parses `{...}` into a [`JsonPath`].
pub(crate) fn parse(expression: &str) -> ParseResult<JsonPath> {
    let mut cur = Cursor::new(expression);
    cur.skip_whitespace();
    if !cur.eat('{') {
        return Err(cur.error("expression must start with '{'"));
    }

    let mut segments = Vec::new();
    let has_root = cur.eat('$');

    // The first segment may be a bare name: {status.replicas}
    if !has_root && matches!(cur.peek(), Some(c) if is_identifier_char(c)) {
        segments.push(Segment::Field(cur.take_while(is_identifier_char).to_string()));
    }

    loop {
        match cur.peek() {
            Some('}') => {
                cur.bump();
                break;
            }
            Some('.') => {
                cur.bump();
                segments.push(parse_dot_member(&mut cur)?);
            }
            Some('[') => segments.push(parse_bracket(&mut cur)?),
            Some(c) => return Err(cur.error(format!("unexpected character '{}'", c))),
            None => return Err(cur.error("unterminated expression: missing '}'")),
        }
    }

    cur.skip_whitespace();
    if !cur.is_at_end() {
        return Err(cur.error("unexpected input after closing '}'"));
    }
    if segments.is_empty() && !has_root {
        return Err(cur.error_at(0, "empty path expression"));
    }

    Ok(JsonPath { segments })
}

fn parse_dot_member(cur: &mut Cursor<'_>) -> ParseResult<Segment> {
    if cur.eat('*') {
        return Ok(Segment::Wildcard);
    }
    let name = cur.take_while(is_identifier_char);
    if name.is_empty() {
        return Err(cur.error("expected field name after '.'"));
    }
    Ok(Segment::Field(name.to_string()))
}

fn parse_bracket(cur: &mut Cursor<'_>) -> ParseResult<Segment> {
    cur.expect('[')?;
    cur.skip_whitespace();

    let segment = match cur.peek() {
        Some('*') => {
            cur.bump();
            Segment::Wildcard
        }
        Some('\'') | Some('"') => Segment::Field(parse_string(cur)?),
        Some('?') => {
            cur.bump();
            cur.skip_whitespace();
            cur.expect('(')?;
            let expr = parse_or(cur)?;
            cur.skip_whitespace();
            cur.expect(')')?;
            Segment::Filter(expr)
        }
        Some(c) if c == '-' || c == ':' || c.is_ascii_digit() => parse_index_or_slice(cur)?,
        Some(c) => {
            return Err(cur.error(format!(
                "expected index, slice, '*', quoted name or filter, found '{}'",
                c
            )))
        }
        None => return Err(cur.error("unterminated '['")),
    };

    cur.skip_whitespace();
    cur.expect(']')?;
    Ok(segment)
}

fn parse_index_or_slice(cur: &mut Cursor<'_>) -> ParseResult<Segment> {
    let start = parse_optional_integer(cur)?;
    cur.skip_whitespace();
    if !cur.eat(':') {
        return match start {
            Some(index) => Ok(Segment::Index(index)),
            None => Err(cur.error("expected array index")),
        };
    }

    cur.skip_whitespace();
    let end = parse_optional_integer(cur)?;
    cur.skip_whitespace();
    let mut step = None;
    if cur.eat(':') {
        cur.skip_whitespace();
        let step_pos = cur.position();
        step = parse_optional_integer(cur)?;
        if step == Some(0) {
            return Err(cur.error_at(step_pos, "slice step cannot be zero"));
        }
    }
    Ok(Segment::Slice { start, end, step })
}

fn parse_optional_integer(cur: &mut Cursor<'_>) -> ParseResult<Option<i64>> {
    let start = cur.position();
    let negative = cur.eat('-');
    let digits = cur.take_while(|c| c.is_ascii_digit());
    if digits.is_empty() {
        if negative {
            return Err(cur.error("expected digits after '-'"));
        }
        return Ok(None);
    }
    let text = if negative {
        format!("-{}", digits)
    } else {
        digits.to_string()
    };
    text.parse::<i64>()
        .map(Some)
        .map_err(|_| cur.error_at(start, "integer out of range"))
}

fn parse_string(cur: &mut Cursor<'_>) -> ParseResult<String> {
    let start = cur.position();
    let quote = match cur.bump() {
        Some(q @ ('\'' | '"')) => q,
        _ => return Err(cur.error_at(start, "expected quoted string")),
    };

    let mut out = String::new();
    loop {
        match cur.bump() {
            Some(c) if c == quote => return Ok(out),
            Some('\\') => {
                let escape_pos = cur.position();
                match cur.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('b') => out.push('\u{8}'),
                    Some('f') => out.push('\u{c}'),
                    Some('u') => out.push(parse_unicode_escape(cur, escape_pos)?),
                    Some(c @ ('\\' | '\'' | '"' | '/')) => out.push(c),
                    Some(c) => {
                        return Err(cur.error_at(escape_pos, format!("invalid escape '\\{}'", c)))
                    }
                    None => break,
                }
            }
            Some(c) => out.push(c),
            None => break,
        }
    }
    Err(cur.error_at(start, "unterminated string literal"))
}

/// Reads the `XXXX` of a `\uXXXX` escape, combining a surrogate pair.
fn parse_unicode_escape(cur: &mut Cursor<'_>, escape_pos: usize) -> ParseResult<char> {
    let high = parse_hex4(cur, escape_pos)?;
    let code = if (0xD800..0xDC00).contains(&high) {
        if !cur.eat_str("\\u") {
            return Err(cur.error_at(escape_pos, "unpaired surrogate in '\\u' escape"));
        }
        let low = parse_hex4(cur, escape_pos)?;
        if !(0xDC00..0xE000).contains(&low) {
            return Err(cur.error_at(escape_pos, "unpaired surrogate in '\\u' escape"));
        }
        0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
    } else {
        high
    };
    char::from_u32(code).ok_or_else(|| cur.error_at(escape_pos, "invalid '\\u' escape"))
}

fn parse_hex4(cur: &mut Cursor<'_>, escape_pos: usize) -> ParseResult<u32> {
    let mut code = 0;
    for _ in 0..4 {
        let digit = cur
            .bump()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| cur.error_at(escape_pos, "expected four hex digits after '\\u'"))?;
        code = code * 16 + digit;
    }
    Ok(code)
}

fn parse_or(cur: &mut Cursor<'_>) -> ParseResult<FilterExpr> {
    let mut left = parse_and(cur)?;
    loop {
        cur.skip_whitespace();
        if !cur.eat_str("||") {
            return Ok(left);
        }
        let right = parse_and(cur)?;
        left = FilterExpr::Or(Box::new(left), Box::new(right));
    }
}

fn parse_and(cur: &mut Cursor<'_>) -> ParseResult<FilterExpr> {
    let mut left = parse_unary(cur)?;
    loop {
        cur.skip_whitespace();
        if !cur.eat_str("&&") {
            return Ok(left);
        }
        let right = parse_unary(cur)?;
        left = FilterExpr::And(Box::new(left), Box::new(right));
    }
}

fn parse_unary(cur: &mut Cursor<'_>) -> ParseResult<FilterExpr> {
    cur.skip_whitespace();
    if cur.peek() == Some('!') && cur.peek_second() != Some('=') {
        cur.bump();
        let inner = parse_unary(cur)?;
        return Ok(FilterExpr::Not(Box::new(inner)));
    }
    if cur.eat('(') {
        let inner = parse_or(cur)?;
        cur.skip_whitespace();
        cur.expect(')')?;
        return Ok(inner);
    }
    parse_comparison(cur)
}

fn parse_comparison(cur: &mut Cursor<'_>) -> ParseResult<FilterExpr> {
    let left_pos = cur.position();
    let left = parse_operand(cur)?;
    cur.skip_whitespace();

    let Some(op) = parse_operator(cur)? else {
        return match left {
            Operand::Current(path) => Ok(FilterExpr::Exists(path)),
            Operand::Literal(_) => {
                Err(cur.error_at(left_pos, "a literal on its own is not a condition"))
            }
        };
    };

    let right = parse_operand(cur)?;
    Ok(FilterExpr::Compare { left, op, right })
}

fn parse_operator(cur: &mut Cursor<'_>) -> ParseResult<Option<CompareOp>> {
    let op = if cur.eat_str("==") {
        CompareOp::Eq
    } else if cur.eat_str("!=") {
        CompareOp::Ne
    } else if cur.eat_str("<=") {
        CompareOp::Le
    } else if cur.eat_str(">=") {
        CompareOp::Ge
    } else if cur.eat('<') {
        CompareOp::Lt
    } else if cur.eat('>') {
        CompareOp::Gt
    } else if cur.peek() == Some('=') {
        return Err(cur.error("use '==' to compare for equality"));
    } else {
        return Ok(None);
    };
    Ok(Some(op))
}

fn parse_operand(cur: &mut Cursor<'_>) -> ParseResult<Operand> {
    cur.skip_whitespace();
    match cur.peek() {
        Some('@') => {
            cur.bump();
            Ok(Operand::Current(parse_relative_path(cur)?))
        }
        Some('\'') | Some('"') => Ok(Operand::Literal(Value::String(parse_string(cur)?))),
        Some(c) if c == '-' || c.is_ascii_digit() => parse_number(cur).map(Operand::Literal),
        Some(c) if c.is_ascii_alphabetic() => {
            let start = cur.position();
            match cur.take_while(|c| c.is_ascii_alphanumeric()) {
                "true" => Ok(Operand::Literal(Value::Bool(true))),
                "false" => Ok(Operand::Literal(Value::Bool(false))),
                "null" => Ok(Operand::Literal(Value::Null)),
                word => Err(cur.error_at(
                    start,
                    format!("unknown literal '{}', relative paths start with '@'", word),
                )),
            }
        }
        Some(c) => Err(cur.error(format!("expected '@' or a literal, found '{}'", c))),
        None => Err(cur.error("unterminated filter")),
    }
}

fn parse_relative_path(cur: &mut Cursor<'_>) -> ParseResult<Vec<Segment>> {
    let mut path = Vec::new();
    loop {
        match cur.peek() {
            Some('.') => {
                cur.bump();
                let name = cur.take_while(is_identifier_char);
                if name.is_empty() {
                    return Err(cur.error("expected field name after '.'"));
                }
                path.push(Segment::Field(name.to_string()));
            }
            Some('[') => {
                cur.bump();
                cur.skip_whitespace();
                let step = match cur.peek() {
                    Some('\'') | Some('"') => Segment::Field(parse_string(cur)?),
                    _ => match parse_optional_integer(cur)? {
                        Some(index) => Segment::Index(index),
                        None => {
                            return Err(
                                cur.error("expected quoted name or index inside a filter path")
                            )
                        }
                    },
                };
                cur.skip_whitespace();
                cur.expect(']')?;
                path.push(step);
            }
            _ => return Ok(path),
        }
    }
}

fn parse_number(cur: &mut Cursor<'_>) -> ParseResult<Value> {
    let start = cur.position();
    let text = cur.take_while(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'));
    if let Ok(i) = text.parse::<i64>() {
        return Ok(Value::Number(i.into()));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| cur.error_at(start, format!("invalid number '{}'", text)))
}
