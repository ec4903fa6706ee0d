//! Conditional-rendering expressions.
//!
//! A deliberately small language, not a general expression evaluator:
//!
//! ```text
//! expr     := or
//! or       := and ( "||" and )*
//! and      := equality ( "&&" equality )*
//! equality := operand ( ( "===" | "!==" ) operand )*
//! operand  := literal | path
//! literal  := JSON number | JSON string | true | false | null
//! path     := segment ( "." segment )*      (a leading `data.` is dropped)
//! ```
//!
//! Grouping, negation, ordering comparisons and arithmetic are rejected at
//! parse time.
//!
//! # Fail-open
//!
//! [`evaluate_condition`] returns `true` for anything it cannot parse,
//! including the empty string, and for any `===`/`!==` whose path operand
//! does not resolve. A broken condition must never hide content.
//! Callers that want the error use [`Condition::parse`] directly.

use std::borrow::Cow;

use serde_json::Value;
use thiserror::Error;

use crate::binding::resolve_binding;
use crate::protocol::JsonMap;

/// Why an expression failed to parse. Positions are byte offsets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("empty condition")]
    Empty,

    #[error("unexpected character `{ch}` at {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unsupported operator `{op}` at {pos}")]
    UnsupportedOperator { op: String, pos: usize },

    #[error("unterminated string starting at {pos}")]
    UnterminatedString { pos: usize },

    #[error("invalid literal `{text}` at {pos}")]
    InvalidLiteral { text: String, pos: usize },

    #[error("invalid path `{path}` at {pos}")]
    InvalidPath { path: String, pos: usize },

    #[error("expected an operand at {pos}")]
    ExpectedOperand { pos: usize },

    #[error("unexpected `{found}` at {pos}")]
    UnexpectedToken { found: String, pos: usize },
}

// ── Tokens ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Eq,
    Ne,
    And,
    Or,
}

impl BinOp {
    const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::Ne => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Op(BinOp),
    Literal(Value),
    Path(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    pos: usize,
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.')
}

fn tokenize(src: &str) -> Result<Vec<Token>, ConditionError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        let rest = &src[pos..];
        let op = if rest.starts_with("===") {
            Some((BinOp::Eq, 3))
        } else if rest.starts_with("!==") {
            Some((BinOp::Ne, 3))
        } else if rest.starts_with("&&") {
            Some((BinOp::And, 2))
        } else if rest.starts_with("||") {
            Some((BinOp::Or, 2))
        } else {
            None
        };
        if let Some((op, len)) = op {
            tokens.push(Token {
                kind: TokenKind::Op(op),
                pos,
            });
            for _ in 0..len {
                chars.next();
            }
            continue;
        }

        match ch {
            '=' | '!' | '&' | '|' | '<' | '>' | '(' | ')' | '+' | '*' | '/' | '%' | '?' | ':' => {
                let len = rest
                    .find(|c: char| !matches!(c, '=' | '!' | '&' | '|' | '<' | '>'))
                    .unwrap_or(rest.len())
                    .max(1);
                return Err(ConditionError::UnsupportedOperator {
                    op: rest[..len].to_string(),
                    pos,
                });
            }
            '"' => {
                let end = find_string_end(bytes, pos)
                    .ok_or(ConditionError::UnterminatedString { pos })?;
                let text = &src[pos..=end];
                let value: String =
                    serde_json::from_str(text).map_err(|_| ConditionError::InvalidLiteral {
                        text: text.to_string(),
                        pos,
                    })?;
                tokens.push(Token {
                    kind: TokenKind::Literal(Value::String(value)),
                    pos,
                });
                while chars.peek().is_some_and(|&(i, _)| i <= end) {
                    chars.next();
                }
            }
            '-' | '0'..='9' => {
                let len = rest
                    .find(|c: char| !(c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')))
                    .unwrap_or(rest.len());
                let text = &rest[..len];
                match serde_json::from_str::<Value>(text) {
                    Ok(number @ Value::Number(_)) => tokens.push(Token {
                        kind: TokenKind::Literal(number),
                        pos,
                    }),
                    _ => {
                        return Err(ConditionError::InvalidLiteral {
                            text: text.to_string(),
                            pos,
                        });
                    }
                }
                for _ in 0..text.chars().count() {
                    chars.next();
                }
            }
            c if is_ident_start(c) => {
                let len = rest
                    .find(|c: char| !is_ident_continue(c))
                    .unwrap_or(rest.len());
                let word = &rest[..len];
                let kind = match word {
                    "true" => TokenKind::Literal(Value::Bool(true)),
                    "false" => TokenKind::Literal(Value::Bool(false)),
                    "null" => TokenKind::Literal(Value::Null),
                    _ => TokenKind::Path(normalize_path(word, pos)?),
                };
                tokens.push(Token { kind, pos });
                for _ in 0..word.chars().count() {
                    chars.next();
                }
            }
            other => return Err(ConditionError::UnexpectedChar { ch: other, pos }),
        }
    }
    Ok(tokens)
}

/// Index of the closing quote of the string opening at `start`.
fn find_string_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

fn normalize_path(word: &str, pos: usize) -> Result<String, ConditionError> {
    let path = word.strip_prefix("data.").unwrap_or(word);
    if path.split('.').any(str::is_empty) {
        return Err(ConditionError::InvalidPath {
            path: word.to_string(),
            pos,
        });
    }
    Ok(path.to_string())
}

// ── AST ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Literal(Value),
    Path(String),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
    end: usize,
}

impl Parser {
    fn peek_op(&self) -> Option<BinOp> {
        match self.tokens.get(self.cursor) {
            Some(Token {
                kind: TokenKind::Op(op),
                ..
            }) => Some(*op),
            _ => None,
        }
    }

    fn parse_expr(&mut self, min_precedence: u8) -> Result<Expr, ConditionError> {
        let mut lhs = self.parse_operand()?;
        while let Some(op) = self.peek_op() {
            if op.precedence() < min_precedence {
                break;
            }
            self.cursor += 1;
            let rhs = self.parse_expr(op.precedence() + 1)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_operand(&mut self) -> Result<Expr, ConditionError> {
        let Some(token) = self.tokens.get(self.cursor) else {
            return Err(ConditionError::ExpectedOperand { pos: self.end });
        };
        let expr = match &token.kind {
            TokenKind::Literal(value) => Expr::Literal(value.clone()),
            TokenKind::Path(path) => Expr::Path(path.clone()),
            TokenKind::Op(_) => return Err(ConditionError::ExpectedOperand { pos: token.pos }),
        };
        self.cursor += 1;
        Ok(expr)
    }
}

// ── Evaluation ───────────────────────────────────────────────────────────

/// `None` is an unresolved path ("undefined").
type Operand<'a> = Option<Cow<'a, Value>>;

fn truthy(value: &Operand<'_>) -> bool {
    match value.as_deref() {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| json_eq(x, y)))
        }
        _ => a == b,
    }
}

/// A path compared with `===`/`!==` that does not resolve.
struct Unresolved;

impl Expr {
    fn eval<'a>(&'a self, data: &'a JsonMap) -> Result<Operand<'a>, Unresolved> {
        match self {
            Self::Literal(value) => Ok(Some(Cow::Borrowed(value))),
            Self::Path(path) => Ok(resolve_binding(data, path).map(Cow::Borrowed)),
            Self::Binary(op, lhs, rhs) => {
                // No short-circuit: an unresolved comparison anywhere counts.
                let (lhs, rhs) = (lhs.eval(data)?, rhs.eval(data)?);
                let result = match op {
                    BinOp::Eq | BinOp::Ne => {
                        let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
                            return Err(Unresolved);
                        };
                        json_eq(&lhs, &rhs) == (*op == BinOp::Eq)
                    }
                    BinOp::And => truthy(&lhs) && truthy(&rhs),
                    BinOp::Or => truthy(&lhs) || truthy(&rhs),
                };
                Ok(Some(Cow::Owned(Value::Bool(result))))
            }
        }
    }
}

/// A parsed condition, reusable across data snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    source: String,
    expr: Expr,
}

impl Condition {
    /// Parse `src` into a condition.
    pub fn parse(src: &str) -> Result<Self, ConditionError> {
        if src.trim().is_empty() {
            return Err(ConditionError::Empty);
        }
        let tokens = tokenize(src)?;
        let mut parser = Parser {
            tokens,
            cursor: 0,
            end: src.len(),
        };
        let expr = parser.parse_expr(1)?;
        if let Some(extra) = parser.tokens.get(parser.cursor) {
            return Err(ConditionError::UnexpectedToken {
                found: src[extra.pos..].split_whitespace().next().unwrap_or("").to_string(),
                pos: extra.pos,
            });
        }
        Ok(Self {
            source: src.to_string(),
            expr,
        })
    }

    /// Original expression text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against a data model.
    ///
    /// A bare missing path is falsy, but an equality whose operand path is
    /// missing makes the whole condition `true`.
    #[must_use]
    pub fn evaluate(&self, data: &JsonMap) -> bool {
        match self.expr.eval(data) {
            Ok(value) => truthy(&value),
            Err(Unresolved) => {
                tracing::warn!(
                    target: "a2ui.condition",
                    expr = %self.source,
                    "comparison against unresolved path; failing open"
                );
                true
            }
        }
    }
}

/// Evaluate `expr` against `data`, rendering (`true`) when the expression
/// cannot be parsed.
#[must_use]
pub fn evaluate_condition(expr: &str, data: &JsonMap) -> bool {
    match Condition::parse(expr) {
        Ok(condition) => condition.evaluate(data),
        Err(error) => {
            tracing::warn!(
                target: "a2ui.condition",
                expr,
                error = %error,
                "condition not evaluable; failing open"
            );
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> JsonMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn equality_against_true() {
        let expr = "data.flag === true";
        assert!(evaluate_condition(expr, &data(json!({"flag": true}))));
        assert!(!evaluate_condition(expr, &data(json!({"flag": false}))));
    }

    #[test]
    fn garbage_fails_open() {
        assert!(evaluate_condition("not a valid $$ expr", &JsonMap::new()));
        assert!(matches!(
            Condition::parse("not a valid $$ expr"),
            Err(ConditionError::UnexpectedChar { ch: '$', pos: 12 })
        ));
        assert!(matches!(
            Condition::parse("not a valid expr"),
            Err(ConditionError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn empty_condition_fails_open() {
        assert!(evaluate_condition("", &JsonMap::new()));
        assert!(evaluate_condition("   ", &JsonMap::new()));
        assert_eq!(Condition::parse(" "), Err(ConditionError::Empty));
    }

    #[test]
    fn bare_path_uses_truthiness() {
        let d = data(json!({"show": 1, "hide": 0, "name": "", "list": [], "nested": {"on": true}}));
        assert!(evaluate_condition("data.show", &d));
        assert!(!evaluate_condition("data.hide", &d));
        assert!(!evaluate_condition("data.name", &d));
        assert!(evaluate_condition("data.list", &d));
        assert!(evaluate_condition("nested.on", &d));
        assert!(!evaluate_condition("data.missing", &d));
    }

    #[test]
    fn inequality_with_strings() {
        let d = data(json!({"status": "open"}));
        assert!(evaluate_condition(r#"data.status !== "done""#, &d));
        assert!(!evaluate_condition(r#"data.status !== "open""#, &d));
    }

    #[test]
    fn numbers_compare_by_value() {
        let d = data(json!({"n": 1}));
        assert!(evaluate_condition("data.n === 1.0", &d));
        assert!(evaluate_condition("data.n !== -2e3", &d));
    }

    #[test]
    fn equality_binds_tighter_than_and() {
        let d = data(json!({"a": 1, "b": "x"}));
        assert!(evaluate_condition(r#"data.a === 1 && data.b === "x""#, &d));
        assert!(!evaluate_condition(r#"data.a === 2 && data.b === "x""#, &d));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let d = data(json!({"a": false, "b": true, "c": false}));
        assert!(!evaluate_condition("data.a || data.b && data.c", &d));
        assert!(evaluate_condition("data.b && data.c || data.b", &d));
    }

    #[test]
    fn comparison_with_missing_path_fails_open() {
        let d = data(json!({"v": null, "flag": false}));
        assert!(evaluate_condition("data.missing === true", &JsonMap::new()));
        assert!(evaluate_condition("data.gone === null", &d));
        assert!(evaluate_condition("data.gone !== null", &d));
        assert!(evaluate_condition("data.flag && data.gone === 1", &d));
        assert!(evaluate_condition("data.v === null", &d));
        assert!(!evaluate_condition("data.v !== null", &d));
    }

    #[test]
    fn unsupported_syntax_is_rejected_and_fails_open() {
        let d = data(json!({"a": false}));
        for expr in ["!data.a", "(data.a)", "data.a == false", "data.a > 1", "'x' === data.a"] {
            assert!(Condition::parse(expr).is_err(), "{expr} should not parse");
            assert!(evaluate_condition(expr, &d), "{expr} should fail open");
        }
    }

    #[test]
    fn dangling_operator_is_an_error() {
        assert_eq!(
            Condition::parse("data.a ==="),
            Err(ConditionError::ExpectedOperand { pos: 10 })
        );
        assert!(matches!(
            Condition::parse("&& data.a"),
            Err(ConditionError::ExpectedOperand { pos: 0 })
        ));
    }

    #[test]
    fn malformed_literals_are_errors() {
        assert!(matches!(
            Condition::parse(r#"data.a === "open"#),
            Err(ConditionError::UnterminatedString { pos: 11 })
        ));
        assert!(matches!(
            Condition::parse("data.a === 1.2.3"),
            Err(ConditionError::InvalidLiteral { .. })
        ));
        assert!(matches!(
            Condition::parse("data..a"),
            Err(ConditionError::InvalidPath { .. })
        ));
    }

    #[test]
    fn escaped_quotes_in_strings() {
        let d = data(json!({"q": "say \"hi\""}));
        assert!(evaluate_condition(r#"data.q === "say \"hi\"""#, &d));
    }

    #[test]
    fn parsed_condition_is_reusable() {
        let condition = Condition::parse("data.count !== 0").unwrap();
        assert_eq!(condition.source(), "data.count !== 0");
        assert!(condition.evaluate(&data(json!({"count": 3}))));
        assert!(!condition.evaluate(&data(json!({"count": 0}))));
    }

    #[test]
    fn kebab_case_keys_are_paths() {
        let d = data(json!({"is-open": true}));
        assert!(evaluate_condition("data.is-open", &d));
    }
}
