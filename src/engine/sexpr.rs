//! Grammar for the engine's printed result line.
//!
//! The interpreter prints each query result as a bracketed list of
//! s-expressions, e.g. `[(APPROVED "OK")]` or `[prop2, prop3]`. This is a
//! small recursive-descent parser over that shape; anything it cannot
//! account for is an [`EngineError::Parse`], never a panic.

use super::{EngineError, EngineValue};
use std::iter::Peekable;
use std::str::Chars;

/// Parse one printed result line into its result rows.
pub fn parse_results(input: &str) -> Result<Vec<EngineValue>, EngineError> {
    let mut parser = Parser {
        chars: input.trim().chars().peekable(),
    };
    parser.expect('[')?;
    let mut rows = Vec::new();
    loop {
        parser.skip_whitespace();
        match parser.chars.peek() {
            Some(']') => {
                parser.chars.next();
                break;
            }
            Some(',') if !rows.is_empty() => {
                parser.chars.next();
            }
            Some(_) => rows.push(parser.value()?),
            None => return Err(EngineError::Parse("unterminated result list".into())),
        }
    }
    parser.skip_whitespace();
    if parser.chars.next().is_some() {
        return Err(EngineError::Parse("trailing input after result list".into()));
    }
    Ok(rows)
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
}

impl Parser<'_> {
    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), EngineError> {
        self.skip_whitespace();
        match self.chars.next() {
            Some(c) if c == expected => Ok(()),
            other => Err(EngineError::Parse(format!(
                "expected '{expected}', found {other:?}"
            ))),
        }
    }

    fn value(&mut self) -> Result<EngineValue, EngineError> {
        self.skip_whitespace();
        match self.chars.peek() {
            Some('(') => self.seq(),
            Some('"') => self.string(),
            Some(_) => self.atom(),
            None => Err(EngineError::Parse("unexpected end of input".into())),
        }
    }

    fn seq(&mut self) -> Result<EngineValue, EngineError> {
        self.chars.next(); // consume '('
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.chars.peek() {
                Some(')') => {
                    self.chars.next();
                    return Ok(EngineValue::Seq(items));
                }
                Some(_) => items.push(self.value()?),
                None => return Err(EngineError::Parse("unterminated expression".into())),
            }
        }
    }

    fn string(&mut self) -> Result<EngineValue, EngineError> {
        self.chars.next(); // consume opening quote
        let mut out = String::new();
        loop {
            match self.chars.next() {
                Some('"') => return Ok(EngineValue::Str(out)),
                Some('\\') => {
                    let escape = self
                        .chars
                        .next()
                        .ok_or_else(|| EngineError::Parse("unterminated escape".into()))?;
                    match escape {
                        '\\' => out.push('\\'),
                        '"' => out.push('"'),
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        other => {
                            return Err(EngineError::Parse(format!(
                                "unsupported escape \\{other}"
                            )))
                        }
                    }
                }
                Some(c) => out.push(c),
                None => return Err(EngineError::Parse("unterminated string".into())),
            }
        }
    }

    fn atom(&mut self) -> Result<EngineValue, EngineError> {
        let mut token = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || matches!(c, '(' | ')' | ',' | ']' | '"') {
                break;
            }
            token.push(c);
            self.chars.next();
        }
        if token.is_empty() {
            return Err(EngineError::Parse("empty atom".into()));
        }
        if let Ok(n) = token.parse::<i64>() {
            return Ok(EngineValue::Int(n));
        }
        if let Ok(n) = token.parse::<f64>() {
            return Ok(EngineValue::Float(n));
        }
        Ok(EngineValue::Sym(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_empty_result() {
        assert_eq!(parse_results("[]").unwrap(), vec![]);
        assert_eq!(parse_results("  [ ]  ").unwrap(), vec![]);
    }

    #[test]
    fn parses_validation_shape() {
        let rows = parse_results(r#"[(APPROVED "All checks passed")]"#).unwrap();
        assert_eq!(
            rows,
            vec![EngineValue::Seq(vec![
                EngineValue::Sym("APPROVED".into()),
                EngineValue::Str("All checks passed".into()),
            ])]
        );
    }

    #[test]
    fn parses_valuation_numbers() {
        let rows = parse_results("[(4500000 5500000.5)]").unwrap();
        assert_eq!(
            rows,
            vec![EngineValue::Seq(vec![
                EngineValue::Int(4_500_000),
                EngineValue::Float(5_500_000.5),
            ])]
        );
    }

    #[test]
    fn parses_comma_separated_rows() {
        let rows = parse_results("[(prop2), (prop3), (prop2)]").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            EngineValue::Seq(vec![EngineValue::Sym("prop2".into())])
        );
    }

    #[test]
    fn parses_nested_sequences() {
        let rows = parse_results("[((a b) c)]").unwrap();
        assert_eq!(
            rows,
            vec![EngineValue::Seq(vec![
                EngineValue::Seq(vec![
                    EngineValue::Sym("a".into()),
                    EngineValue::Sym("b".into()),
                ]),
                EngineValue::Sym("c".into()),
            ])]
        );
    }

    #[test]
    fn parses_escaped_strings() {
        let rows = parse_results(r#"["a\"b\\c"]"#).unwrap();
        assert_eq!(rows, vec![EngineValue::Str(r#"a"b\c"#.into())]);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_results("").is_err());
        assert!(parse_results("[").is_err());
        assert!(parse_results("[(a]").is_err());
        assert!(parse_results(r#"["unterminated]"#).is_err());
        assert!(parse_results("[] trailing").is_err());
        assert!(parse_results(r#"["bad \q escape"]"#).is_err());
    }

    #[test]
    fn negative_numbers_are_atoms() {
        let rows = parse_results("[(-5 -2.5)]").unwrap();
        assert_eq!(
            rows,
            vec![EngineValue::Seq(vec![
                EngineValue::Int(-5),
                EngineValue::Float(-2.5),
            ])]
        );
    }
}
