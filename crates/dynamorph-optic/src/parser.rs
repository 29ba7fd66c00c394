//! Recursive-descent parser for the path-string syntax (spec §6.2).
//!
//! Mirrors [`crate::node::Node`]'s `Display` impl in reverse: every string a
//! `Node`/`DynamicOptic` renders to is accepted back by [`parse`].

use crate::node::{Node, ShapePattern};
use crate::optic::DynamicOptic;
use dynamorph_value::{DynamicValue, PrimitiveValue};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected end of path at position {0}")]
    UnexpectedEof(usize),
    #[error("unexpected character '{found}' at position {pos}, expected {expected}")]
    Unexpected { pos: usize, found: char, expected: String },
    #[error("invalid number at position {0}")]
    InvalidNumber(usize),
    #[error("unterminated string literal starting at position {0}")]
    UnterminatedString(usize),
}

pub fn parse(input: &str) -> Result<DynamicOptic, ParseError> {
    let mut p = Parser {
        chars: input.chars().collect(),
        pos: 0,
    };
    let mut nodes = Vec::new();
    while !p.at_end() {
        nodes.push(p.parse_node()?);
    }
    Ok(DynamicOptic(nodes))
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn expect(&mut self, c: char) -> Result<(), ParseError> {
        match self.bump() {
            Some(found) if found == c => Ok(()),
            Some(found) => Err(ParseError::Unexpected {
                pos: self.pos - 1,
                found,
                expected: c.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof(self.pos)),
        }
    }

    fn parse_node(&mut self) -> Result<Node, ParseError> {
        match self.peek() {
            Some('.') => {
                self.bump();
                Ok(Node::Field(self.parse_identifier()?))
            }
            Some('/') => {
                self.bump();
                Ok(Node::Case(self.parse_identifier()?))
            }
            Some('~') => {
                self.bump();
                Ok(Node::Wrapped)
            }
            Some('[') => self.parse_bracket(),
            Some('@') => self.parse_at(),
            Some('#') => self.parse_hash(),
            Some(c) => Err(ParseError::Unexpected {
                pos: self.pos,
                found: c,
                expected: "one of '.', '/', '[', '@', '#', '~'".into(),
            }),
            None => Err(ParseError::UnexpectedEof(self.pos)),
        }
    }

    fn parse_identifier(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.bump();
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(match self.peek() {
                Some(c) => ParseError::Unexpected {
                    pos: self.pos,
                    found: c,
                    expected: "identifier".into(),
                },
                None => ParseError::UnexpectedEof(self.pos),
            });
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_number(&mut self) -> Result<usize, ParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        if self.pos == start {
            return Err(ParseError::InvalidNumber(self.pos));
        }
        let s: String = self.chars[start..self.pos].iter().collect();
        s.parse().map_err(|_| ParseError::InvalidNumber(start))
    }

    // `[i]`, `[i,j,k]`, or `[*]`.
    fn parse_bracket(&mut self) -> Result<Node, ParseError> {
        self.expect('[')?;
        if self.peek() == Some('*') {
            self.bump();
            self.expect(']')?;
            return Ok(Node::Elements);
        }
        let mut indices = vec![self.parse_number()?];
        while self.peek() == Some(',') {
            self.bump();
            indices.push(self.parse_number()?);
        }
        self.expect(']')?;
        if indices.len() == 1 {
            Ok(Node::AtIndex(indices[0]))
        } else {
            Ok(Node::AtIndices(indices))
        }
    }

    // `@"key"`, `@keys`, `@values`, or `@[k1,k2]`.
    fn parse_at(&mut self) -> Result<Node, ParseError> {
        self.expect('@')?;
        match self.peek() {
            Some('[') => {
                self.bump();
                let mut keys = vec![self.parse_key()?];
                while self.peek() == Some(',') {
                    self.bump();
                    keys.push(self.parse_key()?);
                }
                self.expect(']')?;
                Ok(Node::AtMapKeys(keys))
            }
            Some(c) if c.is_alphabetic() => {
                let ident = self.parse_identifier()?;
                match ident.as_str() {
                    "keys" => Ok(Node::MapKeys),
                    "values" => Ok(Node::MapValues),
                    _ => Err(ParseError::Unexpected {
                        pos: self.pos,
                        found: ident.chars().next().unwrap_or(' '),
                        expected: "'keys' or 'values'".into(),
                    }),
                }
            }
            _ => Ok(Node::AtMapKey(self.parse_key()?)),
        }
    }

    fn parse_key(&mut self) -> Result<DynamicValue, ParseError> {
        match self.peek() {
            Some('"') => {
                let s = self.parse_string_literal()?;
                Ok(DynamicValue::Primitive(PrimitiveValue::String(s)))
            }
            Some('\'') => {
                self.bump();
                let c = self.bump().ok_or(ParseError::UnexpectedEof(self.pos))?;
                self.expect('\'')?;
                Ok(DynamicValue::Primitive(PrimitiveValue::Char(c)))
            }
            Some(c) if c.is_ascii_digit() || c == '-' => {
                let n = self.parse_signed_integer()?;
                Ok(DynamicValue::i64(n))
            }
            Some(_) => {
                let ident = self.parse_identifier()?;
                match ident.as_str() {
                    "true" => Ok(DynamicValue::bool(true)),
                    "false" => Ok(DynamicValue::bool(false)),
                    _ => Err(ParseError::Unexpected {
                        pos: self.pos,
                        found: ident.chars().next().unwrap_or(' '),
                        expected: "a map key literal".into(),
                    }),
                }
            }
            None => Err(ParseError::UnexpectedEof(self.pos)),
        }
    }

    fn parse_signed_integer(&mut self) -> Result<i64, ParseError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        let s: String = self.chars[start..self.pos].iter().collect();
        s.parse().map_err(|_| ParseError::InvalidNumber(start))
    }

    fn parse_string_literal(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('"') => out.push('"'),
                    Some('\\') => out.push('\\'),
                    Some('b') => out.push('\u{8}'),
                    Some('f') => out.push('\u{c}'),
                    Some('n') => out.push('\n'),
                    Some('r') => out.push('\r'),
                    Some('t') => out.push('\t'),
                    Some('u') => {
                        let mut code = 0u32;
                        for _ in 0..4 {
                            let c = self.bump().ok_or(ParseError::UnterminatedString(start))?;
                            code = code * 16 + c.to_digit(16).ok_or(ParseError::UnterminatedString(start))?;
                        }
                        out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
                    }
                    Some(_) | None => return Err(ParseError::UnterminatedString(start)),
                },
                Some(c) => out.push(c),
                None => return Err(ParseError::UnterminatedString(start)),
            }
        }
    }

    // `#{pattern}` (a shape pattern) or `#TypeName` (a nominal type search).
    fn parse_hash(&mut self) -> Result<Node, ParseError> {
        self.expect('#')?;
        match self.peek() {
            Some('{') | Some('[') | Some('<') | Some('*') => Ok(Node::SearchSchema(self.parse_shape_pattern()?)),
            _ => Ok(Node::TypeSearch(self.parse_identifier()?)),
        }
    }

    fn parse_shape_pattern(&mut self) -> Result<ShapePattern, ParseError> {
        let base = match self.peek() {
            Some('*') => {
                self.bump();
                ShapePattern::Wildcard
            }
            Some('<') => {
                self.bump();
                let mut cases = vec![self.parse_identifier()?];
                while self.peek() == Some('|') {
                    self.bump();
                    cases.push(self.parse_identifier()?);
                }
                self.expect('>')?;
                ShapePattern::Variant(cases)
            }
            Some('[') => {
                self.bump();
                let inner = self.parse_shape_pattern()?;
                self.expect(']')?;
                ShapePattern::Sequence(Box::new(inner))
            }
            Some('{') => {
                self.bump();
                self.parse_brace_body()?
            }
            Some(_) => ShapePattern::Primitive(self.parse_identifier()?),
            None => return Err(ParseError::UnexpectedEof(self.pos)),
        };
        if self.peek() == Some('?') {
            self.bump();
            Ok(ShapePattern::Optional(Box::new(base)))
        } else {
            Ok(base)
        }
    }

    // Disambiguates `{field:pattern,...}` (a record pattern) from
    // `{keyPattern:valuePattern}` (a map pattern) by checking whether the
    // first segment before `:` parses as a bare identifier followed
    // immediately by `:` and another identifier-led pattern, vs. a pattern
    // expression. Record fields are always plain identifiers; map key
    // patterns are themselves shape patterns and may start with punctuation.
    fn parse_brace_body(&mut self) -> Result<ShapePattern, ParseError> {
        if self.peek() == Some('}') {
            self.bump();
            return Ok(ShapePattern::Record(Vec::new()));
        }
        let checkpoint = self.pos;
        if let Ok(name) = self.parse_identifier() {
            if self.peek() == Some(':') {
                self.bump();
                let mut fields = vec![(name, self.parse_shape_pattern()?)];
                while self.peek() == Some(',') {
                    self.bump();
                    let n = self.parse_identifier()?;
                    self.expect(':')?;
                    fields.push((n, self.parse_shape_pattern()?));
                }
                self.expect('}')?;
                return Ok(ShapePattern::Record(fields));
            }
        }
        self.pos = checkpoint;
        let key = self.parse_shape_pattern()?;
        self.expect(':')?;
        let value = self.parse_shape_pattern()?;
        self.expect('}')?;
        Ok(ShapePattern::Map(Box::new(key), Box::new(value)))
    }
}

impl std::str::FromStr for DynamicOptic {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_chain() {
        let optic = parse(".customer.address").unwrap();
        assert_eq!(
            optic.nodes(),
            &[Node::Field("customer".into()), Node::Field("address".into())]
        );
    }

    #[test]
    fn parses_index_and_elements() {
        let optic = parse("[2][*]").unwrap();
        assert_eq!(optic.nodes(), &[Node::AtIndex(2), Node::Elements]);
    }

    #[test]
    fn parses_multi_index() {
        let optic = parse("[0,2,4]").unwrap();
        assert_eq!(optic.nodes(), &[Node::AtIndices(vec![0, 2, 4])]);
    }

    #[test]
    fn parses_case_and_wrapped() {
        let optic = parse("/Active~").unwrap();
        assert_eq!(optic.nodes(), &[Node::Case("Active".into()), Node::Wrapped]);
    }

    #[test]
    fn parses_string_map_key_with_escapes() {
        let optic = parse("@\"a\\\"b\"").unwrap();
        assert_eq!(
            optic.nodes(),
            &[Node::AtMapKey(DynamicValue::Primitive(PrimitiveValue::String("a\"b".into())))]
        );
    }

    #[test]
    fn parses_map_keys_and_values() {
        assert_eq!(parse("@keys").unwrap().nodes(), &[Node::MapKeys]);
        assert_eq!(parse("@values").unwrap().nodes(), &[Node::MapValues]);
    }

    #[test]
    fn parses_type_search_and_round_trips() {
        let optic = parse("#Customer").unwrap();
        assert_eq!(optic.nodes(), &[Node::TypeSearch("Customer".into())]);
        assert_eq!(optic.render(), "#Customer");
    }

    #[test]
    fn parses_shape_pattern_record() {
        let optic = parse("#{age:i32,name:string}").unwrap();
        match &optic.nodes()[0] {
            Node::SearchSchema(ShapePattern::Record(fields)) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].0, "age");
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn round_trips_complex_path() {
        let path = ".a.b[3]/Case~";
        let optic = parse(path).unwrap();
        assert_eq!(optic.render(), path);
    }
}
