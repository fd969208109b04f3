use crate::diagnostics::TypeSyntaxError;
use crate::lexer::{self, token::Token};
use crate::span::{Span, Spanned};
use crate::types::Type;

/// Parse a type from its textual form, e.g. `Query<Models.ItemFrom>` or `long?`.
pub fn parse_type(source: &str) -> Result<Type, TypeSyntaxError> {
    let tokens = lexer::lex(source)?;
    let mut parser = Parser::new(&tokens, source);
    let ty = parser.parse_type()?;
    if let Some(tok) = parser.peek() {
        return Err(TypeSyntaxError::new(
            format!("unexpected {} after type", tok.node),
            tok.span,
        ));
    }
    Ok(ty)
}

pub struct Parser<'a> {
    tokens: &'a [Spanned<Token>],
    source: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Spanned<Token>], source: &'a str) -> Self {
        Self { tokens, source, pos: 0 }
    }

    fn peek(&self) -> Option<&Spanned<Token>> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek().is_some_and(|t| &t.node == expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<&Spanned<Token>, TypeSyntaxError> {
        let eof = self.eof_span();
        match self.tokens.get(self.pos) {
            Some(tok) if &tok.node == expected => {
                self.pos += 1;
                Ok(&self.tokens[self.pos - 1])
            }
            Some(tok) => Err(TypeSyntaxError::new(
                format!("expected {expected}, found {}", tok.node),
                tok.span,
            )),
            None => Err(TypeSyntaxError::new(
                format!("expected {expected}, found end of input"),
                eof,
            )),
        }
    }

    fn eof_span(&self) -> Span {
        Span::new(self.source.len(), self.source.len())
    }

    pub fn parse_type(&mut self) -> Result<Type, TypeSyntaxError> {
        let name_span = self.expect(&Token::Ident)?.span;
        let name = self.source[name_span.range()].to_string();

        let mut ty = if self.eat(&Token::Lt) {
            let mut args = vec![self.parse_type()?];
            while self.eat(&Token::Comma) {
                args.push(self.parse_type()?);
            }
            self.expect(&Token::Gt)?;
            Type::Generic(name, args)
        } else {
            Type::Named(name)
        };

        if self.eat(&Token::Question) {
            ty = Type::nullable(ty);
            if let Some(tok) = self.peek().filter(|t| t.node == Token::Question) {
                return Err(TypeSyntaxError::new("nested nullable is not allowed", tok.span));
            }
        }
        Ok(ty)
    }
}
