pub mod token;

use logos::Logos;
use crate::span::{Span, Spanned};
use crate::diagnostics::TypeSyntaxError;
use token::Token;

pub fn lex(source: &str) -> Result<Vec<Spanned<Token>>, TypeSyntaxError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(tok) => tokens.push(Spanned::new(tok, Span::new(span.start, span.end))),
            Err(()) => {
                return Err(TypeSyntaxError::new(
                    format!("unexpected character '{}'", &source[span.start..span.end]),
                    Span::new(span.start, span.end),
                ));
            }
        }
    }

    Ok(tokens)
}
