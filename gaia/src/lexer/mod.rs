//! Lexer: UTF-8 source text to tagged tokens with byte spans

mod token;

pub use token::{LexError, Token};

use crate::ast::Span;
use crate::error::{CompileError, Result};
use logos::Logos;

/// Tokenize a whole source file.
///
/// The first lexical failure aborts the file; the returned error carries the
/// span of the offending token (for unterminated strings and comments that is
/// the span starting at the opening delimiter).
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>> {
    let mut tokens = Vec::new();
    for (result, range) in Token::lexer(source).spanned() {
        let span = Span::new(range.start, range.end);
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(err) => {
                return Err(match err {
                    LexError::UnterminatedString => {
                        CompileError::UnterminatedStringLiteral { span }
                    }
                    LexError::UnterminatedComment => {
                        CompileError::UnterminatedBlockComment { span }
                    }
                    LexError::InvalidNumericLiteral => CompileError::unexpected_token(format!(
                        "invalid numeric literal '{}'",
                        &source[range.clone()]
                    )),
                    LexError::UnexpectedCharacter => CompileError::UnexpectedCharacter { span },
                });
            }
        }
    }
    Ok(tokens)
}
