use crate::expr::{Builtin, Expression};
use smol_str::SmolStr;
use std::{iter::Peekable, ops::Range, str::FromStr};

/// Parse an [`Expression`] tree from some text.
///
/// The tree is returned exactly as written. Call
/// [`simplify()`][crate::simplify] to get its canonical form.
pub fn parse(s: &str) -> Result<Expression, ParseError> {
    Parser::new(s).parse()
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { parse(s) }
}

/// A simple recursive descent parser (`LL(1)`) for converting a string into an
/// expression tree.
///
/// The grammar:
///
/// ```text
/// expression     := term (("+" | "-") term)*
///
/// term           := power (("*" | "/") power | power)*
///
/// power          := unary ("^" power)?
///
/// unary          := "-" unary
///                 | FUNCTION unary
///                 | primary
///
/// primary        := NUMBER
///                 | IDENTIFIER
///                 | "(" expression ")"
/// ```
///
/// A `power` directly following another one (`2x`, `x sin(x)`, `(x+1)(x-1)`)
/// is an implicit multiplication.
#[derive(Debug, Clone)]
pub(crate) struct Parser<'a> {
    tokens: Peekable<Tokens<'a>>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Parser {
            tokens: Tokens::new(src).peekable(),
        }
    }

    pub(crate) fn parse(mut self) -> Result<Expression, ParseError> {
        let expr = self.expression()?;

        match self.tokens.next() {
            None => Ok(expr),
            Some(Ok(token)) => Err(ParseError::UnexpectedToken {
                found: token.kind,
                span: token.span,
                expected: &[
                    TokenKind::Plus,
                    TokenKind::Minus,
                    TokenKind::Times,
                    TokenKind::Divide,
                    TokenKind::Caret,
                ],
            }),
            Some(Err(e)) => Err(e),
        }
    }

    fn peek(&mut self) -> Option<TokenKind> {
        self.tokens
            .peek()
            .and_then(|result| result.as_ref().ok())
            .map(|tok| tok.kind)
    }

    fn advance(&mut self) -> Result<Token<'a>, ParseError> {
        match self.tokens.next() {
            Some(result) => result,
            None => Err(ParseError::UnexpectedEndOfInput),
        }
    }

    fn expression(&mut self) -> Result<Expression, ParseError> {
        let mut terms = vec![self.term()?];

        loop {
            match self.peek() {
                Some(TokenKind::Plus) => {
                    let _ = self.advance()?;
                    terms.push(self.term()?);
                },
                Some(TokenKind::Minus) => {
                    let _ = self.advance()?;
                    terms.push(-self.term()?);
                },
                _ => break,
            }
        }

        Ok(collapse(terms, Expression::sum))
    }

    fn term(&mut self) -> Result<Expression, ParseError> {
        let mut factors = vec![self.power()?];

        loop {
            match self.peek() {
                Some(TokenKind::Times) => {
                    let _ = self.advance()?;
                    factors.push(self.power()?);
                },
                Some(TokenKind::Divide) => {
                    let _ = self.advance()?;
                    let divisor = self.power()?;

                    // dividing two integer literals gives an exact fraction
                    let literal = match (factors.as_slice(), &divisor) {
                        (
                            [Expression::Number(numerator)],
                            Expression::Number(denominator),
                        ) => {
                            Some(Expression::Fraction(*numerator, *denominator))
                        },
                        _ => None,
                    };

                    match literal {
                        Some(fraction) => factors = vec![fraction],
                        None => {
                            factors.push(divisor.pow(Expression::NEGATIVE_ONE))
                        },
                    }
                },
                Some(kind) if kind.starts_implicit_product() => {
                    factors.push(self.power()?);
                },
                _ => break,
            }
        }

        Ok(collapse(factors, Expression::product))
    }

    fn power(&mut self) -> Result<Expression, ParseError> {
        let base = self.unary()?;

        if self.peek() == Some(TokenKind::Caret) {
            let _ = self.advance()?;
            // right associative, x^y^z is x^(y^z)
            let exponent = self.power()?;
            Ok(base.pow(exponent))
        } else {
            Ok(base)
        }
    }

    fn unary(&mut self) -> Result<Expression, ParseError> {
        match self.peek() {
            Some(TokenKind::Minus) => {
                let _ = self.advance()?;
                let operand = self.unary()?;
                Ok(negate(operand))
            },
            Some(TokenKind::Function) => {
                let name = self.advance()?;
                let function = match Builtin::from_name(name.text) {
                    Some(function) => function,
                    None => {
                        unreachable!("Unknown function name, {:?}", name.text)
                    },
                };
                let operand = self.unary()?;

                Ok(Expression::function(function, operand))
            },
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expression, ParseError> {
        let expected = &[
            TokenKind::Number,
            TokenKind::Identifier,
            TokenKind::Function,
            TokenKind::Minus,
            TokenKind::OpenParen,
        ];

        match self.peek() {
            Some(TokenKind::Number) => {
                return self.number();
            },
            Some(TokenKind::Identifier) => {
                let ident = self.advance()?;
                return Ok(Expression::symbol(ident.text));
            },
            Some(TokenKind::OpenParen) => {
                let _ = self.advance()?;
                let expr = self.expression()?;
                let close_paren = self.advance()?;

                if close_paren.kind == TokenKind::CloseParen {
                    return Ok(expr);
                } else {
                    return Err(ParseError::UnexpectedToken {
                        found: close_paren.kind,
                        span: close_paren.span,
                        expected: &[TokenKind::CloseParen],
                    });
                }
            },
            _ => {},
        }

        // we couldn't parse the primary, return a nice error
        match self.tokens.next() {
            Some(Ok(Token { span, kind, .. })) => {
                Err(ParseError::UnexpectedToken {
                    found: kind,
                    expected,
                    span,
                })
            },
            Some(Err(e)) => Err(e),
            None => Err(ParseError::UnexpectedEndOfInput),
        }
    }

    fn number(&mut self) -> Result<Expression, ParseError> {
        let token = self.advance()?;
        debug_assert_eq!(token.kind, TokenKind::Number);

        let too_large = || ParseError::NumberTooLarge {
            text: token.text.into(),
            span: token.span.clone(),
        };

        let (whole, decimals) = match token.text.find('.') {
            Some(dot) => (&token.text[..dot], &token.text[dot + 1..]),
            None => (token.text, ""),
        };

        // 3.14 is read as the exact fraction 314/100
        let digits: i64 = format!("{}{}", whole, decimals)
            .parse()
            .map_err(|_| too_large())?;

        if decimals.is_empty() {
            return Ok(Expression::Number(digits));
        }

        let denominator = u32::try_from(decimals.len())
            .ok()
            .and_then(|places| 10_i64.checked_pow(places))
            .ok_or_else(too_large)?;

        Ok(Expression::Fraction(digits, denominator))
    }
}

fn collapse<F>(mut items: Vec<Expression>, build: F) -> Expression
where
    F: FnOnce(Vec<Expression>) -> Expression,
{
    if items.len() == 1 {
        items.remove(0)
    } else {
        build(items)
    }
}

fn negate(operand: Expression) -> Expression {
    let negated = match operand {
        Expression::Number(n) => n.checked_neg().map(Expression::Number),
        Expression::Fraction(n, d) => {
            n.checked_neg().map(|n| Expression::Fraction(n, d))
        },
        _ => None,
    };

    negated.unwrap_or_else(|| -operand)
}

/// Possible errors that may occur while parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid character, {character:?}, at index {index}")]
    InvalidCharacter { character: char, index: usize },
    #[error("Unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("Found a {found:?} at {span:?} but expected one of {expected:?}")]
    UnexpectedToken {
        found: TokenKind,
        span: Range<usize>,
        expected: &'static [TokenKind],
    },
    #[error("The number \"{text}\" is too large")]
    NumberTooLarge { text: SmolStr, span: Range<usize> },
}

#[derive(Debug, Clone, PartialEq)]
struct Tokens<'a> {
    src: &'a str,
    cursor: usize,
}

impl<'a> Tokens<'a> {
    fn new(src: &'a str) -> Self { Tokens { src, cursor: 0 } }

    fn rest(&self) -> &'a str { &self.src[self.cursor..] }

    fn peek(&self) -> Option<char> { self.rest().chars().next() }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        Some(c)
    }

    fn chomp(
        &mut self,
        kind: TokenKind,
    ) -> Option<Result<Token<'a>, ParseError>> {
        let start = self.cursor;
        self.advance()?;
        let end = self.cursor;

        let tok = Token {
            text: &self.src[start..end],
            span: start..end,
            kind,
        };

        Some(Ok(tok))
    }

    fn take_while<P>(&mut self, mut predicate: P)
    where
        P: FnMut(char) -> bool,
    {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }

            self.advance();
        }
    }

    fn chomp_number(&mut self) -> Token<'a> {
        let start = self.cursor;
        self.take_while(|c| c.is_ascii_digit());

        if self.peek() == Some('.') {
            // skip past the decimal
            self.advance();
            self.take_while(|c| c.is_ascii_digit());
        }

        let end = self.cursor;

        Token::from_text(self.src, start..end, TokenKind::Number)
    }

    /// Split a run of letters into function names, `pi`, and single letter
    /// variables, so `xsin` reads as `x` followed by `sin`.
    fn chomp_letters(&mut self) -> Token<'a> {
        let start = self.cursor;
        let rest = self.rest();

        let function = Builtin::ALL
            .iter()
            .map(|builtin| builtin.name())
            .find(|name| rest.starts_with(name));

        let (length, kind) = match function {
            Some(name) => (name.len(), TokenKind::Function),
            None if rest.starts_with("pi") => (2, TokenKind::Identifier),
            None => {
                let first = rest.chars().next().map_or(0, char::len_utf8);
                (first, TokenKind::Identifier)
            },
        };

        self.cursor += length;

        Token::from_text(self.src, start..self.cursor, kind)
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            return match self.peek()? {
                space if space.is_whitespace() => {
                    self.advance();
                    continue;
                },
                '(' => self.chomp(TokenKind::OpenParen),
                ')' => self.chomp(TokenKind::CloseParen),
                '+' => self.chomp(TokenKind::Plus),
                '-' => self.chomp(TokenKind::Minus),
                '*' => self.chomp(TokenKind::Times),
                '/' => self.chomp(TokenKind::Divide),
                '^' => self.chomp(TokenKind::Caret),
                'a'..='z' | 'A'..='Z' => Some(Ok(self.chomp_letters())),
                '0'..='9' => Some(Ok(self.chomp_number())),
                other => {
                    let index = self.cursor;
                    self.advance();

                    Some(Err(ParseError::InvalidCharacter {
                        character: other,
                        index,
                    }))
                },
            };
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Token<'a> {
    text: &'a str,
    span: Range<usize>,
    kind: TokenKind,
}

impl<'a> Token<'a> {
    fn from_text(
        original_source: &'a str,
        span: Range<usize>,
        kind: TokenKind,
    ) -> Self {
        Token {
            text: &original_source[span.clone()],
            span,
            kind,
        }
    }
}

/// The kinds of token that can appear in an [`Expression`]'s text form.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TokenKind {
    Identifier,
    /// The name of a builtin function.
    Function,
    Number,
    OpenParen,
    CloseParen,
    Plus,
    Minus,
    Times,
    Divide,
    Caret,
}

impl TokenKind {
    fn starts_implicit_product(self) -> bool {
        match self {
            TokenKind::Number
            | TokenKind::Identifier
            | TokenKind::Function
            | TokenKind::OpenParen => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tokenizer_tests {
    use super::*;

    macro_rules! tokenize_test {
        ($name:ident, $src:expr, $should_be:expr) => {
            #[test]
            fn $name() {
                let mut tokens = Tokens::new($src);

                let got = tokens.next().unwrap().unwrap();

                let Range { start, end } = got.span;
                assert_eq!(start, 0);
                assert_eq!(end, $src.len());
                assert_eq!(got.kind, $should_be);

                assert!(
                    tokens.next().is_none(),
                    "{:?} should be empty",
                    tokens
                );
            }
        };
    }

    tokenize_test!(open_paren, "(", TokenKind::OpenParen);
    tokenize_test!(close_paren, ")", TokenKind::CloseParen);
    tokenize_test!(plus, "+", TokenKind::Plus);
    tokenize_test!(minus, "-", TokenKind::Minus);
    tokenize_test!(times, "*", TokenKind::Times);
    tokenize_test!(divide, "/", TokenKind::Divide);
    tokenize_test!(caret, "^", TokenKind::Caret);
    tokenize_test!(single_digit_integer, "3", TokenKind::Number);
    tokenize_test!(multi_digit_integer, "31", TokenKind::Number);
    tokenize_test!(number_with_trailing_dot, "31.", TokenKind::Number);
    tokenize_test!(simple_decimal, "3.14", TokenKind::Number);
    tokenize_test!(simple_identifier, "x", TokenKind::Identifier);
    tokenize_test!(pi_is_a_single_identifier, "pi", TokenKind::Identifier);
    tokenize_test!(sine, "sin", TokenKind::Function);
    tokenize_test!(natural_log, "ln", TokenKind::Function);

    #[test]
    fn letter_runs_are_split_into_names() {
        let got: Vec<_> = Tokens::new("4xsin(pie)")
            .map(|tok| tok.map(|t| (t.kind, t.text)))
            .collect::<Result<_, _>>()
            .unwrap();

        let should_be = vec![
            (TokenKind::Number, "4"),
            (TokenKind::Identifier, "x"),
            (TokenKind::Function, "sin"),
            (TokenKind::OpenParen, "("),
            (TokenKind::Identifier, "pi"),
            (TokenKind::Identifier, "e"),
            (TokenKind::CloseParen, ")"),
        ];
        assert_eq!(got, should_be);
    }

    #[test]
    fn invalid_characters_are_skipped_after_reporting() {
        let mut tokens = Tokens::new("$x");

        assert_eq!(
            tokens.next(),
            Some(Err(ParseError::InvalidCharacter {
                character: '$',
                index: 0
            }))
        );
        let x = tokens.next().unwrap().unwrap();
        assert_eq!(x.kind, TokenKind::Identifier);
        assert!(tokens.next().is_none());
    }
}
