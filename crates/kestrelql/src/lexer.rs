//! Query tokenizer using nom
//!
//! A query line is a whitespace separated sequence of tokens:
//! ```text
//! SET greeting "hello world"
//! SET counter -12
//! GET 'it\'s'
//! ```
//! The first bare word is the command name and is upper-cased.

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, take_till, take_till1},
    character::complete::{alpha1, char, digit1, multispace1, one_of},
    combinator::{cut, eof, map, opt, peek, recognize, value},
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};

use kestreldb::{Error, Key, Result};

/// Token categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Leading bare word naming the command
    Command,
    /// Bare word
    Identifier,
    /// Quoted string with escapes resolved
    String,
    /// Optionally signed integer or decimal
    Number,
    /// Word starting with `-` or `--` followed by a letter
    Flag,
}

/// A token and where it starts in the query line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Category
    pub kind: TokenKind,
    /// Text, unquoted and unescaped for strings
    pub value: String,
    /// Byte offset of the token's first character
    pub position: usize,
}

impl Token {
    fn new(kind: TokenKind, value: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            position,
        }
    }
}

impl TryFrom<&Token> for Key {
    type Error = Error;

    /// Quoted strings and bare words become string keys, whole numbers
    /// become integer keys. Anything else is rejected.
    fn try_from(token: &Token) -> Result<Self> {
        match token.kind {
            TokenKind::Identifier | TokenKind::String => Ok(Key::Str(token.value.clone())),
            TokenKind::Number => token
                .value
                .parse::<i64>()
                .map(Key::Int)
                .map_err(|_| Error::InvalidKeyType(format!("number '{}'", token.value))),
            TokenKind::Flag => Err(Error::InvalidKeyType(format!("flag '{}'", token.value))),
            TokenKind::Command => Err(Error::InvalidKeyType(format!("command '{}'", token.value))),
        }
    }
}

fn quoted<'a>(quote: char) -> impl FnMut(&'a str) -> IResult<&'a str, String> {
    let stop = if quote == '"' { "\\\"" } else { "\\'" };
    move |input: &'a str| {
        preceded(
            char(quote),
            cut(terminated(
                map(
                    opt(escaped_transform(
                        is_not(stop),
                        '\\',
                        alt((
                            value("\\", char('\\')),
                            value("\"", char('"')),
                            value("'", char('\'')),
                            value("\n", char('n')),
                            value("\t", char('t')),
                        )),
                    )),
                    Option::unwrap_or_default,
                ),
                char(quote),
            )),
        )(input)
    }
}

fn boundary(input: &str) -> IResult<&str, &str> {
    peek(alt((multispace1, eof)))(input)
}

fn number(input: &str) -> IResult<&str, &str> {
    terminated(
        recognize(tuple((
            opt(one_of("+-")),
            digit1,
            opt(pair(char('.'), digit1)),
        ))),
        boundary,
    )(input)
}

fn flag(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        alt((tag("--"), tag("-"))),
        alpha1,
        take_till(char::is_whitespace),
    )))(input)
}

fn word(input: &str) -> IResult<&str, &str> {
    take_till1(char::is_whitespace)(input)
}

fn token(input: &str) -> IResult<&str, (TokenKind, String)> {
    alt((
        map(quoted('"'), |s| (TokenKind::String, s)),
        map(quoted('\''), |s| (TokenKind::String, s)),
        map(number, |s| (TokenKind::Number, s.to_string())),
        map(flag, |s| (TokenKind::Flag, s.to_string())),
        map(word, |s| (TokenKind::Identifier, s.to_string())),
    ))(input)
}

/// Split a query line into tokens
///
/// # Returns
/// * `Err(Error::Parse)` for an unterminated or malformed quoted string
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = input.trim_start();

    while !rest.is_empty() {
        let position = input.len() - rest.len();
        let (remaining, (kind, text)) = token(rest).map_err(|e| Error::Parse {
            position,
            message: match e {
                nom::Err::Failure(_) => "unterminated or malformed quoted string".to_string(),
                other => format!("unexpected input: {:?}", other),
            },
        })?;

        let token = if tokens.is_empty() && kind == TokenKind::Identifier {
            Token::new(TokenKind::Command, text.to_ascii_uppercase(), position)
        } else {
            Token::new(kind, text, position)
        };
        tokens.push(token);
        rest = remaining.trim_start();
    }

    Ok(tokens)
}
