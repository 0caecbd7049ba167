//! Tokenized server reply lines.
//!
//! A numeric reply arrives as
//!
//! ```text
//! [@tags] :<sender> <code> <target> [params...] [:trailing]
//! ```
//!
//! and is handed to the dispatcher as an ordered token list: sender (without
//! its `:`), code, target nick, then the code-specific fields. The trailing
//! segment stays a single token and keeps its leading `:`.

use std::str::FromStr;

use nom::{
    bytes::complete::take_till1,
    character::complete::{char, space0, space1},
    combinator::opt,
    error::{context, VerboseError, VerboseErrorKind},
    sequence::{preceded, terminated},
    IResult,
};

use crate::error::{DispatchError, Result};

type TokenResult<I, O> = IResult<I, O, VerboseError<I>>;

/// Number of tokens present on every numeric reply before its own fields.
pub const BOILERPLATE_TOKENS: usize = 3;

/// Marks the start of the trailing free-text parameter.
pub const TRAILING_SENTINEL: char = ':';

/// One protocol line split into tokens.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenizedLine {
    tokens: Vec<String>,
}

impl TokenizedLine {
    /// Build a line from tokens that were already split by the caller.
    pub fn from_tokens<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a raw protocol line.
    ///
    /// The IRCv3 tag section is dropped. A line without a prefix gets an
    /// empty sender token so the code is always at index 1.
    ///
    /// ```
    /// use slirc_session::TokenizedLine;
    ///
    /// let line = TokenizedLine::parse(":irc.example.net 332 me #rust :Rust talk\r\n").unwrap();
    /// assert_eq!(line.code_token().unwrap(), "332");
    /// assert_eq!(line.params(), ["#rust", ":Rust talk"]);
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let line = raw.trim_end_matches(['\r', '\n']).trim_start_matches(' ');
        if line.trim().is_empty() {
            return Err(DispatchError::MissingField { index: 0, len: 0 });
        }

        match tokenize(line) {
            Ok((_, tokens)) => Ok(Self::from_tokens(tokens)),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                Err(tokenize_error(line, &e))
            }
            Err(nom::Err::Incomplete(_)) => Err(DispatchError::Tokenize {
                input: line.to_string(),
                position: line.len(),
                context: "incomplete input",
            }),
        }
    }

    /// Token at `index`, or [`DispatchError::MissingField`].
    pub fn token(&self, index: usize) -> Result<&str> {
        self.tokens
            .get(index)
            .map(String::as_str)
            .ok_or(DispatchError::MissingField {
                index,
                len: self.tokens.len(),
            })
    }

    /// The sender token (index 0).
    pub fn sender(&self) -> Result<&str> {
        self.token(0)
    }

    /// The reply code token (index 1).
    pub fn code_token(&self) -> Result<&str> {
        self.token(1)
    }

    /// Tokens after sender, code and target.
    pub fn params(&self) -> &[String] {
        self.tokens.get(BOILERPLATE_TOKENS..).unwrap_or(&[])
    }

    /// Parameter `index` counted from the first token after the boilerplate.
    pub fn param(&self, index: usize) -> Result<&str> {
        self.token(BOILERPLATE_TOKENS + index)
    }

    /// All tokens, boilerplate included.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True if the line holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl From<Vec<String>> for TokenizedLine {
    fn from(tokens: Vec<String>) -> Self {
        Self { tokens }
    }
}

impl FromStr for TokenizedLine {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Strip a leading `:` from a free-text field, if present.
#[inline]
pub fn strip_sentinel(field: &str) -> &str {
    field.strip_prefix(TRAILING_SENTINEL).unwrap_or(field)
}

/// Position of the innermost failure and the first context wrapped around
/// it.
fn tokenize_error(line: &str, e: &VerboseError<&str>) -> DispatchError {
    let position = e
        .errors
        .first()
        .map_or(line.len(), |(rest, _)| line.len() - rest.len());
    let context = e
        .errors
        .iter()
        .find_map(|(_, kind)| match kind {
            VerboseErrorKind::Context(ctx) => Some(*ctx),
            _ => None,
        })
        .unwrap_or("tokenizing line");

    DispatchError::Tokenize {
        input: line.to_string(),
        position,
        context,
    }
}

fn parse_tags(input: &str) -> TokenResult<&str, &str> {
    context(
        "parsing IRCv3 message tags",
        preceded(char('@'), take_till1(|c: char| c == ' ')),
    )(input)
}

fn parse_prefix(input: &str) -> TokenResult<&str, &str> {
    context(
        "parsing message prefix",
        preceded(char(':'), take_till1(|c: char| c == ' ')),
    )(input)
}

fn parse_word(input: &str) -> TokenResult<&str, &str> {
    take_till1(|c: char| c == ' ')(input)
}

fn tokenize(input: &str) -> TokenResult<&str, Vec<&str>> {
    let (input, _) = opt(terminated(parse_tags, space1))(input)?;
    let (input, sender) = opt(terminated(parse_prefix, space1))(input)?;
    let (mut rest, command) = context("parsing reply code", parse_word)(input)?;

    let mut tokens = vec![sender.unwrap_or(""), command];
    loop {
        let (after_space, _) = space0::<_, VerboseError<&str>>(rest)?;
        if after_space.is_empty() {
            break;
        }
        if after_space.starts_with(TRAILING_SENTINEL) {
            tokens.push(after_space);
            break;
        }
        let (next, word) = parse_word(after_space)?;
        tokens.push(word);
        rest = next;
    }

    Ok(("", tokens))
}
