use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::{char, space0},
    combinator::value,
    multi::many0,
    sequence::preceded,
    IResult,
    Parser,
};

use super::ast::RedirectRole;

/// Characters that separate tokens.
pub const SPLITTERS: &str = " \t";

/// What a single whitespace-delimited token means to the parser.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Token<'a> {
    Pipe,
    Background,
    /// Redirect operator with whatever was glued to it (possibly empty).
    Redirect(RedirectRole, &'a str),
    /// `"…"` or `'…'` with the quotes already removed.
    Quoted(&'a str),
    Word(&'a str),
}

// ── Low-level nom parsers ──────────────────────────────────────────────────

fn token(input: &str) -> IResult<&str, &str> {
    preceded(space0, is_not(SPLITTERS)).parse(input)
}

fn redirect_operator(input: &str) -> IResult<&str, RedirectRole> {
    // `>>` must come before `>`.
    alt((
        value(RedirectRole::AppendOutput, tag(">>")),
        value(RedirectRole::Output, char('>')),
        value(RedirectRole::Input, char('<')),
    ))
    .parse(input)
}

// ── Public helpers ─────────────────────────────────────────────────────────

/// Split a segment on runs of spaces and tabs.
pub fn split_tokens(input: &str) -> Vec<&str> {
    match many0(token).parse(input) {
        Ok((_, tokens)) => tokens,
        Err(_) => input
            .split(|c| SPLITTERS.contains(c))
            .filter(|t| !t.is_empty())
            .collect(),
    }
}

/// Inner text of a token wrapped in exactly one matching pair of quotes.
pub fn unquote(token: &str) -> Option<&str> {
    let quote = token.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let inner = token.strip_prefix(quote)?.strip_suffix(quote)?;
    if inner.is_empty() { None } else { Some(inner) }
}

pub fn is_quoted(token: &str) -> bool {
    unquote(token).is_some()
}

pub fn classify(token: &str) -> Token<'_> {
    match token {
        "|" => Token::Pipe,
        "&" => Token::Background,
        _ => {
            if let Ok((path, role)) = redirect_operator(token) {
                Token::Redirect(role, path)
            } else if let Some(inner) = unquote(token) {
                Token::Quoted(inner)
            } else {
                Token::Word(token)
            }
        }
    }
}

/// Whether a token may be consumed as the file name of a detached redirect
/// operator (`> out` instead of `>out`).
pub fn is_operand(token: &str) -> bool {
    matches!(classify(token), Token::Word(_) | Token::Quoted(_))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_collapses_whitespace_runs() {
        assert_eq!(split_tokens("ls \t -la   /tmp"), vec!["ls", "-la", "/tmp"]);
        assert!(split_tokens("").is_empty());
        assert!(split_tokens(" \t ").is_empty());
    }

    #[test]
    fn test_classify_operators() {
        assert_eq!(classify("|"), Token::Pipe);
        assert_eq!(classify("&"), Token::Background);
        assert_eq!(classify("<in"), Token::Redirect(RedirectRole::Input, "in"));
        assert_eq!(classify(">out"), Token::Redirect(RedirectRole::Output, "out"));
        assert_eq!(classify(">>log"), Token::Redirect(RedirectRole::AppendOutput, "log"));
        assert_eq!(classify(">"), Token::Redirect(RedirectRole::Output, ""));
    }

    #[test]
    fn test_classify_quotes() {
        assert_eq!(classify("\"hi\""), Token::Quoted("hi"));
        assert_eq!(classify("'hi'"), Token::Quoted("hi"));
        // Mismatched, partial and empty quotes stay literal.
        assert_eq!(classify("\"hi'"), Token::Word("\"hi'"));
        assert_eq!(classify("\"hi"), Token::Word("\"hi"));
        assert_eq!(classify("\"\""), Token::Word("\"\""));
        assert_eq!(classify("\""), Token::Word("\""));
    }

    #[test]
    fn test_is_operand() {
        assert!(is_operand("file.txt"));
        assert!(is_operand("'my file'"));
        assert!(!is_operand("|"));
        assert!(!is_operand("<in"));
    }
}
