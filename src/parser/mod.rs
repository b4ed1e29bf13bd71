mod ast;
mod combinators;

pub use ast::{RedirectRole, Redirections, Stage};

use combinators::{classify, is_operand, split_tokens, Token, SPLITTERS};

// ── Public API ────────────────────────────────────────────────────────────

/// Parse an input line into a chain of [`Stage`]s.
///
/// Parsing never fails: malformed redirects and unbalanced quotes are taken
/// literally, and an empty line yields a single no-op stage. A trailing `?`
/// requests completion and a trailing `&` requests background execution;
/// both flags are recorded on the first stage of the chain.
pub fn parse(line: &str) -> Stage {
    let mut text = trim(line);
    let mut auto_complete = false;
    let mut background = false;

    if let Some(rest) = text.strip_suffix('?') {
        auto_complete = true;
        text = trim(rest);
    } else if let Some(rest) = text.strip_suffix('&') {
        background = true;
        text = trim(rest);
    }

    let tokens = split_tokens(text);
    let mut head = parse_tokens(&tokens);
    head.auto_complete = auto_complete;
    head.background = background;
    head
}

fn trim(text: &str) -> &str {
    text.trim_matches(|c| SPLITTERS.contains(c))
}

/// Build one stage from `tokens`, recursing on whatever follows a `|`.
fn parse_tokens(tokens: &[&str]) -> Stage {
    let Some((&name, rest)) = tokens.split_first() else {
        return Stage::default();
    };

    let mut stage = Stage::new(name);
    let mut i = 0;
    while i < rest.len() {
        let token = rest[i];
        i += 1;
        match classify(token) {
            Token::Pipe => {
                stage.next = Some(Box::new(parse_tokens(&rest[i..])));
                break;
            }
            // Already handled at line level.
            Token::Background => {}
            Token::Redirect(role, path) => {
                let path = match rest.get(i) {
                    Some(&operand) if path.is_empty() && is_operand(operand) => {
                        i += 1;
                        match classify(operand) {
                            Token::Quoted(inner) => inner,
                            _ => operand,
                        }
                    }
                    _ => path,
                };
                stage.redirects.set(role, path);
            }
            Token::Quoted(arg) | Token::Word(arg) => stage.args.push(arg.to_string()),
        }
    }
    stage
}

// ── Tests ──────────────────────────────────────────────────────────────────
