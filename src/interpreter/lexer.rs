//! Tokenizes a raw command line (spec §4.3 "Lexical grammar"):
//! whitespace-separated tokens, with single-quoted spans forming one
//! token each (quotes stripped).

use commissioner_types::{Error, Result};

pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        if chars.peek() == Some(&'\'') {
            chars.next();
            let mut token = String::new();
            loop {
                match chars.next() {
                    Some('\'') => break,
                    Some(c) => token.push(c),
                    None => return Err(Error::invalid_args("unterminated quoted token")),
                }
            }
            tokens.push(token);
            continue;
        }

        let mut token = String::new();
        while matches!(chars.peek(), Some(c) if !c.is_whitespace()) {
            token.push(chars.next().unwrap());
        }
        tokens.push(token);
    }

    Ok(tokens)
}

pub fn is_keyword(token: &str) -> bool {
    token.starts_with("--")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace() {
        let tokens = tokenize("opdataset set active --nwk net1").unwrap();
        assert_eq!(tokens, vec!["opdataset", "set", "active", "--nwk", "net1"]);
    }

    #[test]
    fn quoted_span_is_one_token() {
        let tokens = tokenize("network add 'my network' --dom d1").unwrap();
        assert_eq!(tokens, vec!["network", "add", "my network", "--dom", "d1"]);
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        assert!(tokenize("network add 'oops").is_err());
    }
}
