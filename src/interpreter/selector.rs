//! Parses the `SELECTOR*` tail of a command line into its typed fields
//! (spec §4.3, §6 grammar): `--nwk ALIAS+ | --dom NAME | --export FILE |
//! --import FILE | --timeout MS`.

use commissioner_types::{Error, Result};

use super::lexer::is_keyword;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selectors {
    pub nwk: Option<Vec<String>>,
    pub dom: Option<String>,
    pub export: Option<String>,
    pub import: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl Selectors {
    pub fn has_network_selector(&self) -> bool {
        self.nwk.is_some() || self.dom.is_some()
    }
}

/// Splits `tokens` into the residual verb expression and the raw
/// selector tail: everything from the first `--KEY` token onward.
pub fn split_residual(tokens: &[String]) -> (&[String], &[String]) {
    match tokens.iter().position(|t| is_keyword(t)) {
        Some(idx) => (&tokens[..idx], &tokens[idx..]),
        None => (tokens, &[]),
    }
}

/// Parses the selector tail. Every `--KEY` must be followed by at least
/// one value token (`--nwk` takes one-or-more, the rest take exactly
/// one) - a bare trailing `--KEY` is "invalid args" (spec §4.3).
pub fn parse_selectors(tail: &[String]) -> Result<Selectors> {
    let mut selectors = Selectors::default();
    let mut i = 0;

    while i < tail.len() {
        let key = tail[i].as_str();
        if !is_keyword(key) {
            return Err(Error::invalid_args(format!("unexpected token '{key}' in selector position")));
        }
        i += 1;

        let mut values = Vec::new();
        while i < tail.len() && !is_keyword(&tail[i]) {
            values.push(tail[i].clone());
            i += 1;
        }
        if values.is_empty() {
            return Err(Error::invalid_args(format!("'{key}' requires a value")));
        }

        match key {
            "--nwk" => {
                if selectors.nwk.is_some() {
                    return Err(Error::invalid_args("--nwk specified more than once"));
                }
                selectors.nwk = Some(values);
            }
            "--dom" => {
                if values.len() != 1 {
                    return Err(Error::invalid_args("--dom takes exactly one name"));
                }
                selectors.dom = Some(values.into_iter().next().unwrap());
            }
            "--export" => {
                if values.len() != 1 {
                    return Err(Error::invalid_args("--export takes exactly one filename"));
                }
                selectors.export = Some(values.into_iter().next().unwrap());
            }
            "--import" => {
                if values.len() != 1 {
                    return Err(Error::invalid_args("--import takes exactly one filename"));
                }
                selectors.import = Some(values.into_iter().next().unwrap());
            }
            "--timeout" => {
                if values.len() != 1 {
                    return Err(Error::invalid_args("--timeout takes exactly one value"));
                }
                let ms: u64 = values[0]
                    .parse()
                    .map_err(|_| Error::invalid_args(format!("'{}' is not a valid timeout", values[0])))?;
                selectors.timeout_ms = Some(ms);
            }
            other => return Err(Error::invalid_args(format!("unrecognized selector '{other}'"))),
        }
    }

    if selectors.nwk.is_some() && selectors.dom.is_some() {
        return Err(Error::invalid_args("--nwk and --dom are mutually exclusive"));
    }
    if selectors.export.is_some() && selectors.import.is_some() {
        return Err(Error::invalid_args("--export and --import are mutually exclusive"));
    }

    Ok(selectors)
}
