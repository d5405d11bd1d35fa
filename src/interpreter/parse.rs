//! Two-phase parse/validate (spec §4.3): tokenize, split off the
//! selector tail, classify the verb against the fixed command tables,
//! and enforce every semantic rule that doesn't need Registry state.

use commissioner_types::{Error, Result};

use super::lexer::tokenize;
use super::selector::{parse_selectors, split_residual, Selectors};
use super::tables;

/// All known multi-word verb prefixes, longest first, so a greedy
/// left-to-right scan finds e.g. `"opdataset set active"` before
/// falling back to the shorter `"opdataset"`.
fn known_verbs() -> Vec<&'static str> {
    let mut verbs: Vec<&'static str> = tables::MULTI_NETWORK_SUPPORTED
        .iter()
        .chain(tables::MULTI_JOB.iter())
        .chain(tables::INACTIVE_ALLOWED.iter())
        .chain(tables::EXPORT_SUPPORTED.iter())
        .chain(tables::IMPORT_SUPPORTED.iter())
        .copied()
        .collect();
    verbs.sort_by_key(|v| std::cmp::Reverse(v.split_whitespace().count()));
    verbs.dedup();
    verbs
}

fn match_verb(residual: &[String]) -> (String, usize) {
    for candidate in known_verbs() {
        let words: Vec<&str> = candidate.split_whitespace().collect();
        if residual.len() >= words.len() && residual[..words.len()].iter().map(String::as_str).eq(words.iter().copied()) {
            return (candidate.to_string(), words.len());
        }
    }
    match residual.first() {
        Some(first) => (first.clone(), 1),
        None => (String::new(), 0),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommand {
    pub verb: String,
    pub args: Vec<String>,
    pub selectors: Selectors,
    pub multi_network_supported: bool,
    pub multi_job: bool,
    pub inactive_allowed: bool,
}

impl ParsedCommand {
    /// True when this command should run via the Job Manager's fan-out
    /// path rather than synchronously in the caller's thread (spec
    /// §4.3: "A command using --nwk or --dom that is also in the
    /// multi-job table runs via the fan-out path").
    pub fn runs_via_fan_out(&self) -> bool {
        self.selectors.has_network_selector() && self.multi_job
    }
}

pub fn parse(line: &str) -> Result<ParsedCommand> {
    let tokens = tokenize(line)?;
    if tokens.is_empty() {
        return Err(Error::invalid_args("empty command"));
    }

    let (residual, tail) = split_residual(&tokens);
    let selectors = parse_selectors(tail)?;

    let (verb, consumed) = match_verb(residual);
    let args = residual[consumed.min(residual.len())..].to_vec();

    let multi_network_supported = tables::is_multi_network_supported(&verb);
    let multi_job = tables::is_multi_job(&verb);
    let inactive_allowed = tables::is_inactive_allowed(&verb);

    if selectors.has_network_selector() && !multi_network_supported {
        return Err(Error::invalid_args(format!(
            "'{verb}' does not support the --nwk/--dom multi-network selector"
        )));
    }
    if selectors.export.is_some() && !tables::is_export_supported(&verb) {
        return Err(Error::invalid_args(format!("'{verb}' does not support --export")));
    }
    if selectors.import.is_some() && !tables::is_import_supported(&verb) {
        return Err(Error::invalid_args(format!("'{verb}' does not support --import")));
    }

    Ok(ParsedCommand {
        verb,
        args,
        selectors,
        multi_network_supported,
        multi_job,
        inactive_allowed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_a_multi_job_verb() {
        let cmd = parse("start --nwk net1 net2").unwrap();
        assert_eq!(cmd.verb, "start");
        assert!(cmd.multi_network_supported);
        assert!(cmd.multi_job);
        assert!(cmd.runs_via_fan_out());
    }

    #[test]
    fn multi_word_verb_consumes_all_its_tokens() {
        let cmd = parse("opdataset set active --import file.json").unwrap();
        assert_eq!(cmd.verb, "opdataset set active");
        assert!(cmd.args.is_empty());
        assert_eq!(cmd.selectors.import, Some("file.json".to_string()));
    }

    #[test]
    fn network_selector_on_unsupported_verb_is_invalid_args() {
        assert!(parse("network add --nwk net1").is_err());
    }

    #[test]
    fn export_on_unsupported_verb_is_invalid_args() {
        assert!(parse("start --export out.json").is_err());
    }

    #[test]
    fn br_list_is_multi_network_but_not_multi_job() {
        let cmd = parse("br list --nwk net1").unwrap();
        assert!(cmd.multi_network_supported);
        assert!(!cmd.multi_job);
        assert!(!cmd.runs_via_fan_out());
    }

    #[test]
    fn leftover_positional_args_follow_the_verb() {
        let cmd = parse("opdataset set active '{\"foo\":1}'").unwrap();
        assert_eq!(cmd.verb, "opdataset set active");
        assert_eq!(cmd.args, vec!["{\"foo\":1}"]);
    }
}
