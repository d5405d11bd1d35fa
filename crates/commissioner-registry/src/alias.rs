//! Alias resolution (spec §4.1's "the interesting algorithm").

use commissioner_types::{EntityId, Network, Pan, Xpan};

/// The outcome of resolving a set of network aliases: the xpans that were
/// resolved (de-duplicated) plus the tokens that could not be resolved to
/// anything (spec §4.1 point 3 - partial success).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasResolution {
    pub resolved: Vec<Xpan>,
    pub unresolved: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupAlias {
    All,
    Other,
    This,
}

fn group_alias(token: &str) -> Option<GroupAlias> {
    match token {
        "all" => Some(GroupAlias::All),
        "other" => Some(GroupAlias::Other),
        "this" => Some(GroupAlias::This),
        _ => None,
    }
}

/// Error raised when group aliases are mixed with individual aliases, or
/// with each other (spec §4.1 point 1, §4.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAliasConflict;

/// Resolve a single non-group alias token against the known networks, in the
/// priority order of spec §4.1 point 2: integer (xpan) first, then exact
/// name, then pan-id (hex `0x` or decimal). Returns `None` for no match, the
/// single match for exactly one, or `Err` (ambiguity) for more than one -
/// except that an integer match is always authoritative and short-circuits
/// the other two attempts (spec §9 Open Questions: the integer parse wins
/// even when a same-named network with the same literal digits also
/// exists).
pub enum SingleResolution {
    None,
    One(Xpan),
    Ambiguous,
}

fn resolve_one_alias(token: &str, networks: &[Network]) -> SingleResolution {
    // (a) integer -> match by xpan.
    if let Ok(v) = token.parse::<u64>() {
        let xpan = Xpan(v);
        if networks.iter().any(|n| n.xpan == xpan) {
            return SingleResolution::One(xpan);
        }
    }

    // (b) exact network name.
    let by_name: Vec<&Network> = networks.iter().filter(|n| n.name == token).collect();
    if by_name.len() > 1 {
        return SingleResolution::Ambiguous;
    }
    if let Some(n) = by_name.first() {
        return SingleResolution::One(n.xpan);
    }

    // (c) 16-bit pan-id, `0x` prefix or decimal.
    let pan_val = if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X"))
    {
        u16::from_str_radix(hex, 16).ok()
    } else {
        token.parse::<u16>().ok()
    };
    if let Some(p) = pan_val {
        let by_pan: Vec<&Network> = networks.iter().filter(|n| n.pan == Pan(p)).collect();
        if by_pan.len() > 1 {
            return SingleResolution::Ambiguous;
        }
        if let Some(n) = by_pan.first() {
            return SingleResolution::One(n.xpan);
        }
    }

    SingleResolution::None
}

/// Resolve a list of network alias tokens against the known networks and the
/// currently selected network (spec §4.1).
///
/// `current` is the xpan of the currently selected network, if any.
pub fn resolve_network_aliases(
    tokens: &[String],
    networks: &[Network],
    current: Option<Xpan>,
) -> Result<AliasResolution, GroupAliasConflict> {
    if tokens.len() == 1 {
        if let Some(group) = group_alias(&tokens[0]) {
            return Ok(resolve_group_alias(group, networks, current));
        }
    }

    // Any token that is itself a group alias but combined with others (or
    // with another group alias) is a conflict (spec §4.1 point 1, §4.3).
    if tokens.iter().any(|t| group_alias(t).is_some()) {
        return Err(GroupAliasConflict);
    }

    let mut resolved = Vec::new();
    let mut unresolved = Vec::new();
    for token in tokens {
        match resolve_one_alias(token, networks) {
            SingleResolution::One(xpan) => resolved.push(xpan),
            SingleResolution::None => unresolved.push(token.clone()),
            SingleResolution::Ambiguous => unresolved.push(token.clone()),
        }
    }

    dedup_xpans(&mut resolved);
    Ok(AliasResolution {
        resolved,
        unresolved,
    })
}

/// Like [`resolve_network_aliases`], but surfaces ambiguity as a distinct
/// case instead of folding it into `unresolved`, for callers (e.g. a
/// single-alias `--nwk`) that must report Ambiguity specifically rather than
/// NotFound (spec §7).
pub fn resolve_single_network_alias(
    token: &str,
    networks: &[Network],
    current: Option<Xpan>,
) -> Result<SingleAliasOutcome, GroupAliasConflict> {
    if let Some(group) = group_alias(token) {
        let r = resolve_group_alias(group, networks, current);
        return Ok(SingleAliasOutcome::Many(r));
    }
    match resolve_one_alias(token, networks) {
        SingleResolution::One(x) => Ok(SingleAliasOutcome::One(x)),
        SingleResolution::None => Ok(SingleAliasOutcome::NotFound),
        SingleResolution::Ambiguous => Ok(SingleAliasOutcome::Ambiguous),
    }
}

pub enum SingleAliasOutcome {
    One(Xpan),
    Many(AliasResolution),
    NotFound,
    Ambiguous,
}

fn resolve_group_alias(
    group: GroupAlias,
    networks: &[Network],
    current: Option<Xpan>,
) -> AliasResolution {
    let all: Vec<Xpan> = networks.iter().map(|n| n.xpan).collect();
    match group {
        GroupAlias::All => AliasResolution {
            resolved: all,
            unresolved: Vec::new(),
        },
        GroupAlias::Other => {
            let resolved = match current {
                Some(cur) => all.into_iter().filter(|x| *x != cur).collect(),
                None => all,
            };
            AliasResolution {
                resolved,
                unresolved: Vec::new(),
            }
        }
        GroupAlias::This => match current {
            Some(cur) => AliasResolution {
                resolved: vec![cur],
                unresolved: Vec::new(),
            },
            None => AliasResolution {
                resolved: Vec::new(),
                unresolved: vec!["this".to_string()],
            },
        },
    }
}

fn dedup_xpans(xpans: &mut Vec<Xpan>) {
    let mut seen = std::collections::HashSet::new();
    xpans.retain(|x| seen.insert(*x));
}

/// Domain alias resolution (spec §4.1): only `this` (the current network's
/// domain) or an exact domain name.
pub enum DomainAliasOutcome {
    One(EntityId),
    NotFound,
}

pub fn resolve_domain_alias(
    token: &str,
    domains: &[commissioner_types::Domain],
    current_domain: Option<EntityId>,
) -> DomainAliasOutcome {
    if token == "this" {
        return match current_domain {
            Some(id) => DomainAliasOutcome::One(id),
            None => DomainAliasOutcome::NotFound,
        };
    }
    match domains.iter().find(|d| d.name == token) {
        Some(d) => DomainAliasOutcome::One(d.id),
        None => DomainAliasOutcome::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commissioner_types::{EntityId, Pan};

    fn net(id: i64, name: &str, xpan: u64, pan: u16) -> Network {
        Network::new(
            EntityId(id),
            EntityId::EMPTY,
            name,
            Xpan(xpan),
            11,
            Pan(pan),
            "fd00::/64",
            false,
        )
    }

    #[test]
    fn this_without_current_is_not_found() {
        let networks = vec![net(0, "net1", 1, 0x10)];
        let r = resolve_network_aliases(&["this".into()], &networks, None).unwrap();
        assert!(r.resolved.is_empty());
        assert_eq!(r.unresolved, vec!["this".to_string()]);
    }

    #[test]
    fn this_with_current_resolves_to_current() {
        let networks = vec![net(0, "net1", 1, 0x10), net(1, "net2", 2, 0x20)];
        let r = resolve_network_aliases(&["this".into()], &networks, Some(Xpan(2))).unwrap();
        assert_eq!(r.resolved, vec![Xpan(2)]);
    }

    #[test]
    fn all_and_other() {
        let networks = vec![net(0, "net1", 1, 0x10), net(1, "net2", 2, 0x20)];
        let all = resolve_network_aliases(&["all".into()], &networks, Some(Xpan(1))).unwrap();
        assert_eq!(all.resolved, vec![Xpan(1), Xpan(2)]);

        let other = resolve_network_aliases(&["other".into()], &networks, Some(Xpan(1))).unwrap();
        assert_eq!(other.resolved, vec![Xpan(2)]);

        let other_none = resolve_network_aliases(&["other".into()], &networks, None).unwrap();
        assert_eq!(other_none.resolved, vec![Xpan(1), Xpan(2)]);
    }

    #[test]
    fn group_alias_cannot_combine() {
        let networks = vec![net(0, "net1", 1, 0x10)];
        let err = resolve_network_aliases(
            &["all".to_string(), "net1".to_string()],
            &networks,
            None,
        );
        assert!(err.is_err());
    }

    #[test]
    fn integer_wins_over_name_collision() {
        // Network A named "1" with xpan 0x10, network B named "net1" with xpan 0x20.
        let networks = vec![net(0, "1", 0x10, 1), net(1, "net1", 0x20, 2)];
        let r1 = resolve_network_aliases(&["1".into()], &networks, None).unwrap();
        // "1" does not parse as a u64 matching any xpan (no network has xpan=1),
        // so it falls through to name match -> network A.
        assert_eq!(r1.resolved, vec![Xpan(0x10)]);

        let r2 = resolve_network_aliases(&["net1".into()], &networks, None).unwrap();
        assert_eq!(r2.resolved, vec![Xpan(0x20)]);

        let r3 = resolve_network_aliases(&["0x20".into()], &networks, None).unwrap();
        assert_eq!(r3.resolved, vec![Xpan(0x20)]);
    }

    #[test]
    fn ambiguous_name_reported_as_unresolved() {
        let networks = vec![net(0, "dup", 1, 1), net(1, "dup", 2, 2)];
        let r = resolve_network_aliases(&["dup".into()], &networks, None).unwrap();
        assert!(r.resolved.is_empty());
        assert_eq!(r.unresolved, vec!["dup".to_string()]);

        match resolve_single_network_alias("dup", &networks, None).unwrap() {
            SingleAliasOutcome::Ambiguous => {}
            _ => panic!("expected ambiguity"),
        }
    }

    #[test]
    fn name_and_xpan_for_same_network_dedup_to_one() {
        let networks = vec![net(0, "net1", 0x42, 1)];
        let r = resolve_network_aliases(
            &["net1".to_string(), "66".to_string()],
            &networks,
            None,
        )
        .unwrap();
        assert_eq!(r.resolved, vec![Xpan(0x42)]);
    }
}
