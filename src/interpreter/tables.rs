//! The fixed verb tables a command's eligibility is checked against
//! (spec §4.3). Verbs are the normalized, space-joined, lowercased verb
//! + subcommand tokens, e.g. `"opdataset set active"`.

pub const MULTI_NETWORK_SUPPORTED: &[&str] = &[
    "start",
    "stop",
    "active",
    "sessionid",
    "bbrdataset get",
    "commdataset get",
    "opdataset get active",
    "opdataset get pending",
    "opdataset set securitypolicy",
    "br list",
    "br delete",
    "br scan",
    "domain list",
    "network list",
    "token request",
];

pub const MULTI_JOB: &[&str] = &[
    "start",
    "stop",
    "active",
    "sessionid",
    "bbrdataset get",
    "commdataset get",
    "opdataset get active",
    "opdataset get pending",
    "opdataset set securitypolicy",
    "opdataset set active",
    "opdataset set pending",
];

pub const INACTIVE_ALLOWED: &[&str] = &["active", "token request"];

pub const EXPORT_SUPPORTED: &[&str] = &[
    "bbrdataset get",
    "commdataset get",
    "opdataset get active",
    "opdataset get pending",
    "br scan",
];

pub const IMPORT_SUPPORTED: &[&str] = &["opdataset set active", "opdataset set pending"];

pub fn is_multi_network_supported(verb: &str) -> bool {
    MULTI_NETWORK_SUPPORTED.contains(&verb)
}

pub fn is_multi_job(verb: &str) -> bool {
    MULTI_JOB.contains(&verb)
}

pub fn is_inactive_allowed(verb: &str) -> bool {
    INACTIVE_ALLOWED.contains(&verb)
}

pub fn is_export_supported(verb: &str) -> bool {
    EXPORT_SUPPORTED.contains(&verb)
}

pub fn is_import_supported(verb: &str) -> bool {
    IMPORT_SUPPORTED.contains(&verb)
}
