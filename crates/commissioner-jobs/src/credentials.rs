use commissioner_registry::Registry;
use commissioner_types::{Error, Network, Result, Xpan};
use tracing::warn;

/// A credential file kind a `CredentialStore` is asked to locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Certificate,
    Pskc,
}

/// Where credential bytes come from (spec §4.2 "Credential resolution").
/// A non-empty loaded byte string counts as "present"; a directory miss is
/// not itself an error, only a missing credential is.
pub trait CredentialStore: Send + Sync {
    fn load_domain(&self, domain_name: &str, kind: CredentialKind) -> Option<Vec<u8>>;
    fn load_network(&self, key: &str, kind: CredentialKind) -> Option<Vec<u8>>;
}

/// A filesystem-backed `CredentialStore`: `<root>/domains/<name>/{cert,pskc}`
/// and `<root>/networks/<key>/{cert,pskc}`.
#[derive(Debug, Clone)]
pub struct DirCredentialStore {
    root: std::path::PathBuf,
}

impl DirCredentialStore {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        DirCredentialStore { root: root.into() }
    }

    fn file_name(kind: CredentialKind) -> &'static str {
        match kind {
            CredentialKind::Certificate => "cert",
            CredentialKind::Pskc => "pskc",
        }
    }

    fn read(path: std::path::PathBuf) -> Option<Vec<u8>> {
        match std::fs::read(&path) {
            Ok(bytes) if !bytes.is_empty() => Some(bytes),
            _ => None,
        }
    }
}

impl CredentialStore for DirCredentialStore {
    fn load_domain(&self, domain_name: &str, kind: CredentialKind) -> Option<Vec<u8>> {
        Self::read(
            self.root
                .join("domains")
                .join(domain_name)
                .join(Self::file_name(kind)),
        )
    }

    fn load_network(&self, key: &str, kind: CredentialKind) -> Option<Vec<u8>> {
        Self::read(
            self.root
                .join("networks")
                .join(key)
                .join(Self::file_name(kind)),
        )
    }
}

/// What a prepared Session needs to hand the DTLS layer: raw bytes, not
/// parsed material - parsing them is out of core scope (spec §1 Non-goals).
#[derive(Debug, Clone, Default)]
pub struct ResolvedCredentials {
    pub certificate: Option<Vec<u8>>,
    pub pskc: Option<Vec<u8>>,
}

impl ResolvedCredentials {
    pub fn is_empty(&self) -> bool {
        self.certificate.is_none() && self.pskc.is_none()
    }
}

pub struct CredentialResolver<'a> {
    store: &'a dyn CredentialStore,
}

impl<'a> CredentialResolver<'a> {
    pub fn new(store: &'a dyn CredentialStore) -> Self {
        CredentialResolver { store }
    }

    /// Decides what credential modes `network` requires from its
    /// BorderRouters' advertised connection modes, then loads them,
    /// domain-directory-first for non-default-domain CCM networks
    /// (spec §4.2).
    pub fn resolve(&self, registry: &Registry, network: &Network) -> Result<ResolvedCredentials> {
        let routers = registry.get_border_routers_in_network(network.xpan)?;

        let mut needs_cert = false;
        let mut needs_pskc = false;
        for router in &routers {
            let mode = router.agent.state_bitmap.connection_mode;
            if mode.requires_certificate() {
                needs_cert = true;
            }
            if mode.requires_pskc() {
                needs_pskc = true;
            }
        }

        if !needs_cert && !needs_pskc {
            return Ok(ResolvedCredentials::default());
        }

        let domain = if network.domain_id.is_empty() {
            None
        } else {
            registry.get_domain(network.domain_id).ok()
        };

        let mut resolved = ResolvedCredentials::default();
        if needs_cert {
            resolved.certificate = self.load_one(domain.as_ref().map(|d| d.name.as_str()), network, CredentialKind::Certificate);
        }
        if needs_pskc {
            let pskc = self.load_one(domain.as_ref().map(|d| d.name.as_str()), network, CredentialKind::Pskc);
            if network.ccm && resolved.certificate.is_some() && pskc.is_some() {
                warn!(network = %network.name, "PSKc present alongside certificate on a CCM network, ignoring it");
            } else {
                resolved.pskc = pskc;
            }
        }

        let missing_cert = needs_cert && resolved.certificate.is_none();
        let missing_pskc = needs_pskc && resolved.pskc.is_none() && !(network.ccm && resolved.certificate.is_some());
        if missing_cert || missing_pskc {
            return Err(Error::security(format!(
                "incomplete DTLS credentials for network {} (xpan {})",
                network.name, network.xpan
            )));
        }

        Ok(resolved)
    }

    fn load_one(&self, domain_name: Option<&str>, network: &Network, kind: CredentialKind) -> Option<Vec<u8>> {
        if let Some(name) = domain_name {
            if let Some(bytes) = self.store.load_domain(name, kind) {
                return Some(bytes);
            }
        }

        if let Some(bytes) = self.store.load_network(&network.xpan.to_hex(), kind) {
            return Some(bytes);
        }
        self.store.load_network(&network.name, kind)
    }
}

pub fn network_dir_key(xpan: Xpan) -> String {
    xpan.to_hex()
}
