use std::path::{Path, PathBuf};

use commissioner_types::{
    BorderAgent, BorderRouter, Domain, EntityId, Error, Network, Result, Xpan,
};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::alias::{self, AliasResolution, DomainAliasOutcome, GroupAliasConflict, SingleAliasOutcome};
use crate::store::{StoreFile, StoreHandle};

/// A predicate for [`Registry::lookup_networks`] and friends: non-default
/// fields are ANDed together (spec §4.1 Lookup semantics). `None` means
/// "don't filter on this field".
#[derive(Debug, Clone, Default)]
pub struct NetworkPredicate {
    pub name: Option<String>,
    pub xpan: Option<Xpan>,
    pub domain_id: Option<EntityId>,
}

impl NetworkPredicate {
    fn matches(&self, n: &Network) -> bool {
        if let Some(name) = &self.name {
            if &n.name != name {
                return false;
            }
        }
        if let Some(xpan) = self.xpan {
            if n.xpan != xpan {
                return false;
            }
        }
        if let Some(domain_id) = self.domain_id {
            if n.domain_id != domain_id {
                return false;
            }
        }
        true
    }
}

struct Inner {
    handle: StoreHandle,
    store: StoreFile,
}

/// The persisted catalog of Border Routers, Networks and Domains (spec
/// §4.1). Registry calls are treated as non-concurrent within a process
/// (spec §5): this is enforced with a single mutex around the in-memory
/// cache, mirroring the single-writer discipline the spec calls for rather
/// than trying to allow readers and writers to interleave.
pub struct Registry {
    inner: Mutex<Inner>,
}

impl Registry {
    /// Opens the store at `path`, creating it if absent (spec §4.1 Open).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let (handle, store) = StoreHandle::open(path)?;
        Ok(Registry {
            inner: Mutex::new(Inner { handle, store }),
        })
    }

    pub fn path(&self) -> PathBuf {
        self.inner.lock().handle.path().to_path_buf()
    }

    fn with_store<R>(&self, f: impl FnOnce(&mut StoreFile) -> Result<R>) -> Result<R> {
        let mut guard = self.inner.lock();
        let result = f(&mut guard.store)?;
        guard.handle.save(&guard.store)?;
        Ok(result)
    }

    fn read_store<R>(&self, f: impl FnOnce(&StoreFile) -> R) -> R {
        let guard = self.inner.lock();
        f(&guard.store)
    }

    // ---- Domains ----------------------------------------------------

    pub fn get_all_domains(&self) -> Vec<Domain> {
        self.read_store(|s| s.dom.clone())
    }

    pub fn get_domain(&self, id: EntityId) -> Result<Domain> {
        self.read_store(|s| s.dom.iter().find(|d| d.id == id).cloned())
            .ok_or_else(|| Error::not_found(format!("domain {id} not found")))
    }

    fn find_or_create_domain(store: &mut StoreFile, name: &str) -> EntityId {
        if let Some(d) = store.dom.iter().find(|d| d.name == name) {
            return d.id;
        }
        let id = EntityId(store.dom_seq);
        store.dom_seq += 1;
        store.dom.push(Domain::new(id, name));
        id
    }

    fn delete_domain_if_orphaned(store: &mut StoreFile, domain_id: EntityId) {
        if domain_id.is_empty() {
            return;
        }
        let still_has_networks = store.nwk.iter().any(|n| n.domain_id == domain_id);
        if !still_has_networks {
            store.dom.retain(|d| d.id != domain_id);
            debug!(domain_id = %domain_id, "domain emptied, cascading delete");
        }
    }

    // ---- Networks -----------------------------------------------------

    pub fn get_all_networks(&self) -> Vec<Network> {
        self.read_store(|s| s.nwk.clone())
    }

    pub fn get_network(&self, id: EntityId) -> Result<Network> {
        self.read_store(|s| s.nwk.iter().find(|n| n.id == id).cloned())
            .ok_or_else(|| Error::not_found(format!("network {id} not found")))
    }

    pub fn get_network_by_xpan(&self, xpan: Xpan) -> Result<Network> {
        self.read_store(|s| s.nwk.iter().find(|n| n.xpan == xpan).cloned())
            .ok_or_else(|| Error::not_found(format!("network with xpan {xpan} not found")))
    }

    pub fn get_network_by_name(&self, name: &str) -> Result<Network> {
        let matches = self.read_store(|s| {
            s.nwk
                .iter()
                .filter(|n| n.name == name)
                .cloned()
                .collect::<Vec<_>>()
        });
        match matches.len() {
            0 => Err(Error::not_found(format!("network named {name} not found"))),
            1 => Ok(matches.into_iter().next().unwrap()),
            _ => Err(Error::ambiguity(format!(
                "{} networks are named {name}",
                matches.len()
            ))),
        }
    }

    pub fn get_network_by_pan(&self, pan: commissioner_types::Pan) -> Result<Network> {
        let matches = self.read_store(|s| {
            s.nwk
                .iter()
                .filter(|n| n.pan == pan)
                .cloned()
                .collect::<Vec<_>>()
        });
        match matches.len() {
            0 => Err(Error::not_found(format!("network with pan {} not found", pan.0))),
            1 => Ok(matches.into_iter().next().unwrap()),
            _ => Err(Error::ambiguity(format!(
                "{} networks have pan {}",
                matches.len(),
                pan.0
            ))),
        }
    }

    pub fn lookup_networks(&self, predicate: &NetworkPredicate) -> Vec<Network> {
        self.read_store(|s| {
            s.nwk
                .iter()
                .filter(|n| predicate.matches(n))
                .cloned()
                .collect()
        })
    }

    pub fn get_networks_in_domain(&self, domain_name: &str) -> Result<Vec<Network>> {
        let domain_id = self.read_store(|s| {
            s.dom.iter().find(|d| d.name == domain_name).map(|d| d.id)
        });
        let domain_id = domain_id.ok_or_else(|| {
            Error::not_found(format!("domain {domain_name} not found"))
        })?;
        Ok(self.lookup_networks(&NetworkPredicate {
            domain_id: Some(domain_id),
            ..Default::default()
        }))
    }

    pub fn update_network(&self, network: Network) -> Result<()> {
        self.with_store(|s| {
            let slot = s
                .nwk
                .iter_mut()
                .find(|n| n.id == network.id)
                .ok_or_else(|| Error::not_found(format!("network {} not found", network.id)))?;
            *slot = network;
            Ok(())
        })
    }

    // ---- Current network cursor ---------------------------------------

    pub fn get_current_network(&self) -> Result<Network> {
        let id = self.read_store(|s| EntityId(s.cur_nwk));
        if id.is_empty() {
            return Err(Error::not_found("no network currently selected"));
        }
        self.get_network(id)
    }

    pub fn set_current_network(&self, xpan: Xpan) -> Result<()> {
        self.with_store(|s| {
            let id = s
                .nwk
                .iter()
                .find(|n| n.xpan == xpan)
                .map(|n| n.id)
                .ok_or_else(|| Error::not_found(format!("network with xpan {xpan} not found")))?;
            s.cur_nwk = id.0;
            Ok(())
        })
    }

    pub fn forget_current_network(&self) -> Result<()> {
        self.with_store(|s| {
            s.cur_nwk = EntityId::EMPTY.0;
            Ok(())
        })
    }

    fn current_network_id(store: &StoreFile) -> EntityId {
        EntityId(store.cur_nwk)
    }

    // ---- Border routers --------------------------------------------------

    pub fn get_all_border_routers(&self) -> Vec<BorderRouter> {
        self.read_store(|s| s.br.clone())
    }

    pub fn get_border_router(&self, id: EntityId) -> Result<BorderRouter> {
        self.read_store(|s| s.br.iter().find(|r| r.id == id).cloned())
            .ok_or_else(|| Error::not_found(format!("border router {id} not found")))
    }

    pub fn get_border_routers_in_network(&self, xpan: Xpan) -> Result<Vec<BorderRouter>> {
        let network_id = self
            .read_store(|s| s.nwk.iter().find(|n| n.xpan == xpan).map(|n| n.id))
            .ok_or_else(|| Error::not_found(format!("network with xpan {xpan} not found")))?;
        Ok(self.read_store(|s| {
            s.br.iter()
                .filter(|r| r.network_id == network_id)
                .cloned()
                .collect()
        }))
    }

    /// Ingests a discovered/user-supplied `BorderAgent`: materializes the
    /// parent Domain and Network if they do not yet exist, then inserts or
    /// updates the BorderRouter keyed by `(address, port, extended_pan_id)`
    /// (spec §3 lifecycles, §4.1 `Add(BorderAgent)`).
    pub fn add_border_agent(&self, agent: BorderAgent) -> Result<EntityId> {
        self.with_store(|s| {
            let domain_id = match &agent.domain_name {
                Some(name) if !name.is_empty() => Self::find_or_create_domain(s, name),
                _ => EntityId::EMPTY,
            };

            let xpan = agent.extended_pan_id.unwrap_or(Xpan::EMPTY);
            let network_name = agent.network_name.clone().unwrap_or_default();

            // Name/xpan uniqueness (spec §3): a non-empty name already used by
            // a different xpan is a conflict, not a silent rename.
            if !network_name.is_empty() && !xpan.is_empty() {
                if let Some(other) = s.nwk.iter().find(|n| n.name == network_name) {
                    if other.xpan != xpan {
                        return Err(Error::registry_error(format!(
                            "network name {network_name} already used by a different xpan"
                        )));
                    }
                }
            }

            let network_id = if let Some(existing) = s.nwk.iter().find(|n| n.xpan == xpan && !xpan.is_empty())
            {
                existing.id
            } else if !network_name.is_empty() && s.nwk.iter().any(|n| n.name == network_name) {
                s.nwk.iter().find(|n| n.name == network_name).unwrap().id
            } else {
                let id = EntityId(s.nwk_seq);
                s.nwk_seq += 1;
                s.nwk.push(Network::new(
                    id,
                    domain_id,
                    network_name.clone(),
                    xpan,
                    0,
                    commissioner_types::Pan(0),
                    String::new(),
                    false,
                ));
                id
            };

            let key = (agent.address.clone(), agent.port, agent.extended_pan_id);
            if let Some(existing) = s
                .br
                .iter_mut()
                .find(|r| (r.agent.address.clone(), r.agent.port, r.agent.extended_pan_id) == key)
            {
                existing.agent = agent;
                existing.network_id = network_id;
                return Ok(existing.id);
            }

            let id = EntityId(s.br_seq);
            s.br_seq += 1;
            s.br.push(BorderRouter::new(id, network_id, agent));
            Ok(id)
        })
    }

    /// Deletes a BorderRouter by id, cascading to its Network and that
    /// Network's Domain when they become empty (spec §3, §8). Refuses the
    /// delete if it would remove the last router of the currently selected
    /// network (spec §4.1 Restricted operations).
    pub fn delete_border_router_by_id(&self, id: EntityId) -> Result<()> {
        self.with_store(|s| {
            let router = s
                .br
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| Error::not_found(format!("border router {id} not found")))?;

            let cur = Self::current_network_id(s);
            if router.network_id == cur && !cur.is_empty() {
                let siblings = s.br.iter().filter(|r| r.network_id == cur).count();
                if siblings <= 1 {
                    return Err(Error::restricted(
                        "cannot delete the last border router of the currently selected network",
                    ));
                }
            }

            s.br.retain(|r| r.id != id);

            let still_has_routers = s.br.iter().any(|r| r.network_id == router.network_id);
            if !still_has_routers && !router.network_id.is_empty() {
                let domain_id = s
                    .nwk
                    .iter()
                    .find(|n| n.id == router.network_id)
                    .map(|n| n.domain_id);
                s.nwk.retain(|n| n.id != router.network_id);
                if let Some(domain_id) = domain_id {
                    Self::delete_domain_if_orphaned(s, domain_id);
                }
            }
            Ok(())
        })
    }

    pub fn delete_border_routers_in_networks(&self, xpans: &[Xpan]) -> Result<()> {
        for xpan in xpans {
            let ids = self.read_store(|s| {
                let network_id = s.nwk.iter().find(|n| n.xpan == *xpan).map(|n| n.id);
                match network_id {
                    Some(nid) => s
                        .br
                        .iter()
                        .filter(|r| r.network_id == nid)
                        .map(|r| r.id)
                        .collect::<Vec<_>>(),
                    None => Vec::new(),
                }
            });
            for id in ids {
                self.delete_border_router_by_id(id)?;
            }
        }
        Ok(())
    }

    pub fn delete_border_routers_in_domain(&self, domain_name: &str) -> Result<()> {
        let networks = self.get_networks_in_domain(domain_name)?;
        let xpans: Vec<Xpan> = networks.iter().map(|n| n.xpan).collect();
        self.delete_border_routers_in_networks(&xpans)
    }

    // ---- Alias resolution ------------------------------------------------

    /// Resolves the `--nwk` selector's alias tokens (spec §4.1).
    pub fn resolve_network_aliases(
        &self,
        tokens: &[String],
    ) -> std::result::Result<AliasResolution, GroupAliasConflict> {
        let networks = self.get_all_networks();
        let current = self.get_current_network().ok().map(|n| n.xpan);
        let resolution = alias::resolve_network_aliases(tokens, &networks, current)?;
        if !resolution.unresolved.is_empty() {
            warn!(unresolved = ?resolution.unresolved, "some network aliases did not resolve");
        }
        Ok(resolution)
    }

    pub fn resolve_single_network_alias(&self, token: &str) -> Result<SingleAliasOutcome> {
        let networks = self.get_all_networks();
        let current = self.get_current_network().ok().map(|n| n.xpan);
        alias::resolve_single_network_alias(token, &networks, current)
            .map_err(|_| Error::invalid_args(format!("'{token}' cannot be combined with other aliases")))
    }

    /// Resolves the `--dom` selector's alias (spec §4.1).
    pub fn resolve_domain_alias(&self, token: &str) -> Result<EntityId> {
        let domains = self.get_all_domains();
        let current_domain = self
            .get_current_network()
            .ok()
            .map(|n| n.domain_id)
            .filter(|id| !id.is_empty());
        match alias::resolve_domain_alias(token, &domains, current_domain) {
            DomainAliasOutcome::One(id) => Ok(id),
            DomainAliasOutcome::NotFound => {
                Err(Error::not_found(format!("domain '{token}' not found")))
            }
        }
    }
}
