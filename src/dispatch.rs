//! Glues the interpreter's parsed command to the Registry, Job Manager
//! and discovery engine (spec §4.3's routing rules).

use std::sync::Arc;
use std::time::Duration;

use commissioner_jobs::JobManager;
use commissioner_registry::{NetworkPredicate, Registry};
use commissioner_types::{Error, Result, Xpan};
use tracing::{info, warn};

use crate::interpreter::ParsedCommand;

pub struct Dispatcher {
    pub registry: Arc<Registry>,
    pub jobs: Arc<JobManager>,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>, jobs: Arc<JobManager>) -> Self {
        Dispatcher { registry, jobs }
    }

    /// Resolves the target xpan set for `cmd` (spec §4.3's selector
    /// precedence: `--nwk` > `--dom` > current network > default
    /// Session), then routes it to the Registry (catalog verbs), the
    /// fan-out path, or a single synchronous job.
    pub fn run(&self, cmd: &ParsedCommand) -> Result<serde_json::Value> {
        if let Some(value) = self.run_catalog(cmd)? {
            return Ok(value);
        }

        let targets = self.resolve_targets(cmd)?;

        if let Some(import_path) = &cmd.selectors.import {
            self.jobs.set_import_file(import_path);
        }

        let result = if cmd.runs_via_fan_out() {
            self.jobs.prepare_jobs(&targets, &cmd.verb, &cmd.args)?;
            self.jobs.run_jobs();
            let aggregate = self.jobs.collect_jobs_value();
            self.jobs.cleanup_jobs();
            Ok(aggregate)
        } else {
            // Synchronous path: a single alias resolution already happened
            // in `resolve_targets`, but that resolution can still expand to
            // several networks (e.g. `--dom` naming a multi-network
            // domain); run one job per resolved target and aggregate, the
            // same shape `collect_jobs_value` already produces.
            self.jobs.prepare_jobs(&targets, &cmd.verb, &cmd.args)?;
            self.jobs.run_jobs();
            let aggregate = self.jobs.collect_jobs_value();
            self.jobs.cleanup_jobs();
            if targets.len() == 1 {
                Ok(aggregate.get(targets[0].to_hex()).cloned().unwrap_or(serde_json::Value::Null))
            } else {
                Ok(aggregate)
            }
        };

        if cmd.selectors.import.is_some() {
            self.jobs.clear_import_file();
        }

        let result = result?;

        if let Some(export_path) = &cmd.selectors.export {
            std::fs::write(export_path, result.to_string())?;
        }

        Ok(result)
    }

    /// Handles the Registry-backed catalog verbs (spec §4.1:
    /// `GetAllBorderRouters`/`GetAllNetworks`/`GetAllDomains`,
    /// `DeleteBorderRoutersInNetworks`/`InDomain`). These are pure catalog
    /// queries/mutations, not per-network Session operations, so they
    /// never go through the Job Manager - the same reasoning that keeps
    /// `br scan` routed to the discovery engine instead of a Session.
    /// Returns `None` for every other verb, which falls through to the
    /// Job Manager path.
    fn run_catalog(&self, cmd: &ParsedCommand) -> Result<Option<serde_json::Value>> {
        match cmd.verb.as_str() {
            "br list" => {
                let routers = match self.resolve_selector_networks(cmd)? {
                    Some(xpans) => {
                        let mut routers = Vec::new();
                        for xpan in xpans {
                            routers.extend(self.registry.get_border_routers_in_network(xpan)?);
                        }
                        routers
                    }
                    None => self.registry.get_all_border_routers(),
                };
                Ok(Some(serde_json::to_value(routers).unwrap_or(serde_json::Value::Null)))
            }
            "br delete" => {
                let xpans = self.resolve_selector_networks(cmd)?.ok_or_else(|| {
                    Error::invalid_args("'br delete' requires --nwk or --dom to select a target")
                })?;
                self.registry.delete_border_routers_in_networks(&xpans)?;
                Ok(Some(serde_json::Value::Null))
            }
            "network list" => {
                let networks = match self.resolve_selector_networks(cmd)? {
                    Some(xpans) => xpans
                        .into_iter()
                        .map(|xpan| self.registry.get_network_by_xpan(xpan))
                        .collect::<Result<Vec<_>>>()?,
                    None => self.registry.get_all_networks(),
                };
                Ok(Some(serde_json::to_value(networks).unwrap_or(serde_json::Value::Null)))
            }
            "domain list" => {
                let domains = match self.resolve_selector_networks(cmd)? {
                    Some(xpans) => {
                        let mut domain_ids = Vec::new();
                        for xpan in xpans {
                            let network = self.registry.get_network_by_xpan(xpan)?;
                            if !network.domain_id.is_empty() && !domain_ids.contains(&network.domain_id) {
                                domain_ids.push(network.domain_id);
                            }
                        }
                        domain_ids
                            .into_iter()
                            .map(|id| self.registry.get_domain(id))
                            .collect::<Result<Vec<_>>>()?
                    }
                    None => self.registry.get_all_domains(),
                };
                Ok(Some(serde_json::to_value(domains).unwrap_or(serde_json::Value::Null)))
            }
            _ => Ok(None),
        }
    }

    /// Resolves `--nwk`/`--dom` to a concrete xpan set, or `None` when
    /// neither selector is present (meaning "every network" for the
    /// catalog verbs above - unlike `resolve_targets`, this never falls
    /// back to the current network or the default Session).
    fn resolve_selector_networks(&self, cmd: &ParsedCommand) -> Result<Option<Vec<Xpan>>> {
        if let Some(tokens) = &cmd.selectors.nwk {
            let resolution = self
                .registry
                .resolve_network_aliases(tokens)
                .map_err(|_| Error::invalid_args("group aliases cannot combine with individual aliases"))?;
            if !resolution.unresolved.is_empty() {
                warn!(unresolved = ?resolution.unresolved, "some --nwk aliases did not resolve");
            }
            return Ok(Some(resolution.resolved));
        }

        if let Some(name) = &cmd.selectors.dom {
            let domain_id = self.registry.resolve_domain_alias(name)?;
            let networks = self.registry.lookup_networks(&NetworkPredicate {
                domain_id: Some(domain_id),
                ..Default::default()
            });
            return Ok(Some(networks.into_iter().map(|n| n.xpan).collect()));
        }

        Ok(None)
    }

    fn resolve_targets(&self, cmd: &ParsedCommand) -> Result<Vec<Xpan>> {
        if let Some(xpans) = self.resolve_selector_networks(cmd)? {
            return Ok(xpans);
        }

        if cmd.inactive_allowed {
            return Ok(vec![Xpan::EMPTY]);
        }

        match self.registry.get_current_network() {
            Ok(network) => Ok(vec![network.xpan]),
            Err(_) => Ok(vec![Xpan::EMPTY]),
        }
    }

    /// `br scan`: runs discovery synchronously for up to `timeout`,
    /// ingesting every discovered BorderAgent into the registry as it
    /// arrives.
    pub fn scan(&self, timeout: Duration, interface: Option<String>) -> Result<usize> {
        let registry = Arc::clone(&self.registry);
        let session = commissioner_discovery::discover(interface, timeout, move |agent| {
            match registry.add_border_agent(agent) {
                Ok(id) => info!(%id, "discovered border agent"),
                Err(e) => warn!(error = %e, "failed to ingest discovered border agent"),
            }
        });
        match session.join() {
            Ok(count) => Ok(count),
            Err(e) if e.is_restricted() => Err(e),
            Err(e) => {
                // Cancelled scans still deliver buffered records; only
                // genuine failures propagate past a warning.
                warn!(error = %e, "discovery scan ended early");
                Ok(0)
            }
        }
    }
}
