use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use commissioner_registry::Registry;
use commissioner_types::{
    BorderRouter, Error, Network, Result, ThreadIfStatus, Xpan,
};
use tracing::{info, warn};

use crate::credentials::{CredentialResolver, CredentialStore, ResolvedCredentials};
use crate::evaluator;
use crate::job::{Job, JobState};
use crate::session::{Session, SessionFactory};
use crate::value::Value;

/// Given a parsed command and a target-set of xpans: obtains a Session per
/// target (creating it on demand), runs each instance concurrently, and
/// collects results (spec §4.2).
pub struct JobManager {
    registry: Arc<Registry>,
    credential_store: Arc<dyn CredentialStore>,
    session_factory: Arc<dyn SessionFactory>,
    sessions: Mutex<HashMap<Xpan, Arc<dyn Session>>>,
    jobs: Mutex<Vec<Job>>,
    import_file: Mutex<Option<PathBuf>>,
}

impl JobManager {
    pub fn new(
        registry: Arc<Registry>,
        credential_store: Arc<dyn CredentialStore>,
        session_factory: Arc<dyn SessionFactory>,
    ) -> Self {
        JobManager {
            registry,
            credential_store,
            session_factory,
            sessions: Mutex::new(HashMap::new()),
            jobs: Mutex::new(Vec::new()),
            import_file: Mutex::new(None),
        }
    }

    // ---- Session pool ---------------------------------------------------

    /// Returns the pooled Session for `xpan`, creating it (with resolved
    /// credentials) if absent. `Xpan::EMPTY` is reserved for the default
    /// Session, which needs no credentials (no network is selected).
    pub fn session_for(&self, xpan: Xpan) -> Result<Arc<dyn Session>> {
        if let Some(existing) = self.sessions.lock().unwrap().get(&xpan).cloned() {
            return Ok(existing);
        }

        let credentials = if xpan.is_empty() {
            ResolvedCredentials::default()
        } else {
            let network = self.registry.get_network_by_xpan(xpan)?;
            let resolver = CredentialResolver::new(self.credential_store.as_ref());
            resolver.resolve(&self.registry, &network)?
        };

        let session = Arc::from(self.session_factory.new_session(&credentials));
        self.sessions.lock().unwrap().insert(xpan, Arc::clone(&session));
        Ok(session)
    }

    /// Supplemented operation: the Session currently bound to the
    /// selected network, if any (originally `GetSelectedCommissioner`).
    pub fn get_selected_commissioner(&self) -> Result<Arc<dyn Session>> {
        let network = self.registry.get_current_network()?;
        self.session_for(network.xpan)
    }

    // ---- Import auxiliary ------------------------------------------------

    pub fn set_import_file(&self, path: impl Into<PathBuf>) {
        *self.import_file.lock().unwrap() = Some(path.into());
    }

    pub fn clear_import_file(&self) {
        *self.import_file.lock().unwrap() = None;
    }

    /// Loads the import file (if any) and selects the sub-object for
    /// `xpan`, falling back to the whole document for a single-entry
    /// import (spec §4.2 "Import auxiliary").
    fn import_argument_for(&self, xpan: Xpan) -> Result<Option<String>> {
        let path = match self.import_file.lock().unwrap().clone() {
            Some(p) => p,
            None => return Ok(None),
        };
        let bytes = std::fs::read(&path)?;
        let doc: serde_json::Value = serde_json::from_slice(&bytes)?;

        let key = xpan.to_hex();
        let selected = match &doc {
            serde_json::Value::Object(map) if map.contains_key(&key) => map[&key].clone(),
            other => other.clone(),
        };
        Ok(Some(selected.to_string()))
    }

    // ---- Fan-out: best-BorderRouter tie-break for `start` ----------------

    /// Picks the BorderRouter `start` should target, applying the CCM and
    /// non-CCM tie-break ladders (spec §4.2 "Fan-out policy").
    pub fn pick_best_border_router(network: &Network, routers: &[BorderRouter]) -> Result<BorderRouter> {
        let candidates: Vec<&BorderRouter> = if network.ccm {
            let primary_active = routers
                .iter()
                .filter(|r| r.agent.state_bitmap.bbr_is_active && r.agent.state_bitmap.bbr_is_primary)
                .collect::<Vec<_>>();
            if !primary_active.is_empty() {
                primary_active
            } else {
                routers
                    .iter()
                    .filter(|r| r.agent.state_bitmap.bbr_is_active)
                    .collect()
            }
        } else {
            routers
                .iter()
                .filter(|r| !r.agent.state_bitmap.connection_mode.is_disallowed())
                .collect()
        };

        if candidates.is_empty() {
            return Err(Error::not_found("no active BR found"));
        }

        let best = candidates
            .iter()
            .max_by_key(|r| match r.agent.state_bitmap.thread_if_status {
                ThreadIfStatus::Active if r.agent.state_bitmap.availability == commissioner_types::Availability::High => 3,
                ThreadIfStatus::Active => 2,
                ThreadIfStatus::Initialized => 1,
                ThreadIfStatus::Unknown => 0,
            })
            .copied()
            .ok_or_else(|| Error::not_found("no active BR found"))?;

        if matches!(best.agent.state_bitmap.thread_if_status, ThreadIfStatus::Unknown) {
            return Err(Error::not_found("no active BR found"));
        }

        Ok(best.clone())
    }

    // ---- Job preparation and execution -----------------------------------

    /// Prepares one job per target xpan. For `start`, resolves the best
    /// BorderRouter per network first and seeds its address/port as the
    /// job's leading arguments. For every other fan-out-eligible verb,
    /// networks whose Session is not active are skipped with a warning
    /// unless the verb is inactive-allowed.
    pub fn prepare_jobs(&self, xpans: &[Xpan], verb: &str, args: &[String]) -> Result<()> {
        let mut prepared = Vec::new();

        for &xpan in xpans {
            let mut job_args = args.to_vec();

            if verb == "start" {
                let network = self.registry.get_network_by_xpan(xpan)?;
                let routers = self.registry.get_border_routers_in_network(xpan)?;
                let router = match Self::pick_best_border_router(&network, &routers) {
                    Ok(r) => r,
                    Err(e) => {
                        warn!(network = %network.name, error = %e, "start: no eligible border router");
                        continue;
                    }
                };
                job_args = vec![router.agent.address.clone(), router.agent.port.to_string()];
                job_args.extend(args.iter().cloned());
            } else {
                let session_active = self
                    .sessions
                    .lock()
                    .unwrap()
                    .get(&xpan)
                    .map(|s| s.is_active())
                    .unwrap_or(false);
                if !session_active && verb != "stop" && !evaluator::is_inactive_allowed(verb) {
                    warn!(xpan = %xpan, verb, "skipping network with no active session");
                    continue;
                }
                if verb == "stop" && !session_active {
                    // Already stopped: silently succeed without a job.
                    continue;
                }
            }

            if let Some(import) = self.import_argument_for(xpan)? {
                job_args.push(import);
            }

            let session = self.session_for(xpan)?;
            let eval = evaluator::resolve(verb);
            prepared.push(Job::new(xpan, session, job_args, eval));
        }

        *self.jobs.lock().unwrap() = prepared;
        Ok(())
    }

    /// Spawns one worker thread per prepared job and blocks until all
    /// have joined (spec §4.2 "RunJobs").
    pub fn run_jobs(&self) {
        let mut jobs = std::mem::take(&mut *self.jobs.lock().unwrap());
        std::thread::scope(|scope| {
            let handles: Vec<_> = jobs
                .iter_mut()
                .map(|job| scope.spawn(move || job.run()))
                .collect();
            for handle in handles {
                let _ = handle.join();
            }
        });
        *self.jobs.lock().unwrap() = jobs;
    }

    /// Calls `Cancel` on every currently prepared/running job, then waits
    /// for them to join. May be called from another thread (spec §4.2
    /// "CancelCommand").
    pub fn cancel_command(&self) {
        for job in self.jobs.lock().unwrap().iter() {
            job.cancel();
        }
    }

    /// Collects successful job results into a JSON object keyed by
    /// xpan-as-16-hex-digits; failed jobs are logged and omitted (spec
    /// §4.2 "Result aggregation").
    pub fn collect_jobs_value(&self) -> serde_json::Value {
        let mut out = serde_json::Map::new();
        for job in self.jobs.lock().unwrap().iter() {
            match job.result() {
                Some(Value::Success(v)) => {
                    out.insert(job.xpan.to_hex(), v.clone());
                }
                Some(Value::Failure(e)) => {
                    warn!(xpan = %job.xpan, error = %e, "job failed");
                }
                None => {}
            }
        }
        serde_json::Value::Object(out)
    }

    // ---- Supplemented operations (originally part of the Job Manager) ---

    /// Whether the job pool holds no prepared/running/joined jobs.
    pub fn is_clean(&self) -> bool {
        self.jobs.lock().unwrap().is_empty()
    }

    /// Drops all Joined jobs once their aggregate has been collected,
    /// returning the manager to `is_clean`.
    pub fn cleanup_jobs(&self) {
        self.jobs
            .lock()
            .unwrap()
            .retain(|job| job.state() != JobState::Joined);
    }

    /// Stops every pooled Session, draining the pool (used on shutdown
    /// and before process exit).
    pub fn stop_commissioner_pool(&self) {
        let sessions = std::mem::take(&mut *self.sessions.lock().unwrap());
        for (xpan, session) in sessions {
            if let Err(e) = session.stop() {
                warn!(%xpan, error = %e, "failed to stop session during pool shutdown");
            }
        }
        info!("commissioner pool stopped");
    }
}
