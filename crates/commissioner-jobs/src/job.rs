use std::sync::Arc;

use commissioner_types::Xpan;

use crate::session::Session;
use crate::value::Value;

/// A verb-specific evaluator: given a live Session and the residual
/// argument list, produce a Value (spec §4.2: "an evaluator, a function
/// chosen from a fixed table keyed by command verb"). Verbs outside the
/// fixed table fall through to `Session::invoke`.
#[derive(Clone)]
pub enum Evaluator {
    Table(fn(&dyn Session, &[String]) -> Value),
    Generic(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Prepared,
    Running,
    Joined,
}

/// One command-instance against one network (spec §4.2 job lifecycle).
/// Owns a Session shared only with other jobs targeting the same xpan,
/// never with jobs on other networks.
pub struct Job {
    pub xpan: Xpan,
    session: Arc<dyn Session>,
    args: Vec<String>,
    evaluator: Evaluator,
    state: JobState,
    result: Option<Value>,
}

impl Job {
    pub fn new(xpan: Xpan, session: Arc<dyn Session>, args: Vec<String>, evaluator: Evaluator) -> Self {
        Job {
            xpan,
            session,
            args,
            evaluator,
            state: JobState::Prepared,
            result: None,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// Runs the evaluator against this job's Session on the calling
    /// thread. The manager is responsible for calling this from a
    /// dedicated worker thread per job.
    pub fn run(&mut self) {
        self.state = JobState::Running;
        let value = match &self.evaluator {
            Evaluator::Table(f) => f(self.session.as_ref(), &self.args),
            Evaluator::Generic(verb) => self.session.invoke(verb, &self.args).into(),
        };
        self.result = Some(value);
        self.state = JobState::Joined;
    }

    /// Requests cancellation of any in-flight operation on this job's
    /// Session. Safe to call from any thread (spec §4.2).
    pub fn cancel(&self) {
        self.session.cancel_requests();
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("xpan", &self.xpan)
            .field("state", &self.state)
            .finish()
    }
}
