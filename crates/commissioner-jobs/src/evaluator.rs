use crate::job::Evaluator;
use crate::session::Session;
use crate::value::Value;

type TableFn = fn(&dyn Session, &[String]) -> Value;

fn eval_start(session: &dyn Session, args: &[String]) -> Value {
    let address = args.first().cloned().unwrap_or_default();
    let port: u16 = args.get(1).and_then(|p| p.parse().ok()).unwrap_or(0);
    match session.start(&address, port) {
        Ok(()) => Value::text("started"),
        Err(e) => e.into(),
    }
}

fn eval_stop(session: &dyn Session, _args: &[String]) -> Value {
    match session.stop() {
        Ok(()) => Value::text("stopped"),
        Err(e) => e.into(),
    }
}

fn eval_active(session: &dyn Session, _args: &[String]) -> Value {
    Value::success(serde_json::Value::Bool(session.is_active()))
}

fn eval_sessionid(session: &dyn Session, _args: &[String]) -> Value {
    session.session_id().into()
}

fn eval_bbrdataset_get(session: &dyn Session, _args: &[String]) -> Value {
    session.bbr_dataset_get().into()
}

fn eval_commdataset_get(session: &dyn Session, _args: &[String]) -> Value {
    session.comm_dataset_get().into()
}

fn eval_opdataset_get_active(session: &dyn Session, _args: &[String]) -> Value {
    session.opdataset_get_active().into()
}

fn eval_opdataset_get_pending(session: &dyn Session, _args: &[String]) -> Value {
    session.opdataset_get_pending().into()
}

fn eval_opdataset_set_security_policy(session: &dyn Session, args: &[String]) -> Value {
    session.opdataset_set_security_policy(args).into()
}

fn eval_opdataset_set_active(session: &dyn Session, args: &[String]) -> Value {
    session.opdataset_set_active(args).into()
}

fn eval_opdataset_set_pending(session: &dyn Session, args: &[String]) -> Value {
    session.opdataset_set_pending(args).into()
}

fn eval_token_request(session: &dyn Session, _args: &[String]) -> Value {
    session.token_request().into()
}

/// Verbs that may run against a network whose Session is not currently
/// active (spec §4.2 "inactive-allowed").
pub fn is_inactive_allowed(verb: &str) -> bool {
    matches!(verb, "active" | "token request")
}

/// Static verb → evaluator table (spec §9 design note: "Dynamic dispatch
/// of command evaluators... modeled as a static table mapping verb to
/// function pointer").
fn lookup_table_fn(verb: &str) -> Option<TableFn> {
    Some(match verb {
        "start" => eval_start,
        "stop" => eval_stop,
        "active" => eval_active,
        "sessionid" => eval_sessionid,
        "bbrdataset get" => eval_bbrdataset_get,
        "commdataset get" => eval_commdataset_get,
        "opdataset get active" => eval_opdataset_get_active,
        "opdataset get pending" => eval_opdataset_get_pending,
        "opdataset set securitypolicy" => eval_opdataset_set_security_policy,
        "opdataset set active" => eval_opdataset_set_active,
        "opdataset set pending" => eval_opdataset_set_pending,
        "token request" => eval_token_request,
        _ => return None,
    })
}

/// Resolves a verb to a full `Evaluator`: a table entry when the verb is
/// one of the fixed commands, otherwise a generic `Session::invoke` call.
pub fn resolve(verb: &str) -> Evaluator {
    match lookup_table_fn(verb) {
        Some(f) => Evaluator::Table(f),
        None => Evaluator::Generic(verb.to_string()),
    }
}
