use commissioner_types::Error;

/// The result of evaluating one command expression against one Session: an
/// elementary JSON value, a boolean, a string - or an error (spec §4.2
/// "Result aggregation", originally `Interpreter::Value`).
#[derive(Debug, Clone)]
pub enum Value {
    Success(serde_json::Value),
    Failure(Error),
}

impl Value {
    pub fn success(v: impl Into<serde_json::Value>) -> Self {
        Value::Success(v.into())
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Success(serde_json::Value::String(s.into()))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Value::Success(_))
    }

    pub fn as_error(&self) -> Option<&Error> {
        match self {
            Value::Failure(e) => Some(e),
            Value::Success(_) => None,
        }
    }
}

impl From<Error> for Value {
    fn from(e: Error) -> Self {
        Value::Failure(e)
    }
}

impl From<commissioner_types::Result<serde_json::Value>> for Value {
    fn from(r: commissioner_types::Result<serde_json::Value>) -> Self {
        match r {
            Ok(v) => Value::Success(v),
            Err(e) => Value::Failure(e),
        }
    }
}

impl From<commissioner_types::Result<Value>> for Value {
    fn from(r: commissioner_types::Result<Value>) -> Self {
        match r {
            Ok(v) => v,
            Err(e) => Value::Failure(e),
        }
    }
}
