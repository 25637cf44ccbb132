use serde::Serialize;
use warp::reject;

use crate::errors::BackendError;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: BackendError,
}

impl Rejection {
    pub fn new(context: Context, error: BackendError) -> Self {
        Rejection { context, error }
    }

    pub fn flatten(&self) -> FlattenedRejection {
        FlattenedRejection {
            context: self.context.clone(),
            message: format!("{}", self.error),
        }
    }
}

// `From<Rejection> for warp::Rejection` is provided by warp's blanket
// `impl<T: Reject> From<T> for Rejection`, which calls `reject::custom`.
impl reject::Reject for Rejection {}

#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    #[serde(flatten)]
    pub(crate) context: Context,
    pub(crate) message: String,
}

/// What was being attempted when the error occurred.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Context {
    Count,
    Create,
    Decode,
    Delete { id: String },
    List,
    Retrieve { id: String },
    Update { id: String },
}

impl Context {
    pub fn count() -> Context {
        Context::Count
    }

    pub fn create() -> Context {
        Context::Create
    }

    pub fn decode() -> Context {
        Context::Decode
    }

    pub fn delete(id: String) -> Context {
        Context::Delete { id }
    }

    pub fn list() -> Context {
        Context::List
    }

    pub fn retrieve(id: String) -> Context {
        Context::Retrieve { id }
    }

    pub fn update(id: String) -> Context {
        Context::Update { id }
    }
}
