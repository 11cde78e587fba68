use crate::kind::{ExecutionPoint, InterceptorKind};
use serde::{Deserialize, Serialize};

/// One interceptor attached to an API operation.
///
/// `content` is the raw declarative policy (JSON text); it is parsed on
/// every dispatch by the variant registered for `kind`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InterceptorSpec {
    pub id: String,
    pub name: String,
    pub kind: InterceptorKind,
    pub execution_point: ExecutionPoint,
    pub content: String,
    #[serde(default)]
    pub order: i32,
}

impl InterceptorSpec {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: InterceptorKind,
        execution_point: ExecutionPoint,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            execution_point,
            content: content.into(),
            order: 0,
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }
}
