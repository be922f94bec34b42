use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Identifier of a content chunk, assigned by the ingestion pipeline.
    ChunkId
);
string_id!(
    /// Stable identifier of a knowledge-graph node.
    NodeId
);
string_id!(
    /// Identifier of a feedback-providing user.
    UserId
);
string_id!(
    /// Identifier of a completed retrieval trace.
    TraceId
);
string_id!(
    /// Identifier of a feedback event. Re-ingesting the same id is rejected.
    FeedbackId
);
