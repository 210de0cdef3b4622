use crate::content::{EdgeKey, NodeKind};
use crate::ids::Uid;

/// Referential-integrity violation in submitted content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("{referrer} references port {port} which is not part of the content")]
    DanglingPort { referrer: String, port: Uid },

    #[error("duplicate {kind} uid {uid}")]
    DuplicateUid { kind: NodeKind, uid: Uid },

    #[error("duplicate edge {0}")]
    DuplicateEdge(EdgeKey),
}
