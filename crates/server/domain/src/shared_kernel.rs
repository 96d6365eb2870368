pub use stratus_shared::*;

/// Domain errors
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("Invalid scale spec field {field} for sku {sku_id}: {reason}")]
    InvalidScaleSpec {
        sku_id: SkuId,
        field: String,
        reason: String,
    },

    #[error("Rule store unavailable for cluster {cluster_id}: {message}")]
    RuleStoreUnavailable {
        cluster_id: ClusterId,
        message: String,
    },

    #[error("Cluster query failed for cluster {cluster_id}: {message}")]
    ClusterQueryFailed {
        cluster_id: ClusterId,
        message: String,
    },

    #[error("Scale dispatch failed for cluster {cluster_id}: {message}")]
    DispatchFailed {
        cluster_id: ClusterId,
        message: String,
    },

    #[error("Infrastructure error: {message}")]
    InfrastructureError { message: String },
}

impl From<serde_json::Error> for DomainError {
    fn from(error: serde_json::Error) -> Self {
        Self::InfrastructureError {
            message: format!("Serialization error: {}", error),
        }
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
