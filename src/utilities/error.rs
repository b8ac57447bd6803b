use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the clustering core and its I/O helpers.
#[derive(Debug, Error)]
pub enum KmeansError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("File open error {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Format(String),

    #[error("cluster {cluster} has no assigned points in iteration {iteration}")]
    EmptyCluster { cluster: usize, iteration: usize },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Shader compilation failed; `log` holds every message the device reported.
    #[error("kernel compile error (status {status}, options {options:?}):\n{log}")]
    KernelBuild {
        log: String,
        status: String,
        options: String,
    },

    #[error("device error: {0}")]
    Device(String),

    #[error("collective {op} failed on rank {rank}: {reason}")]
    Collective {
        op: &'static str,
        rank: usize,
        reason: String,
    },

    #[error("backend {0} is not available in this build")]
    BackendUnavailable(&'static str),
}

impl KmeansError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        KmeansError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        KmeansError::InvalidInput(msg.into())
    }

    pub fn collective(op: &'static str, rank: usize, reason: impl Into<String>) -> Self {
        KmeansError::Collective {
            op,
            rank,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KmeansError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let e = KmeansError::EmptyCluster {
            cluster: 1,
            iteration: 0,
        };
        assert_eq!(
            e.to_string(),
            "cluster 1 has no assigned points in iteration 0"
        );
        let e = KmeansError::collective("gather", 3, "rank hung up");
        assert_eq!(e.to_string(), "collective gather failed on rank 3: rank hung up");
        let e = KmeansError::KernelBuild {
            log: "1:1 unexpected token".into(),
            status: "error".into(),
            options: String::new(),
        };
        assert!(e.to_string().contains("unexpected token"));
    }
}
