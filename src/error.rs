use thiserror::Error;

/// Failures that end a run, grouped by the phase they happen in.
///
/// Per-issue failures are logged and counted by the synchronizer instead of
/// surfacing here; only `Issue` exists so they can be reported uniformly.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{service} connection failed")]
    Connectivity {
        service: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{phase} setup failed")]
    Setup {
        phase: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("issue #{iid} failed")]
    Issue {
        iid: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("export to {path} failed")]
    Format {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{action} failed with HTTP {status}: {body}")]
    Api {
        action: String,
        status: u16,
        body: String,
    },

    #[error("GraphQL error: {0}")]
    GraphQl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_phase() {
        let err = SyncError::Connectivity {
            service: "GitLab".into(),
            source: anyhow::anyhow!("invalid GitLab token"),
        };
        assert_eq!(err.to_string(), "GitLab connection failed");
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "invalid GitLab token");
    }

    #[test]
    fn api_error_carries_status_and_body() {
        let err = SyncError::Api {
            action: "create task".into(),
            status: 400,
            body: "bad request".into(),
        };
        assert_eq!(
            err.to_string(),
            "create task failed with HTTP 400: bad request"
        );
    }
}
