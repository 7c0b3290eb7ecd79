use crate::{NoticeLevel, ViewKind};

/// Why a request to the backend did not produce a usable answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteFailure {
    /// The backend answered with `{error}` or an unexpected shape.
    Rejected(Option<String>),
    /// The request never produced a readable answer.
    Transport(String),
}

/// Every failure the dashboard surfaces to the operator. None is fatal:
/// each is shown as a transient notice and the controls are reset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DashboardError {
    #[error("Please select at least one {kind} to translate")]
    Validation { kind: ViewKind },
    #[error("{}", launch_message(.0))]
    Launch(RemoteFailure),
    #[error("Error tracking translation progress")]
    Poll(RemoteFailure),
    /// Carries the server's status string verbatim.
    #[error("{status}")]
    JobFailed { status: String },
    #[error("{}", load_message(*.kind, .failure))]
    ListLoad {
        kind: ViewKind,
        failure: RemoteFailure,
    },
}

impl DashboardError {
    pub fn level(&self) -> NoticeLevel {
        match self {
            DashboardError::Validation { .. }
            | DashboardError::Poll(_)
            | DashboardError::ListLoad { .. } => NoticeLevel::Warning,
            DashboardError::Launch(_) | DashboardError::JobFailed { .. } => NoticeLevel::Danger,
        }
    }
}

fn launch_message(failure: &RemoteFailure) -> String {
    match failure {
        RemoteFailure::Rejected(Some(reason)) => reason.clone(),
        RemoteFailure::Rejected(None) => "Failed to start translation".to_string(),
        RemoteFailure::Transport(reason) => format!("Error starting translation: {reason}"),
    }
}

fn load_message(kind: ViewKind, failure: &RemoteFailure) -> String {
    match failure {
        RemoteFailure::Rejected(reason) => format!(
            "Failed to load {}: {}",
            plural(kind),
            reason.as_deref().unwrap_or("Unknown error")
        ),
        RemoteFailure::Transport(reason) => {
            format!("Error loading {}: {reason}", plural(kind))
        }
    }
}

fn plural(kind: ViewKind) -> &'static str {
    match kind {
        ViewKind::Batch => "batches",
        ViewKind::Chapter => "chapters",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_names_the_active_kind() {
        let err = DashboardError::Validation {
            kind: ViewKind::Chapter,
        };
        assert_eq!(
            err.to_string(),
            "Please select at least one chapter to translate"
        );
        assert_eq!(err.level(), NoticeLevel::Warning);
    }

    #[test]
    fn launch_messages_prefer_server_reason() {
        let rejected = DashboardError::Launch(RemoteFailure::Rejected(Some(
            "No API key".to_string(),
        )));
        assert_eq!(rejected.to_string(), "No API key");
        let silent = DashboardError::Launch(RemoteFailure::Rejected(None));
        assert_eq!(silent.to_string(), "Failed to start translation");
        let transport =
            DashboardError::Launch(RemoteFailure::Transport("connection refused".to_string()));
        assert_eq!(
            transport.to_string(),
            "Error starting translation: connection refused"
        );
    }

    #[test]
    fn job_failure_is_verbatim() {
        let err = DashboardError::JobFailed {
            status: "Failed: disk full".to_string(),
        };
        assert_eq!(err.to_string(), "Failed: disk full");
    }
}
