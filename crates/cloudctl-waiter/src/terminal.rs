//! Terminal state sets supplied by each resource.
//!
//! Requests report `QUEUED`/`RUNNING`/`DONE`/`FAILED`; resources report their own
//! lifecycle states. Every caller passes the set that applies to what it waits on.

/// Classification of one observed status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// Terminal success.
    Succeeded {
        /// Observed state.
        state: String,
    },
    /// Terminal failure.
    Failed {
        /// Observed state.
        state: String,
        /// Remote-supplied failure text.
        message: Option<String>,
    },
    /// Not terminal yet.
    Pending {
        /// Observed state.
        state: String,
    },
}

/// Success and failure states for one kind of resource. Matching ignores ASCII case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalStates {
    success: Vec<String>,
    failure: Vec<String>,
}

impl TerminalStates {
    /// Custom state sets.
    #[must_use]
    pub fn new<S, F>(success: S, failure: F) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            success: success.into_iter().map(Into::into).collect(),
            failure: failure.into_iter().map(Into::into).collect(),
        }
    }

    /// Request status: `DONE` succeeds, `FAILED` fails.
    #[must_use]
    pub fn request() -> Self {
        Self::new(["DONE"], ["FAILED"])
    }

    /// Provisioned resources (datacenters, NAT gateways).
    #[must_use]
    pub fn available() -> Self {
        Self::new(["AVAILABLE"], ["FAILED", "ERROR"])
    }

    /// Kubernetes clusters and node pools.
    #[must_use]
    pub fn active() -> Self {
        Self::new(["ACTIVE", "AVAILABLE"], ["FAILED", "ERROR", "FAILED_DESTROYING"])
    }

    /// Classify a reported state.
    #[must_use]
    pub fn classify(&self, state: &str, message: Option<String>) -> Observation {
        let state = state.trim();
        if contains(&self.success, state) {
            Observation::Succeeded {
                state: state.to_string(),
            }
        } else if contains(&self.failure, state) {
            Observation::Failed {
                state: state.to_string(),
                message,
            }
        } else {
            Observation::Pending {
                state: state.to_string(),
            }
        }
    }
}

fn contains(states: &[String], state: &str) -> bool {
    states
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_states_classify() {
        let states = TerminalStates::request();
        assert_eq!(
            states.classify("DONE", None),
            Observation::Succeeded {
                state: "DONE".into()
            }
        );
        assert_eq!(
            states.classify("running", None),
            Observation::Pending {
                state: "running".into()
            }
        );
        assert_eq!(
            states.classify("FAILED", Some("boom".into())),
            Observation::Failed {
                state: "FAILED".into(),
                message: Some("boom".into())
            }
        );
    }

    #[test]
    fn custom_sets_are_respected() {
        let states = TerminalStates::new(["READY"], Vec::<String>::new());
        assert!(matches!(states.classify("ready", None), Observation::Succeeded { .. }));
        assert!(matches!(states.classify("FAILED", None), Observation::Pending { .. }));
    }

    #[test]
    fn k8s_states_accept_active() {
        let states = TerminalStates::active();
        assert!(matches!(states.classify("ACTIVE", None), Observation::Succeeded { .. }));
        assert!(matches!(states.classify("DEPLOYING", None), Observation::Pending { .. }));
        assert!(matches!(
            states.classify("FAILED_DESTROYING", None),
            Observation::Failed { .. }
        ));
    }
}
