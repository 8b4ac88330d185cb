//! Response envelopes and handles to asynchronous remote operations.

/// Transport-level metadata returned alongside a resource by every API call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseEnvelope {
    /// HTTP status code.
    pub status: u16,
    /// `Location` header pointing at the status resource of an accepted operation.
    pub location: Option<String>,
    /// Request identifier echoed by the server, if any.
    pub request_id: Option<String>,
}

/// Reference to a remote operation, tracked through its status path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationHandle {
    path: Option<String>,
    identifier: Option<String>,
}

impl OperationHandle {
    /// Handle for the operation announced by `envelope`. Without a location the handle
    /// only reports that no polling is needed.
    #[must_use]
    pub fn from_envelope(envelope: &ResponseEnvelope) -> Self {
        envelope
            .location
            .as_deref()
            .map_or_else(Self::default, Self::from_path)
    }

    /// Handle for a known status path.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path.trim();
        if path.is_empty() {
            return Self::default();
        }
        Self {
            path: Some(path.to_string()),
            identifier: identifier_from_path(path),
        }
    }

    /// Status path to poll.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Identifier parsed from the path, used in progress messages.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Whether there is anything to wait for.
    #[must_use]
    pub const fn needs_polling(&self) -> bool {
        self.path.is_some()
    }
}

/// Last meaningful path segment; a trailing `status` segment is skipped, so
/// `.../requests/<id>/status` yields `<id>`.
fn identifier_from_path(path: &str) -> Option<String> {
    let without_query = path.split(['?', '#']).next().unwrap_or(path);
    let mut segments = without_query
        .trim_end_matches('/')
        .rsplit('/')
        .filter(|segment| !segment.is_empty());
    let last = segments.next()?;
    let identifier = if last.eq_ignore_ascii_case("status") {
        segments.next()?
    } else {
        last
    };
    Some(identifier.to_string())
}
