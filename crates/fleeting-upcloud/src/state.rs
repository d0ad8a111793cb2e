use std::fmt;

use upcloud_api::{SERVER_STATE_ERROR, SERVER_STATE_STARTED, SERVER_STATE_STOPPED};

/// Lifecycle state of an instance as reported to the autoscaler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Creating,
    Running,
    Deleted,
}

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creating => "creating",
            Self::Running => "running",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map an UpCloud server state onto an instance lifecycle state.
///
/// Stopped and errored servers count as deleted so the autoscaler replaces
/// them; every other state (`new`, `maintenance`, ...) is still coming up.
pub fn map_server_state(state: &str) -> State {
    match state {
        SERVER_STATE_STARTED => State::Running,
        SERVER_STATE_STOPPED | SERVER_STATE_ERROR => State::Deleted,
        _ => State::Creating,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_server_states() {
        let cases = [
            ("started", State::Running),
            ("stopped", State::Deleted),
            ("error", State::Deleted),
            ("maintenance", State::Creating),
            ("new", State::Creating),
            ("", State::Creating),
        ];

        for (input, want) in cases {
            assert_eq!(map_server_state(input), want, "state {input:?}");
        }
    }
}
