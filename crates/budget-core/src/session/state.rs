use crate::models::User;

/// Snapshot of the session.
///
/// `is_authenticated` is only ever true while `token` is present and the
/// server has confirmed it by returning a profile (or it came straight from
/// a successful login). `is_loading` is true only until the startup check
/// completes.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub token: Option<String>,
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    /// Bumped on every login and every logout that changed something.
    pub generation: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            token: None,
            user: None,
            is_authenticated: false,
            is_loading: true,
            generation: 0,
        }
    }
}

impl SessionState {
    /// True when there is anything to clear on logout
    pub(crate) fn is_signed_in(&self) -> bool {
        self.token.is_some() || self.user.is_some() || self.is_authenticated
    }

    pub(crate) fn reset(&mut self) {
        self.token = None;
        self.user = None;
        self.is_authenticated = false;
        self.generation += 1;
    }
}

/// The token a request was sent with, tagged with the session generation at
/// the time it was read.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub token: Option<String>,
    pub generation: u64,
}
