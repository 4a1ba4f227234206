//! Screen identifiers.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    /// Sign in, register, or enter a verification code.
    #[default]
    Auth,
    /// Theater grid with search and theater selection.
    Browse,
    /// Detail view for one movie at one theater.
    Movie,
}

impl ScreenId {
    pub fn label(self) -> &'static str {
        match self {
            Self::Auth => "Sign In",
            Self::Browse => "Now Showing",
            Self::Movie => "Movie",
        }
    }

    /// Screens that need a session before they can be shown.
    pub fn requires_session(self) -> bool {
        !matches!(self, Self::Auth)
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
