//! Top-level screen selection from session state and the splash timer.

use crate::auth::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No session snapshot received yet.
    Initializing,
    Unauthenticated,
    Authenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Splash,
    Auth,
    Feed,
}

#[derive(Debug)]
pub struct RootComposer {
    phase: Phase,
    session: Option<Session>,
    splash_active: bool,
}

impl Default for RootComposer {
    fn default() -> Self {
        RootComposer {
            phase: Phase::Initializing,
            session: None,
            splash_active: true,
        }
    }
}

impl RootComposer {
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn screen(&self) -> Screen {
        if self.splash_active {
            return Screen::Splash;
        }
        match self.phase {
            Phase::Initializing => Screen::Splash,
            Phase::Unauthenticated => Screen::Auth,
            Phase::Authenticated => Screen::Feed,
        }
    }

    pub fn splash_elapsed(&mut self) {
        self.splash_active = false;
    }

    /// Record a session snapshot and return the new phase.
    pub fn session_changed(&mut self, session: Option<Session>) -> Phase {
        self.phase = if session.is_some() {
            Phase::Authenticated
        } else {
            Phase::Unauthenticated
        };
        self.session = session;
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            uid: "u".to_string(),
            email: "a@b.co".to_string(),
            display_name: None,
            id_token: String::new(),
            refresh_token: String::new(),
        }
    }

    #[test]
    fn splash_holds_even_when_snapshot_arrives_early() {
        let mut root = RootComposer::default();
        assert_eq!(root.screen(), Screen::Splash);
        root.session_changed(None);
        assert_eq!(root.screen(), Screen::Splash);
        root.splash_elapsed();
        assert_eq!(root.screen(), Screen::Auth);
    }

    #[test]
    fn splash_holds_until_first_snapshot() {
        let mut root = RootComposer::default();
        root.splash_elapsed();
        assert_eq!(root.phase, Phase::Initializing);
        assert_eq!(root.screen(), Screen::Splash);
        root.session_changed(Some(session()));
        assert_eq!(root.screen(), Screen::Feed);
    }

    #[test]
    fn later_changes_switch_immediately() {
        let mut root = RootComposer::default();
        root.splash_elapsed();
        root.session_changed(Some(session()));
        assert_eq!(root.screen(), Screen::Feed);
        assert_eq!(root.session_changed(None), Phase::Unauthenticated);
        assert_eq!(root.screen(), Screen::Auth);
        assert!(root.session().is_none());
    }
}
