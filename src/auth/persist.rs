use std::path::Path;

use super::Session;

/// Read a previously saved session. Missing or unreadable files mean "signed out".
pub fn load_session(path: &Path) -> Option<Session> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str::<Session>(&content) {
        Ok(session) => Some(session),
        Err(e) => {
            log::warn!("Ignoring corrupt session file {}: {}", path.display(), e);
            None
        }
    }
}

/// Write the session so the next launch starts signed in.
pub fn save_session(path: &Path, session: &Session) {
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }

    match serde_json::to_string(session) {
        Ok(json) => {
            if let Err(e) = std::fs::write(path, json) {
                log::warn!("Failed to save session to {}: {}", path.display(), e);
            }
        }
        Err(e) => log::warn!("Failed to encode session: {}", e),
    }
}

/// Forget the saved session.
pub fn clear_session(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => log::debug!("Session file removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove session file {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_file_is_treated_as_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_session(&path).is_none());
    }

    #[test]
    fn clearing_a_missing_file_is_quiet() {
        let dir = tempfile::tempdir().unwrap();
        clear_session(&dir.path().join("absent.json"));
    }
}
