//! Composition and decomposition of share-relative paths.
//!
//! Remote paths use the UNC convention regardless of the host platform:
//! segments joined by backslashes below a `\\server\share\` prefix. All of
//! this is pure string manipulation; the provider performs real validation,
//! so malformed input is passed through unchanged.

use std::fmt;

/// Separator used by the remote share convention.
pub const SEPARATOR: char = '\\';

/// Account used to access a share. The password never appears in `Debug`
/// output or logs.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Anonymous guest access, for providers that do not authenticate.
    pub fn guest() -> Self {
        Self::new("guest", "")
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Immutable address of one remote share. Every path the client hands to
/// the provider is composed from this.
#[derive(Debug, Clone)]
pub struct ShareLocation {
    server: String,
    share: String,
    credentials: Credentials,
}

impl ShareLocation {
    pub fn new<S: Into<String>, H: Into<String>>(
        server: S,
        share: H,
        credentials: Credentials,
    ) -> Self {
        Self {
            server: server.into(),
            share: share.into(),
            credentials,
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn share(&self) -> &str {
        &self.share
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Fully qualified UNC address for a path relative to the share root.
    pub fn unc_path(&self, path_in_share: &str) -> String {
        format!(r"\\{}\{}\{}", self.server, self.share, path_in_share)
    }

    /// Recovers the share-relative portion of a UNC address. Returns an
    /// empty string when the address does not belong to this share.
    pub fn path_in_share(&self, unc: &str) -> String {
        let prefix = self.unc_path("");
        unc.strip_prefix(&prefix).unwrap_or("").to_string()
    }
}

/// Joins two relative path fragments, tolerating either side being empty.
pub fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}{SEPARATOR}{name}")
    }
}

/// Last segment of a relative path; the path itself when it has only one.
pub fn last_segment(path: &str) -> &str {
    match path.rsplit_once(SEPARATOR) {
        Some((_, last)) => last,
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> ShareLocation {
        ShareLocation::new("fileserver", "data", Credentials::new("svc", "secret"))
    }

    #[test]
    fn composes_unc_path() {
        assert_eq!(
            location().unc_path(r"Tools\testdata"),
            r"\\fileserver\data\Tools\testdata"
        );
        assert_eq!(location().unc_path(""), r"\\fileserver\data\");
    }

    #[test]
    fn strips_known_prefix() {
        let loc = location();
        assert_eq!(
            loc.path_in_share(r"\\fileserver\data\Tools\testdata"),
            r"Tools\testdata"
        );
        assert_eq!(loc.path_in_share(r"\\otherhost\data\Tools"), "");
    }

    #[test]
    fn joins_fragments() {
        assert_eq!(join("", "f.txt"), "f.txt");
        assert_eq!(join("A", ""), "A");
        assert_eq!(join("A", "B"), r"A\B");
    }

    #[test]
    fn last_segment_of_path() {
        assert_eq!(last_segment(""), "");
        assert_eq!(last_segment("B"), "B");
        assert_eq!(last_segment(r"A\B\C"), "C");
    }

    #[test]
    fn debug_redacts_password() {
        let debug = format!("{:?}", Credentials::new("svc", "secret"));
        assert!(debug.contains("svc"));
        assert!(!debug.contains("secret"));
    }
}
