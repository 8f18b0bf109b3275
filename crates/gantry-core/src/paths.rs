//! Validated path primitives

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::PathError;

/// Returns true if the value would be treated as an absolute path on any supported platform.
///
/// Covers unix roots, Windows drive letters (`C:\`, `C:/`) and UNC prefixes (`\\server`).
pub fn is_absolute_path(value: &str) -> bool {
    if value.starts_with('/') || value.starts_with('\\') {
        return true;
    }
    let bytes = value.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'/' || bytes[2] == b'\\')
}

/// A relative, forward-slash path anchored at some workspace directory.
///
/// Used for `.env` file lists where the declared order matters, so arrays
/// of these are never sorted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AnchoredUnixPath(Utf8PathBuf);

impl AnchoredUnixPath {
    /// Validate and normalize a raw path value
    pub fn new(value: impl AsRef<str>) -> Result<Self, PathError> {
        let value = value.as_ref();
        if value.is_empty() {
            return Err(PathError::Empty);
        }
        if is_absolute_path(value) {
            return Err(PathError::NotRelative(value.to_string()));
        }
        Ok(Self(Utf8PathBuf::from(value.replace('\\', "/"))))
    }

    /// Borrow as a UTF-8 path
    pub fn as_path(&self) -> &Utf8Path {
        &self.0
    }

    /// Borrow as a string slice
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for AnchoredUnixPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AnchoredUnixPath> for String {
    fn from(path: AnchoredUnixPath) -> Self {
        path.0.into_string()
    }
}

impl fmt::Display for AnchoredUnixPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_accepted() {
        let path = AnchoredUnixPath::new(".env.local").unwrap();
        assert_eq!(path.as_str(), ".env.local");
    }

    #[test]
    fn test_backslashes_normalized() {
        let path = AnchoredUnixPath::new("config\\.env").unwrap();
        assert_eq!(path.as_str(), "config/.env");
        assert_eq!(path.as_path().file_name(), Some(".env"));
    }

    #[test]
    fn test_absolute_paths_rejected() {
        assert_eq!(
            AnchoredUnixPath::new("/etc/.env"),
            Err(PathError::NotRelative("/etc/.env".to_string()))
        );
        assert!(AnchoredUnixPath::new("C:\\repo\\.env").is_err());
        assert!(AnchoredUnixPath::new("\\\\server\\share").is_err());
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(AnchoredUnixPath::new(""), Err(PathError::Empty));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Vec<AnchoredUnixPath> = serde_json::from_str(r#"[".env", "a/.env"]"#).unwrap();
        assert_eq!(ok.len(), 2);

        let err = serde_json::from_str::<Vec<AnchoredUnixPath>>(r#"["/abs/.env"]"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_is_absolute_path() {
        assert!(is_absolute_path("/dist"));
        assert!(is_absolute_path("D:/dist"));
        assert!(!is_absolute_path("dist/**"));
        assert!(!is_absolute_path("!dist"));
    }
}
