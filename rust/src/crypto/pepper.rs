//! Server-side pepper appended to every password before it reaches bcrypt.
//! The pepper lives only in memory, is wiped on drop, and never shows up in
//! debug output.

use std::fmt;

use zeroize::{Zeroize, Zeroizing};

/// Secret bytes appended to passwords. Construct through [`Pepper::load`] or
/// [`Pepper::from_bytes`]; an empty secret is represented as `None`.
#[derive(Clone, PartialEq, Eq)]
pub struct Pepper {
    bytes: Vec<u8>,
}

impl Pepper {
    /// Reads a pepper from its textual source. Absent or empty input means
    /// no pepper is configured.
    pub fn load(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|value| Self::from_bytes(value.as_bytes()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        Some(Self {
            bytes: bytes.to_vec(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Debug for Pepper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pepper")
            .field("bytes", &"<redacted>")
            .finish()
    }
}

impl Drop for Pepper {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// Returns `password` followed by the pepper bytes, or a plain copy of
/// `password` when no pepper is configured. The buffer is wiped on drop.
pub fn apply_pepper(password: &[u8], pepper: Option<&Pepper>) -> Zeroizing<Vec<u8>> {
    let extra = pepper.map_or(0, Pepper::len);
    let mut combined = Zeroizing::new(Vec::with_capacity(password.len() + extra));
    combined.extend_from_slice(password);
    if let Some(pepper) = pepper {
        combined.extend_from_slice(pepper.as_bytes());
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::{apply_pepper, Pepper};

    #[test]
    fn empty_or_missing_pepper_is_none() {
        assert!(Pepper::load(None).is_none());
        assert!(Pepper::load(Some("")).is_none());
        assert!(Pepper::from_bytes(&[]).is_none());
    }

    #[test]
    fn loads_utf8_bytes() {
        let pepper = Pepper::load(Some("pfeffer-ü")).expect("pepper should load");
        assert_eq!(pepper.as_bytes(), "pfeffer-ü".as_bytes());
    }

    #[test]
    fn appends_pepper_when_present() {
        let pepper = Pepper::load(Some("-spice")).expect("pepper should load");
        let combined = apply_pepper(b"hunter2", Some(&pepper));
        assert_eq!(combined.as_slice(), b"hunter2-spice");
    }

    #[test]
    fn identity_without_pepper() {
        let combined = apply_pepper(b"hunter2", None);
        assert_eq!(combined.as_slice(), b"hunter2");
    }

    #[test]
    fn debug_output_hides_secret() {
        let pepper = Pepper::load(Some("top-secret")).expect("pepper should load");
        let printed = format!("{pepper:?}");
        assert!(!printed.contains("top-secret"));
        assert!(printed.contains("redacted"));
    }
}
