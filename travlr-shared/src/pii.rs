use serde::{Serialize, Deserialize, Serializer};
use std::fmt;

/// Wrapper for credentials and personal data (emails, password hashes).
///
/// `Debug` and `Display` never print the wrapped value, so it is safe to pass
/// through `tracing` fields. Serialization emits the real value because the
/// store and API responses need it.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_display_hide_value() {
        let email = Masked::new("jane@example.com".to_string());
        assert_eq!(format!("{:?}", email), "********");
        assert_eq!(format!("{}", email), "********");
        assert_eq!(email.expose(), "jane@example.com");
    }

    #[test]
    fn test_serialization_keeps_value() {
        let hash = Masked::new("$2b$10$abc".to_string());
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, "\"$2b$10$abc\"");

        let back: Masked<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.into_inner(), "$2b$10$abc");
    }
}
