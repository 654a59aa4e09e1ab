use ulid::Ulid;

/// Generates a new ULID-based ID with the given prefix.
///
/// # Examples
/// ```
/// let id = event_common::id::prefixed_ulid("ws");
/// assert!(id.starts_with("ws_"));
/// ```
pub fn prefixed_ulid(prefix: &str) -> String {
    format!("{}_{}", prefix, Ulid::new())
}

/// Marker trait for types that represent a prefixed ID.
pub trait PrefixedId {
    const PREFIX: &'static str;

    fn generate() -> String {
        prefixed_ulid(Self::PREFIX)
    }
}

/// Well-known ID prefixes.
pub mod prefix {
    /// Live display-client connections.
    pub const CONNECTION: &str = "ws";
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Conn;

    impl PrefixedId for Conn {
        const PREFIX: &'static str = prefix::CONNECTION;
    }

    #[test]
    fn test_prefixed_ulid_format() {
        let id = prefixed_ulid("ws");
        assert!(id.starts_with("ws_"));
        // ULID is 26 chars, plus prefix + underscore
        assert_eq!(id.len(), 3 + 26);
    }

    #[test]
    fn test_uniqueness() {
        let a = prefixed_ulid("ws");
        let b = prefixed_ulid("ws");
        assert_ne!(a, b);
    }

    #[test]
    fn test_prefixed_id_trait_uses_prefix() {
        assert!(Conn::generate().starts_with("ws_"));
    }
}
