//! Device fingerprint derivation.
//!
//! Turns request-level signals (network address, declared client identity,
//! any additional deterministic headers the caller chooses to feed in)
//! into a stable 256-bit device identifier. Pure and total: the same
//! attributes always produce the same id, across requests and process
//! restarts. Which headers are fed in is decided by the API layer, so the
//! attribute set can be strengthened without touching the registry or
//! detector.

use std::collections::BTreeMap;

use crate::hashing;

/// Domain tag mixed into every digest. Bumping it invalidates all derived
/// ids at once if the canonical form ever has to change.
const FINGERPRINT_TAG: &str = "DEVICE_FINGERPRINT_V1";

/// The request-level signals a device identifier is derived from.
///
/// `extra` is keyed by lowercase header name; `BTreeMap` ordering makes
/// the canonical form independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceAttributes {
    /// Network address as reported by the request layer.
    pub ip_address: String,
    /// Declared client identity string (typically the User-Agent header).
    pub user_agent: String,
    /// Additional deterministic headers, lowercase name -> raw value.
    pub extra: BTreeMap<String, String>,
}

impl DeviceAttributes {
    /// Build attributes from the two mandatory signals.
    pub fn new(ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            user_agent: user_agent.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Add an extra deterministic header. Names are lowercased so callers
    /// reading from case-insensitive header maps cannot split identities.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.extra.insert(name.to_ascii_lowercase(), value.into());
        self
    }
}

/// Derive the stable device identifier for a set of request attributes.
///
/// Returns a 64-character lowercase hex string (SHA-256), so accidental
/// collisions between distinct devices are negligible. Every field is
/// length-prefixed in the canonical form; `"ab" + "c"` and `"a" + "bc"`
/// cannot produce the same digest.
pub fn derive_device_id(attrs: &DeviceAttributes) -> String {
    let mut canonical = String::new();
    push_field(&mut canonical, FINGERPRINT_TAG);
    push_field(&mut canonical, &attrs.ip_address);
    push_field(&mut canonical, &attrs.user_agent);
    for (name, value) in &attrs.extra {
        push_field(&mut canonical, name);
        push_field(&mut canonical, value);
    }
    hashing::sha256_hex(canonical.as_bytes())
}

/// Append one field as `<byte length>:<bytes>;`.
fn push_field(out: &mut String, field: &str) {
    out.push_str(&field.len().to_string());
    out.push(':');
    out.push_str(field);
    out.push(';');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DeviceAttributes {
        DeviceAttributes::new("203.0.113.7", "Mozilla/5.0 (X11; Linux x86_64)")
            .with_header("Accept-Language", "en-US,en;q=0.9")
    }

    #[test]
    fn same_attributes_same_id() {
        assert_eq!(derive_device_id(&sample()), derive_device_id(&sample()));
    }

    #[test]
    fn id_is_sha256_hex() {
        let id = derive_device_id(&sample());
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_ip_different_id() {
        let a = sample();
        let mut b = sample();
        b.ip_address = "203.0.113.8".into();
        assert_ne!(derive_device_id(&a), derive_device_id(&b));
    }

    #[test]
    fn different_user_agent_different_id() {
        let a = sample();
        let mut b = sample();
        b.user_agent = "curl/8.5.0".into();
        assert_ne!(derive_device_id(&a), derive_device_id(&b));
    }

    #[test]
    fn header_name_case_is_normalized() {
        let a = DeviceAttributes::new("198.51.100.1", "ua").with_header("X-Client-Id", "k1");
        let b = DeviceAttributes::new("198.51.100.1", "ua").with_header("x-client-id", "k1");
        assert_eq!(derive_device_id(&a), derive_device_id(&b));
    }

    #[test]
    fn header_insertion_order_is_irrelevant() {
        let a = DeviceAttributes::new("198.51.100.1", "ua")
            .with_header("a", "1")
            .with_header("b", "2");
        let b = DeviceAttributes::new("198.51.100.1", "ua")
            .with_header("b", "2")
            .with_header("a", "1");
        assert_eq!(derive_device_id(&a), derive_device_id(&b));
    }

    #[test]
    fn field_boundaries_cannot_shift() {
        // "ab" + "c" vs "a" + "bc" must not collide.
        let a = DeviceAttributes::new("ab", "c");
        let b = DeviceAttributes::new("a", "bc");
        assert_ne!(derive_device_id(&a), derive_device_id(&b));
    }

    #[test]
    fn empty_attributes_still_produce_an_id() {
        let id = derive_device_id(&DeviceAttributes::default());
        assert_eq!(id.len(), 64);
    }
}
