//! Data model of the shared deployment registry.
//!
//! The registry is a single JSON document stored remotely:
//!
//! ```json
//! {
//!   "networks": {
//!     "Base": { "contracts": { "NexusBootstrap": "0x..." }, "...": "..." }
//!   },
//!   "updated_at": "2026-01-01T00:00:00Z"
//! }
//! ```
//!
//! Only `networks.<name>.contracts` and `updated_at` are interpreted. Every
//! other field, at any level, is carried through untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Contract names the registry sync is allowed to write.
pub const SYNCED_CONTRACTS: &[&str] = &["NexusBootstrap", "NexusAccountFactory"];

/// Contract name to address. Addresses are opaque values and are never
/// normalised.
pub type ContractMap = BTreeMap<String, Value>;

/// The shared registry document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryDocument {
    /// Per-network entries keyed by canonical chain name.
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkEntry>,

    /// ISO-8601 timestamp of the last successful sync.
    #[serde(default)]
    pub updated_at: Option<String>,

    /// Unrecognised top-level fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single network entry of the [`RegistryDocument`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkEntry {
    /// Contract name to address.
    #[serde(default)]
    pub contracts: Map<String, Value>,

    /// Fields other than `contracts` (counters, metadata, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RegistryDocument {
    /// Deserialize a registry document from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid registry document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Deserialize a registry document from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not valid UTF-8 JSON or not a valid
    /// registry document.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Serialize this document to a pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Returns the entry for `network`, if it has been bootstrapped.
    #[must_use]
    pub fn network(&self, network: &str) -> Option<&NetworkEntry> {
        self.networks.get(network)
    }

    /// Mutable variant of [`RegistryDocument::network`].
    pub fn network_mut(&mut self, network: &str) -> Option<&mut NetworkEntry> {
        self.networks.get_mut(network)
    }
}

impl NetworkEntry {
    /// Insert or overwrite the given contracts, leaving every other contract
    /// and field of the entry as it was.
    pub fn merge_contracts<'a, I>(&mut self, contracts: I)
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        for (name, address) in contracts {
            self.contracts.insert(name.clone(), address.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let raw = json!({
            "networks": {
                "Foo": {
                    "contracts": { "A": "0x1" },
                    "extra": 42,
                    "nested": { "k": [1, 2, 3] }
                }
            },
            "updated_at": null,
            "schema": 2
        });

        let doc: RegistryDocument = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&doc).unwrap(), raw);
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let raw = b"{\"networks\":{\"Base\":{\"contracts\":{},\"note\":\"caf\xE9\"}}}";
        assert!(RegistryDocument::from_slice(raw).is_err());
        assert!(RegistryDocument::from_slice(br#"{"networks":{}}"#).is_ok());
    }

    #[test]
    fn empty_document_shape() {
        let value = serde_json::to_value(RegistryDocument::default()).unwrap();
        assert_eq!(value, json!({ "networks": {}, "updated_at": null }));
    }

    #[test]
    fn missing_contracts_defaults_to_empty() {
        let doc = RegistryDocument::from_json(r#"{"networks":{"Base":{"deployer":"x"}}}"#).unwrap();
        let base = doc.network("Base").unwrap();
        assert!(base.contracts.is_empty());
        assert_eq!(base.extra.get("deployer"), Some(&json!("x")));
        assert!(doc.updated_at.is_none());
    }

    #[test]
    fn merge_only_touches_given_contracts() {
        let mut entry: NetworkEntry = serde_json::from_value(json!({
            "contracts": { "A": "0x1", "NexusBootstrap": "0xold" },
            "extra": 42
        }))
        .unwrap();

        let update = ContractMap::from([("NexusBootstrap".to_owned(), json!("0xnew"))]);
        entry.merge_contracts(&update);

        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "contracts": { "A": "0x1", "NexusBootstrap": "0xnew" },
                "extra": 42
            })
        );
    }
}
