use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{HarvestError, Result};

/// Root of the policy schema file. Only the parts the harvester reads are
/// modelled; everything else in the document is ignored.
#[derive(Debug, Deserialize)]
pub struct Schema {
    pub definitions: Definitions,
}

#[derive(Debug, Deserialize)]
pub struct Definitions {
    /// Resource id (e.g. `aws.ec2`) → its declared actions and filters,
    /// sorted by id.
    #[serde(deserialize_with = "ordered_resources")]
    pub resources: Vec<(String, ResourceDef)>,
    /// Actions shared by every resource (`aws.actions.notify`, ...).
    pub actions: EntryNames,
    pub filters: EntryNames,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub actions: Map<String, Value>,
    pub filters: Map<String, Value>,
}

impl ResourceDef {
    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn filter_names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }
}

/// A set of common entry names. The published schema stores these as an
/// object keyed by name; a bare array of names is accepted too.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EntryNames(pub BTreeSet<String>);

impl EntryNames {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn count(&self) -> usize {
        self.0.len()
    }
}

impl<'de> Deserialize<'de> for EntryNames {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            List(Vec<String>),
            Keyed(Map<String, Value>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::List(names) => EntryNames(names.into_iter().collect()),
            Raw::Keyed(map) => EntryNames(map.into_iter().map(|(k, _)| k).collect()),
        })
    }
}

fn ordered_resources<'de, D>(deserializer: D) -> std::result::Result<Vec<(String, ResourceDef)>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let map = Map::<String, Value>::deserialize(deserializer)?;
    map.into_iter()
        .map(|(id, def)| {
            let def = ResourceDef::deserialize(def)
                .map_err(|e| <D::Error as serde::de::Error>::custom(format!("resource '{}': {}", id, e)))?;
            Ok((id, def))
        })
        .collect()
}

impl Schema {
    pub fn load(path: &Path) -> Result<Schema> {
        let raw = std::fs::read_to_string(path).map_err(|source| HarvestError::SchemaRead {
            path: path.to_path_buf(),
            source,
        })?;
        Schema::parse(&raw).map_err(|source| HarvestError::Schema {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(raw: &str) -> serde_json::Result<Schema> {
        serde_json::from_str(raw)
    }

    pub fn resources(&self) -> &[(String, ResourceDef)] {
        &self.definitions.resources
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_common_entries() {
        let schema = Schema::parse(
            r#"{"definitions": {
                "resources": {"aws.ec2": {"actions": {"tag": {}}, "filters": {}}},
                "actions": ["aws.actions.notify"],
                "filters": []
            }}"#,
        )
        .unwrap();
        assert_eq!(schema.resources().len(), 1);
        let (id, def) = &schema.resources()[0];
        assert_eq!(id, "aws.ec2");
        assert_eq!(def.action_names().collect::<Vec<_>>(), vec!["tag"]);
        assert_eq!(def.filter_names().count(), 0);
        assert_eq!(schema.definitions.actions.iter().collect::<Vec<_>>(), vec!["aws.actions.notify"]);
        assert_eq!(schema.definitions.filters.count(), 0);
    }

    #[test]
    fn keyed_common_entries() {
        let schema = Schema::parse(
            r#"{"definitions": {
                "resources": {},
                "actions": {"aws.actions.notify": {"type": "object"}, "aws.actions.webhook": {}},
                "filters": {"aws.filters.value": {}}
            }}"#,
        )
        .unwrap();
        assert_eq!(schema.definitions.actions.count(), 2);
        assert!(schema.definitions.filters.0.contains("aws.filters.value"));
    }

    #[test]
    fn extra_keys_ignored() {
        let schema = Schema::parse(
            r#"{"$schema": "x", "definitions": {
                "resources": {"aws.s3": {"actions": {}, "filters": {"value": {}}, "policy": {}}},
                "actions": [], "filters": [], "modes": {}
            }}"#,
        )
        .unwrap();
        assert_eq!(schema.resources()[0].1.filter_names().collect::<Vec<_>>(), vec!["value"]);
    }

    #[test]
    fn missing_keys_rejected() {
        assert!(Schema::parse(r#"{"resources": {}}"#).is_err());
        assert!(Schema::parse(r#"{"definitions": {"resources": {}, "actions": []}}"#).is_err());
        let err = Schema::parse(
            r#"{"definitions": {"resources": {"aws.ec2": {"actions": {}}}, "actions": [], "filters": []}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("aws.ec2"));
    }

    #[test]
    fn load_reports_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Schema::load(&path).unwrap_err();
        assert!(matches!(err, HarvestError::Schema { .. }));
        assert!(err.to_string().contains("schema.json"));

        let missing = dir.path().join("absent.json");
        assert!(matches!(Schema::load(&missing), Err(HarvestError::SchemaRead { .. })));
    }
}
