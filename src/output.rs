use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::anchors::EntryKind;
use crate::error::{HarvestError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocEntry {
    pub doc: String,
    pub link: String,
}

/// Entry name → documentation. Names without an anchor on their page are
/// never inserted.
pub type DocMap = BTreeMap<String, DocEntry>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceDocs {
    pub actions: DocMap,
    pub filters: DocMap,
}

impl ResourceDocs {
    pub fn entries_mut(&mut self, kind: EntryKind) -> &mut DocMap {
        match kind {
            EntryKind::Actions => &mut self.actions,
            EntryKind::Filters => &mut self.filters,
        }
    }

    pub fn entry_count(&self) -> usize {
        self.actions.len() + self.filters.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommonDocs {
    pub common_actions: DocMap,
    pub common_filters: DocMap,
}

impl CommonDocs {
    pub fn entries_mut(&mut self, kind: EntryKind) -> &mut DocMap {
        match kind {
            EntryKind::Actions => &mut self.common_actions,
            EntryKind::Filters => &mut self.common_filters,
        }
    }

    pub fn entry_count(&self) -> usize {
        self.common_actions.len() + self.common_filters.len()
    }
}

/// `{<resource_id>: ResourceDocs, ..., common_actions: {...}, common_filters: {...}}`
#[derive(Debug, Default, Serialize)]
pub struct Documentation {
    #[serde(flatten)]
    resources: BTreeMap<String, ResourceDocs>,
    #[serde(flatten)]
    common: CommonDocs,
}

impl Documentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false (and stores nothing) when `resource_id` would shadow one
    /// of the common group keys.
    pub fn insert_resource(&mut self, resource_id: String, docs: ResourceDocs) -> bool {
        if EntryKind::ALL.iter().any(|k| k.common_key() == resource_id) {
            return false;
        }
        self.resources.insert(resource_id, docs);
        true
    }

    pub fn set_common(&mut self, common: CommonDocs) {
        self.common = common;
    }

    pub fn resources(&self) -> &BTreeMap<String, ResourceDocs> {
        &self.resources
    }

    pub fn entry_count(&self) -> usize {
        self.resources.values().map(ResourceDocs::entry_count).sum::<usize>() + self.common.entry_count()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| HarvestError::Output {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn entry(doc: &str, link: &str) -> DocEntry {
        DocEntry {
            doc: doc.into(),
            link: link.into(),
        }
    }

    #[test]
    fn resources_and_common_share_top_level() {
        let mut docs = Documentation::new();
        let mut ec2 = ResourceDocs::default();
        ec2.entries_mut(EntryKind::Actions)
            .insert("tag".into(), entry("Apply a tag.", "u#aws-ec2-actions-tag"));
        assert!(docs.insert_resource("aws.ec2".into(), ec2));
        docs.insert_resource("aws.s3".into(), ResourceDocs::default());

        let mut common = CommonDocs::default();
        common
            .entries_mut(EntryKind::Actions)
            .insert("aws.actions.notify".into(), entry("Send.", "c#aws-common-actions-notify"));
        docs.set_common(common);

        let value: Value = serde_json::from_str(&docs.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "aws.ec2": {"actions": {"tag": {"doc": "Apply a tag.", "link": "u#aws-ec2-actions-tag"}}, "filters": {}},
                "aws.s3": {"actions": {}, "filters": {}},
                "common_actions": {"aws.actions.notify": {"doc": "Send.", "link": "c#aws-common-actions-notify"}},
                "common_filters": {}
            })
        );
        assert_eq!(docs.entry_count(), 2);
    }

    #[test]
    fn reserved_ids_rejected() {
        let mut docs = Documentation::new();
        assert!(!docs.insert_resource("common_actions".into(), ResourceDocs::default()));
        assert!(!docs.insert_resource("common_filters".into(), ResourceDocs::default()));
        assert!(docs.resources().is_empty());
    }

    #[test]
    fn writes_indented_utf8() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("docs.json");
        let mut docs = Documentation::new();
        let mut r = ResourceDocs::default();
        r.filters.insert("value".into(), entry("Größe ≥ 1", "l"));
        docs.insert_resource("aws.ec2".into(), r);
        docs.write(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n  \"aws.ec2\": {"));
        assert!(written.contains("Größe ≥ 1"));
    }

    #[test]
    fn write_failure_names_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("no-such-dir").join("docs.json");
        let err = Documentation::new().write(&path).unwrap_err();
        assert!(matches!(err, HarvestError::Output { .. }));
        assert!(err.to_string().contains("no-such-dir"));
    }
}
