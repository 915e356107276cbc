use std::sync::Arc;

use tracing::{debug, info};

use crate::anchors::{self, EntryKind};
use crate::error::Result;
use crate::fetch::PageFetcher;
use crate::output::{CommonDocs, DocEntry, DocMap, ResourceDocs};
use crate::parser::{fragment, Page};
use crate::schema::{EntryNames, ResourceDef};

/// Fetches documentation pages from `docs_base` and extracts one fragment per
/// schema entry.
pub struct Harvester<F> {
    fetcher: Arc<F>,
    docs_base: String,
}

impl<F> Clone for Harvester<F> {
    fn clone(&self) -> Self {
        Harvester {
            fetcher: Arc::clone(&self.fetcher),
            docs_base: self.docs_base.clone(),
        }
    }
}

impl<F: PageFetcher> Harvester<F> {
    pub fn new(fetcher: Arc<F>, docs_base: &str) -> Self {
        Harvester {
            fetcher,
            docs_base: docs_base.trim_end_matches('/').to_string(),
        }
    }

    /// One page per resource: `{docs_base}/{service}.html`.
    pub async fn harvest_resource(&self, resource_id: &str, def: &ResourceDef) -> Result<ResourceDocs> {
        info!("getting docs for resource '{}'...", resource_id);

        let url = anchors::resource_page_url(&self.docs_base, resource_id);
        let page = self.fetcher.fetch(&url).await?;
        Ok(resource_docs(&page.text, &page.resolved_url, resource_id, def))
    }

    /// Two pages total, one per entry kind. Either fetch failing fails the
    /// whole step.
    pub async fn harvest_common(&self, actions: &EntryNames, filters: &EntryNames) -> Result<CommonDocs> {
        let mut docs = CommonDocs::default();

        for (kind, entries) in [(EntryKind::Actions, actions), (EntryKind::Filters, filters)] {
            let url = anchors::page_url(&self.docs_base, &kind.common_page());
            info!("getting docs for {} ({} entries)...", kind.common_key(), entries.count());
            let page = self.fetcher.fetch(&url).await?;
            *docs.entries_mut(kind) = common_docs(&page.text, &page.resolved_url, kind, entries);
        }

        Ok(docs)
    }
}

fn resource_docs(html: &str, resolved_url: &str, resource_id: &str, def: &ResourceDef) -> ResourceDocs {
    let page = Page::parse(html);
    let mut docs = ResourceDocs::default();

    for kind in EntryKind::ALL {
        let names: Vec<&str> = match kind {
            EntryKind::Actions => def.action_names().collect(),
            EntryKind::Filters => def.filter_names().collect(),
        };
        let entries = docs.entries_mut(kind);
        for name in names {
            let Some(doc) = fragment::extract(&page, name) else {
                debug!(resource = resource_id, kind = kind.as_str(), entry = name, "no anchor on page");
                continue;
            };
            entries.insert(
                name.to_string(),
                DocEntry {
                    doc,
                    link: anchors::resource_link(resolved_url, resource_id, kind, name),
                },
            );
        }
    }

    docs
}

fn common_docs(html: &str, resolved_url: &str, kind: EntryKind, entries: &EntryNames) -> DocMap {
    let page = Page::parse(html);
    let mut docs = DocMap::new();

    for entry in entries.iter() {
        let anchor_id = anchors::last_segment(entry);
        let Some(doc) = fragment::extract(&page, anchor_id) else {
            debug!(group = kind.common_key(), entry, "no anchor on page");
            continue;
        };
        docs.insert(
            entry.to_string(),
            DocEntry {
                doc,
                link: anchors::common_link(resolved_url, kind, anchor_id),
            },
        );
    }

    docs
}
