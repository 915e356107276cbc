//! Naming rules that turn schema identifiers into page URLs, anchor ids and
//! deep links.

/// Which kind of schema entry a fragment documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Actions,
    Filters,
}

impl EntryKind {
    pub const ALL: [EntryKind; 2] = [EntryKind::Actions, EntryKind::Filters];

    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Actions => "actions",
            EntryKind::Filters => "filters",
        }
    }

    /// Output key of the shared group (`common_actions` / `common_filters`).
    pub fn common_key(self) -> &'static str {
        match self {
            EntryKind::Actions => "common_actions",
            EntryKind::Filters => "common_filters",
        }
    }

    /// Page name of the shared group: `common_actions` → `aws-common-actions`.
    pub fn common_page(self) -> String {
        format!("aws-{}", self.common_key().replace('_', "-"))
    }
}

/// Final dot-separated segment: `aws.ec2` → `ec2`, `aws.actions.notify` → `notify`.
pub fn last_segment(dotted: &str) -> &str {
    dotted.rsplit('.').next().unwrap_or(dotted)
}

pub fn page_url(base: &str, page: &str) -> String {
    format!("{}/{}.html", base.trim_end_matches('/'), page)
}

pub fn resource_page_url(base: &str, resource_id: &str) -> String {
    page_url(base, last_segment(resource_id))
}

/// `{url}#aws-ec2-actions-mark-for-op` for resource `aws.ec2`, action `mark-for-op`.
pub fn resource_link(resolved_url: &str, resource_id: &str, kind: EntryKind, name: &str) -> String {
    format!(
        "{}#{}-{}-{}",
        resolved_url,
        resource_id.replace('.', "-"),
        kind.as_str(),
        name
    )
}

/// `{url}#aws-common-actions-notify` for anchor `notify`.
pub fn common_link(resolved_url: &str, kind: EntryKind, anchor_id: &str) -> String {
    format!("{}#{}-{}", resolved_url, kind.common_page(), anchor_id)
}
