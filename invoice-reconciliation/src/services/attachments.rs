//! Attachment Registry: in-memory supporting files keyed by row id.

use crate::models::RowId;
use std::collections::HashMap;
use std::sync::Arc;

/// An opaque file handle. Content is shared, so cloning a handle never copies
/// the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    name: String,
    content: Arc<[u8]>,
}

impl Attachment {
    pub fn new(name: impl Into<String>, content: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// `"- invoice.pdf (12.34 KB)"`
    pub fn describe(&self) -> String {
        format!("- {} ({:.2} KB)", self.name, self.size() as f64 / 1024.0)
    }
}

/// Display text for a row's attachment column.
pub fn attachment_summary(count: usize) -> String {
    if count == 0 {
        String::new()
    } else {
        format!("{} file(s)", count)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AttachmentRegistry {
    entries: HashMap<RowId, Vec<Attachment>>,
}

impl AttachmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append files to a row's list, creating it if needed. Returns the row's
    /// total attachment count.
    pub fn attach(&mut self, row_id: RowId, files: impl IntoIterator<Item = Attachment>) -> usize {
        let list = self.entries.entry(row_id).or_default();
        list.extend(files);
        list.len()
    }

    pub fn list(&self, row_id: RowId) -> &[Attachment] {
        self.entries.get(&row_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, row_id: RowId) -> usize {
        self.list(row_id).len()
    }

    /// Drop a row's entry entirely, returning what it held.
    pub fn remove(&mut self, row_id: RowId) -> Option<Vec<Attachment>> {
        self.entries.remove(&row_id)
    }

    /// Keep only the entries whose row id passes `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(RowId) -> bool) {
        self.entries.retain(|id, _| keep(*id));
    }

    /// One line per attachment, as shown when viewing a row's files.
    pub fn describe(&self, row_id: RowId) -> Option<String> {
        let files = self.list(row_id);
        if files.is_empty() {
            return None;
        }
        let lines: Vec<String> = files.iter().map(Attachment::describe).collect();
        Some(format!("Attached files:\n{}", lines.join("\n")))
    }

    /// Comma-separated file names.
    pub fn names(&self, row_id: RowId) -> String {
        self.list(row_id)
            .iter()
            .map(Attachment::name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }
}
