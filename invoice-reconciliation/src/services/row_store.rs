//! Row Store: the editable, versioned list of reconciliation rows.
//!
//! Every mutation that changes something bumps [`RowStore::version`] and
//! returns a [`RowEvent`]; calls that change nothing return `None`.

use crate::models::{CellValue, RowField, RowId, RowRecord};
use crate::services::attachments::{attachment_summary, Attachment, AttachmentRegistry};
use crate::services::derived::{aging, difference, SharedClock, SystemClock};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a mutation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowEvent {
    Replaced { count: usize },
    Added { ids: Vec<RowId> },
    Deleted { id: RowId },
    Edited { id: RowId, field: RowField, rederived: Option<RowField> },
    ReasonSet { id: RowId },
    AttachmentsChanged { id: RowId, count: usize },
}

/// Owned copy of the store at one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSnapshot {
    pub version: u64,
    pub rows: Vec<RowRecord>,
}

pub struct RowStore {
    rows: Vec<RowRecord>,
    next_id: RowId,
    version: u64,
    attachments: AttachmentRegistry,
    clock: SharedClock,
}

impl Default for RowStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RowStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: SharedClock) -> Self {
        Self {
            rows: Vec::new(),
            next_id: 1,
            version: 0,
            attachments: AttachmentRegistry::new(),
            clock,
        }
    }

    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    pub fn get(&self, id: RowId) -> Option<&RowRecord> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// The id the next new row will get.
    pub fn next_id(&self) -> RowId {
        self.next_id
    }

    pub fn attachments(&self) -> &AttachmentRegistry {
        &self.attachments
    }

    pub fn snapshot(&self) -> RowSnapshot {
        RowSnapshot {
            version: self.version,
            rows: self.rows.clone(),
        }
    }

    fn allocate_id(&mut self) -> RowId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    fn commit(&mut self, event: RowEvent) -> Option<RowEvent> {
        self.version += 1;
        debug!(version = self.version, event = ?event, "Row store changed");
        Some(event)
    }

    /// Discard the current rows and install `rows`.
    ///
    /// Attachments survive only for ids present in the new list. The id
    /// allocator moves past the largest installed id; a duplicated id is
    /// given a fresh one so ids stay unique.
    pub fn replace_all(&mut self, rows: Vec<RowRecord>) -> Option<RowEvent> {
        let max_id = rows.iter().map(|r| r.id).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id.saturating_add(1));

        let mut seen = HashSet::with_capacity(rows.len());
        let mut installed = Vec::with_capacity(rows.len());
        for mut row in rows {
            if !seen.insert(row.id) {
                let fresh = self.allocate_id();
                warn!(duplicate = row.id, fresh, "Duplicate row id replaced");
                row.id = fresh;
                seen.insert(fresh);
            }
            installed.push(row);
        }

        self.attachments.retain(|id| seen.contains(&id));
        self.rows = installed;
        info!(rows = self.rows.len(), "Row store replaced");
        let count = self.rows.len();
        self.commit(RowEvent::Replaced { count })
    }

    /// Install freshly ingested rows under newly allocated ids, so no id from
    /// earlier in the session is reused. All existing attachments are dropped.
    pub fn replace_with_import(&mut self, rows: Vec<RowRecord>) -> Option<RowEvent> {
        let renumbered: Vec<RowRecord> = rows
            .into_iter()
            .map(|mut row| {
                row.id = self.allocate_id();
                row
            })
            .collect();
        self.attachments = AttachmentRegistry::new();
        self.replace_all(renumbered)
    }

    /// Append `count` blank rows after the existing ones.
    pub fn add_blank(&mut self, count: usize) -> Option<RowEvent> {
        if count == 0 {
            return None;
        }
        let ids: Vec<RowId> = (0..count).map(|_| self.allocate_id()).collect();
        self.rows.extend(ids.iter().map(|id| RowRecord::blank(*id)));
        self.commit(RowEvent::Added { ids })
    }

    pub fn add_one(&mut self) -> Option<RowEvent> {
        self.add_blank(1)
    }

    /// Empty the store, then add `count` blank rows.
    pub fn create_blank_table(&mut self, count: usize) -> Option<RowEvent> {
        self.rows.clear();
        self.attachments = AttachmentRegistry::new();
        let ids: Vec<RowId> = (0..count).map(|_| self.allocate_id()).collect();
        self.rows.extend(ids.into_iter().map(RowRecord::blank));
        info!(rows = count, "Blank table created");
        self.commit(RowEvent::Replaced { count })
    }

    /// Remove a row and its attachments.
    pub fn delete_row(&mut self, id: RowId) -> Option<RowEvent> {
        let index = self.rows.iter().position(|r| r.id == id)?;
        self.rows.remove(index);
        self.attachments.remove(id);
        self.commit(RowEvent::Deleted { id })
    }

    /// Set one field and re-derive what depends on it.
    ///
    /// `id`, the derived columns and the attachment summary are not directly
    /// editable; such calls are ignored.
    pub fn edit_cell(
        &mut self,
        id: RowId,
        field: RowField,
        value: impl Into<String>,
    ) -> Option<RowEvent> {
        if field == RowField::Id || field.is_derived() || field == RowField::Attachments {
            debug!(row_id = id, field = field.as_str(), "Field is not directly editable");
            return None;
        }

        let today = self.clock.today();
        let row = self.rows.iter_mut().find(|r| r.id == id)?;
        let value = value.into();

        let rederived = match field {
            RowField::GrantedDate => {
                row.aging = aging(&CellValue::Text(value.clone()), today);
                Some(RowField::Aging)
            }
            RowField::GrantedValue => {
                row.difference = difference(&value, &row.lr_amount);
                Some(RowField::Difference)
            }
            RowField::LrAmount => {
                row.difference = difference(&row.granted_value, &value);
                Some(RowField::Difference)
            }
            _ => None,
        };
        row.set(field, value);

        self.commit(RowEvent::Edited { id, field, rederived })
    }

    /// Tag a row with a discrepancy reason. Values outside the enumerated set
    /// are stored as given.
    pub fn set_reason(&mut self, id: RowId, reason: impl Into<String>) -> Option<RowEvent> {
        let row = self.rows.iter_mut().find(|r| r.id == id)?;
        row.reasons = reason.into();
        self.commit(RowEvent::ReasonSet { id })
    }

    /// Attach files to an existing row and refresh its attachment summary.
    pub fn attach(
        &mut self,
        id: RowId,
        files: impl IntoIterator<Item = Attachment>,
    ) -> Option<RowEvent> {
        let files: Vec<Attachment> = files.into_iter().collect();
        if files.is_empty() {
            return None;
        }
        let row = self.rows.iter_mut().find(|r| r.id == id)?;
        let count = self.attachments.attach(id, files);
        row.attachments = attachment_summary(count);
        self.commit(RowEvent::AttachmentsChanged { id, count })
    }

    pub fn list_attachments(&self, id: RowId) -> &[Attachment] {
        self.attachments.list(id)
    }
}
