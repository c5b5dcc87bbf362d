//! View-side notification protocol

use super::index::ModelIndex;

/// Receiver of the model's change notifications
///
/// Structural edits arrive as begin/end pairs. Between the two calls the
/// model is mid-edit and row counts may disagree with what the view cached.
/// Every method defaults to doing nothing.
pub trait ModelObserver {
    fn begin_insert_rows(&mut self, _parent: &ModelIndex, _first: usize, _last: usize) {}
    fn end_insert_rows(&mut self) {}
    fn begin_remove_rows(&mut self, _parent: &ModelIndex, _first: usize, _last: usize) {}
    fn end_remove_rows(&mut self) {}
    fn begin_reset(&mut self) {}
    fn end_reset(&mut self) {}
    fn data_changed(&mut self, _top_left: &ModelIndex, _bottom_right: &ModelIndex) {}
}

/// Null observer
impl ModelObserver for () {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    BeginInsertRows {
        parent: ModelIndex,
        first: usize,
        last: usize,
    },
    EndInsertRows,
    BeginRemoveRows {
        parent: ModelIndex,
        first: usize,
        last: usize,
    },
    EndRemoveRows,
    BeginReset,
    EndReset,
    DataChanged {
        top_left: ModelIndex,
        bottom_right: ModelIndex,
    },
}

/// Observer that keeps every notification it receives
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    log: Vec<Notification>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.log
    }

    /// Drain the log
    pub fn take(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.log)
    }

    pub fn clear(&mut self) {
        self.log.clear();
    }

    /// Whether every begin is closed by its matching end, without nesting
    pub fn is_balanced(&self) -> bool {
        let mut open: Option<&Notification> = None;
        for notification in &self.log {
            match (open, notification) {
                (
                    None,
                    Notification::BeginInsertRows { .. }
                    | Notification::BeginRemoveRows { .. }
                    | Notification::BeginReset,
                ) => open = Some(notification),
                (Some(Notification::BeginInsertRows { .. }), Notification::EndInsertRows)
                | (Some(Notification::BeginRemoveRows { .. }), Notification::EndRemoveRows)
                | (Some(Notification::BeginReset), Notification::EndReset) => open = None,
                (None, Notification::DataChanged { .. }) => {}
                _ => return false,
            }
        }
        open.is_none()
    }
}

impl ModelObserver for Recorder {
    fn begin_insert_rows(&mut self, parent: &ModelIndex, first: usize, last: usize) {
        self.log.push(Notification::BeginInsertRows {
            parent: *parent,
            first,
            last,
        });
    }

    fn end_insert_rows(&mut self) {
        self.log.push(Notification::EndInsertRows);
    }

    fn begin_remove_rows(&mut self, parent: &ModelIndex, first: usize, last: usize) {
        self.log.push(Notification::BeginRemoveRows {
            parent: *parent,
            first,
            last,
        });
    }

    fn end_remove_rows(&mut self) {
        self.log.push(Notification::EndRemoveRows);
    }

    fn begin_reset(&mut self) {
        self.log.push(Notification::BeginReset);
    }

    fn end_reset(&mut self) {
        self.log.push(Notification::EndReset);
    }

    fn data_changed(&mut self, top_left: &ModelIndex, bottom_right: &ModelIndex) {
        self.log.push(Notification::DataChanged {
            top_left: *top_left,
            bottom_right: *bottom_right,
        });
    }
}
