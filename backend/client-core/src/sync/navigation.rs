use std::collections::VecDeque;

/// A page change asked of the server and not yet answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingNavigation {
    /// Key of the page that will be shown.
    pub page: String,
    /// Id as sent, possibly with a sub-path.
    pub requested_page_id: String,
}

/// Outstanding navigation requests, most recent first.
///
/// The head is the request whose answer the server will send next from the
/// client's point of view; older entries were superseded locally.
#[derive(Debug, Clone, Default)]
pub struct NavigationQueue {
    entries: VecDeque<PendingNavigation>,
}

impl NavigationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: PendingNavigation) {
        self.entries.push_front(entry);
    }

    pub fn head(&self) -> Option<&PendingNavigation> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingNavigation> {
        self.entries.iter()
    }

    pub fn head_targets(&self, page: &str) -> bool {
        self.head().is_some_and(|head| head.page == page)
    }

    /// Empty the queue, returning what it held.
    pub fn drain(&mut self) -> Vec<PendingNavigation> {
        self.entries.drain(..).collect()
    }
}
