use crate::sync::component::Component;

use std::collections::BTreeMap;

/// Navigation category. Holds page ids; pages are owned by the synchronizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageGroup {
    id: String,
    display_name: String,
    collapsed: bool,
    pages: Vec<String>,
}

impl PageGroup {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            collapsed: false,
            pages: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn set_display_name(&mut self, display_name: impl Into<String>) {
        self.display_name = display_name.into();
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn set_collapsed(&mut self, collapsed: bool) {
        self.collapsed = collapsed;
    }

    pub fn toggle_collapsed(&mut self) -> bool {
        self.collapsed = !self.collapsed;
        self.collapsed
    }

    /// Page ids in insertion order.
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn contains(&self, page_id: &str) -> bool {
        self.pages.iter().any(|id| id == page_id)
    }

    pub(crate) fn link(&mut self, page_id: &str) {
        if !self.contains(page_id) {
            self.pages.push(page_id.to_string());
        }
    }

    pub(crate) fn unlink(&mut self, page_id: &str) {
        self.pages.retain(|id| id != page_id);
    }
}

/// Navigable page. Components only live while the page is selected.
#[derive(Debug, Clone)]
pub struct Page {
    id: String,
    display_name: String,
    icon: String,
    group: Option<String>,
    selected: bool,
    components: BTreeMap<u32, Component>,
}

impl Page {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            icon: icon.into(),
            group: None,
            selected: false,
            components: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn components(&self) -> &BTreeMap<u32, Component> {
        &self.components
    }

    pub fn component(&self, component_id: u32) -> Option<&Component> {
        self.components.get(&component_id)
    }

    pub(crate) fn set_display_name(&mut self, display_name: impl Into<String>) {
        self.display_name = display_name.into();
    }

    pub(crate) fn set_icon(&mut self, icon: impl Into<String>) {
        self.icon = icon.into();
    }

    pub(crate) fn set_group(&mut self, group: Option<String>) {
        self.group = group;
    }

    pub(crate) fn components_mut(&mut self) -> &mut BTreeMap<u32, Component> {
        &mut self.components
    }

    /// Reselecting a selected page keeps its components.
    pub(crate) fn select(&mut self) {
        if !self.selected {
            self.components.clear();
        }
        self.selected = true;
    }

    pub(crate) fn deselect(&mut self) {
        self.selected = false;
        self.components.clear();
    }
}

/// `"page/sub"` addresses page `"page"`. A leading slash is part of the id.
pub fn page_key(page_id: &str) -> &str {
    match page_id.find('/') {
        Some(index) if index > 0 => &page_id[..index],
        _ => page_id,
    }
}
