//! Client-side mirror of the server's page catalog.
//!
//! [`Synchronizer`] applies `PageListChange`, `ChangePage`, `UpdatePage` and
//! `PageAction` packets, reconciles them with navigation the user started
//! locally, and reports every visible change to a [`RenderSink`]. Packets it
//! wants sent are queued in an outbox the session drains after each call.
//!
//! Unknown groups, pages, component types, components and properties are
//! logged and skipped; the frame they arrived in was already fully walked.

pub mod catalog;
pub mod component;
pub mod events;
pub mod navigation;
pub mod page;
pub mod property;

pub use component::{ActionSpec, Component, ComponentBuilder, ComponentRegistry};
pub use events::{RenderSink, SessionEnd, UiEvent};
pub use navigation::{NavigationQueue, PendingNavigation};
pub use page::{Page, PageGroup, page_key};
pub use property::{
    Color, EnumValue, Property, PropertyChange, PropertyKind, PropertyValue, ThemeColor,
};

use crate::codec::ByteReader;
use crate::error::codec::CodecError;
use crate::protocol::{
    ActionValue, AddedComponent, ClientPacket, PageListChange, PageRecord, ServerAction,
    UpdatePage, UpdatedProperty,
};

use std::collections::HashMap;

use log::{debug, info, warn};

pub struct Synchronizer<S: RenderSink> {
    registry: ComponentRegistry,
    sink: S,
    groups: HashMap<String, PageGroup>,
    group_order: Vec<String>,
    pages: HashMap<String, Page>,
    current_page: Option<String>,
    current_page_id: Option<String>,
    navigation: NavigationQueue,
    outbox: Vec<ClientPacket>,
}

impl<S: RenderSink> Synchronizer<S> {
    pub fn new(sink: S) -> Self {
        Self::with_registry(ComponentRegistry::builtin(), sink)
    }

    pub fn with_registry(registry: ComponentRegistry, sink: S) -> Self {
        Self {
            registry,
            sink,
            groups: HashMap::new(),
            group_order: Vec::new(),
            pages: HashMap::new(),
            current_page: None,
            current_page_id: None,
            navigation: NavigationQueue::new(),
            outbox: Vec::new(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn group(&self, group_id: &str) -> Option<&PageGroup> {
        self.groups.get(group_id)
    }

    /// Groups in the order they were added.
    pub fn groups(&self) -> impl Iterator<Item = &PageGroup> {
        self.group_order
            .iter()
            .filter_map(|group_id| self.groups.get(group_id))
    }

    pub fn group_mut(&mut self, group_id: &str) -> Option<&mut PageGroup> {
        self.groups.get_mut(group_id)
    }

    pub fn page(&self, page_id: &str) -> Option<&Page> {
        self.pages.get(page_id)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.current_page
            .as_deref()
            .and_then(|page| self.pages.get(page))
    }

    /// Full id of the current page as the server announced it.
    pub fn current_page_id(&self) -> Option<&str> {
        self.current_page_id.as_deref()
    }

    pub fn navigation(&self) -> &NavigationQueue {
        &self.navigation
    }

    /// Packets produced since the last drain, oldest first.
    pub fn drain_outbox(&mut self) -> Vec<ClientPacket> {
        std::mem::take(&mut self.outbox)
    }

    /// Forget everything; used when a new session is welcomed.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.group_order.clear();
        self.pages.clear();
        self.current_page = None;
        self.current_page_id = None;
        self.navigation.drain();
        self.sink.emit(UiEvent::Cleared);
    }

    // ============================================
    // NAVIGATION
    // ============================================

    /// Ask the server for `page_id`. Repeats of the current or pending page are ignored.
    pub fn request_page(&mut self, page_id: &str) {
        if self.current_page_id.as_deref() == Some(page_id) {
            debug!("Page \"{}\" is already current", page_id);
            return;
        }
        if self
            .navigation
            .head()
            .is_some_and(|head| head.requested_page_id == page_id)
        {
            debug!("Page \"{}\" is already requested", page_id);
            return;
        }
        let key = page_key(page_id).to_string();
        if !self.pages.contains_key(&key) {
            warn!("Cannot request unknown page \"{}\"", page_id);
            self.sink.emit(UiEvent::UnknownPage {
                page_id: Some(page_id.to_string()),
            });
            return;
        }

        info!("Requesting page \"{}\"", page_id);
        let previous = self
            .navigation
            .head()
            .map(|head| head.page.clone())
            .or_else(|| self.current_page.clone());
        if let Some(previous) = previous {
            self.deselect(&previous);
        }
        self.select(&key);
        self.navigation.push(PendingNavigation {
            page: key,
            requested_page_id: page_id.to_string(),
        });
        self.sink.emit(UiEvent::PageLoaderShown);
        self.outbox.push(ClientPacket::ChangePage {
            page_id: Some(page_id.to_string()),
        });
    }

    /// Ask the server to pick the page.
    pub fn request_default_page(&mut self) {
        if let Some(current) = self.current_page.clone() {
            self.deselect(&current);
        }
        info!("Requesting default page");
        self.outbox.push(ClientPacket::ChangePage { page_id: None });
    }

    /// Server announced the page now shown.
    pub fn on_change_page(&mut self, page_id: Option<String>) {
        let Some(page_id) = page_id else {
            warn!("Server changed to a page without an id");
            self.sink.emit(UiEvent::UnknownPage { page_id: None });
            return;
        };
        let key = page_key(&page_id).to_string();
        if !self.pages.contains_key(&key) {
            warn!("Server changed to unknown page \"{}\"", page_id);
            self.sink.emit(UiEvent::UnknownPage {
                page_id: Some(page_id),
            });
            return;
        }

        if self.current_page_id.as_deref() == Some(page_id.as_str()) {
            info!("Cancelling page change, \"{}\" stays current", page_id);
            for pending in self.navigation.drain() {
                if pending.page != key {
                    self.deselect(&pending.page);
                }
            }
            self.select(&key);
            self.sink.emit(UiEvent::PageLoaderHidden);
            return;
        }

        let forced = !self.navigation.head_targets(&key);
        if forced {
            info!("Forced change to \"{}\"", page_id);
            for pending in self.navigation.drain() {
                self.deselect(&pending.page);
            }
            if let Some(current) = self.current_page.clone() {
                self.deselect(&current);
            }
        } else {
            info!("Changing to \"{}\"", page_id);
            self.navigation.drain();
        }
        self.select(&key);
        self.current_page = Some(key.clone());
        self.current_page_id = Some(page_id.clone());
        self.sink.emit(UiEvent::PageSelected {
            page_id: key,
            requested_page_id: page_id,
            forced,
        });
    }

    fn select(&mut self, page_id: &str) {
        if let Some(page) = self.pages.get_mut(page_id) {
            page.select();
        }
    }

    fn deselect(&mut self, page_id: &str) {
        if let Some(page) = self.pages.get_mut(page_id) {
            if page.is_selected() {
                page.deselect();
                self.sink.emit(UiEvent::PageDeselected {
                    page_id: page_id.to_string(),
                });
            }
        }
    }

    // ============================================
    // PAGE LIST
    // ============================================

    /// Apply a catalog delta, then ask for the default page.
    pub fn on_page_list_change(&mut self, change: PageListChange) {
        for group in change.groups_added {
            self.add_group(group.id, group.name);
        }
        for group_id in change.groups_removed {
            self.remove_group(&group_id);
        }
        for group in change.groups_updated {
            match self.groups.get_mut(&group.id) {
                Some(existing) => {
                    existing.set_display_name(group.name.clone());
                    self.sink.emit(UiEvent::GroupUpdated {
                        group_id: group.id,
                        name: group.name,
                    });
                }
                None => warn!("Cannot update unknown page group \"{}\"", group.id),
            }
        }
        for page in change.pages_added {
            self.add_page(page);
        }
        for page_id in change.pages_removed {
            self.remove_page(&page_id);
        }
        for page in change.pages_updated {
            self.update_page(page);
        }

        self.request_default_page();
        self.sink.emit(UiEvent::UiLoaderHidden);
    }

    fn add_group(&mut self, group_id: String, name: String) {
        match self.groups.get_mut(&group_id) {
            Some(existing) => {
                debug!("Page group \"{}\" re-added, renaming", group_id);
                existing.set_display_name(name.clone());
            }
            None => {
                self.groups
                    .insert(group_id.clone(), PageGroup::new(group_id.clone(), name.clone()));
                self.group_order.push(group_id.clone());
            }
        }
        self.sink.emit(UiEvent::GroupAdded { group_id, name });
    }

    fn remove_group(&mut self, group_id: &str) {
        let Some(group) = self.groups.get(group_id) else {
            warn!("Cannot remove unknown page group \"{}\"", group_id);
            return;
        };
        for page_id in group.pages().to_vec() {
            self.remove_page(&page_id);
        }
        self.groups.remove(group_id);
        self.group_order.retain(|id| id != group_id);
        self.sink.emit(UiEvent::GroupRemoved {
            group_id: group_id.to_string(),
        });
    }

    fn add_page(&mut self, record: PageRecord) {
        if self.pages.contains_key(&record.id) {
            debug!("Page \"{}\" re-added, replacing", record.id);
            self.link_group(&record.id, None);
        }
        let mut page = Page::new(record.id.clone(), record.name.clone(), record.icon.clone());
        if self.current_page.as_deref() == Some(record.id.as_str()) {
            page.select();
        }
        self.pages.insert(record.id.clone(), page);
        let group_id = self.link_group(&record.id, record.group_id);
        self.sink.emit(UiEvent::PageAdded {
            page_id: record.id,
            name: record.name,
            icon: record.icon,
            group_id,
        });
    }

    fn update_page(&mut self, record: PageRecord) {
        let Some(page) = self.pages.get_mut(&record.id) else {
            warn!("Cannot update unknown page \"{}\"", record.id);
            return;
        };
        page.set_display_name(record.name.clone());
        page.set_icon(record.icon.clone());
        let current_group = page.group().map(str::to_string);
        let group_id = match record.group_id {
            Some(group_id) if self.groups.contains_key(&group_id) => {
                self.link_group(&record.id, Some(group_id))
            }
            Some(group_id) => {
                debug!(
                    "Page \"{}\" names unknown group \"{}\", keeping its group",
                    record.id, group_id
                );
                current_group
            }
            None => current_group,
        };
        self.sink.emit(UiEvent::PageUpdated {
            page_id: record.id,
            name: record.name,
            icon: record.icon,
            group_id,
        });
    }

    /// Move `page_id` into `group_id`. Unknown groups leave the page ungrouped.
    fn link_group(&mut self, page_id: &str, group_id: Option<String>) -> Option<String> {
        let group_id = group_id.filter(|group_id| {
            let known = self.groups.contains_key(group_id);
            if !known {
                debug!(
                    "Page \"{}\" names unknown group \"{}\", leaving it ungrouped",
                    page_id, group_id
                );
            }
            known
        });
        let Some(page) = self.pages.get_mut(page_id) else {
            return None;
        };
        if page.group() == group_id.as_deref() {
            return group_id;
        }
        if let Some(old) = page.group().and_then(|old| self.groups.get_mut(old)) {
            old.unlink(page_id);
        }
        if let Some(new) = group_id.as_deref().and_then(|new| self.groups.get_mut(new)) {
            new.link(page_id);
        }
        page.set_group(group_id.clone());
        group_id
    }

    /// Drop a page. Dropping the current page falls back to the default page.
    pub fn remove_page(&mut self, page_id: &str) {
        if !self.pages.contains_key(page_id) {
            warn!("Cannot remove unknown page \"{}\"", page_id);
            return;
        }
        self.link_group(page_id, None);
        let was_current = self.current_page.as_deref() == Some(page_id);
        if was_current {
            self.deselect(page_id);
            self.current_page = None;
            self.current_page_id = None;
        }
        self.pages.remove(page_id);
        self.sink.emit(UiEvent::PageRemoved {
            page_id: page_id.to_string(),
        });
        if was_current {
            self.sink.emit(UiEvent::PageLoaderShown);
            self.request_default_page();
        }
    }

    // ============================================
    // PAGE CONTENT
    // ============================================

    /// Apply a component delta to the current page.
    pub fn on_update_page(&mut self, update: UpdatePage) {
        match self.current_page.clone() {
            Some(current) => {
                for added in update.components_added {
                    self.add_component(&current, added);
                }
                for component_id in update.components_removed {
                    self.remove_component(&current, component_id);
                }
                for updated in update.properties_updated {
                    self.update_property(&current, updated);
                }
            }
            None => warn!("Page update arrived with no page selected, ignoring"),
        }

        if self.navigation.is_empty() {
            self.sink.emit(UiEvent::PageLoaderHidden);
        }
    }

    fn add_component(&mut self, page_id: &str, added: AddedComponent) {
        let type_name = added.type_name.as_deref().unwrap_or_default();
        let Some(mut component) = self.registry.create(type_name, added.component_id) else {
            warn!("Unknown component \"{}\" requested, skipping", type_name);
            return;
        };
        let values = match decode_properties(&component, added.properties.reader()) {
            Ok(values) => values,
            Err(error) => {
                warn!(
                    "Malformed property block for component {} ({}), skipping: {}",
                    added.component_id, type_name, error
                );
                return;
            }
        };
        let Some(page) = self.pages.get_mut(page_id) else {
            return;
        };

        let component_id = component.id();
        if page.components_mut().remove(&component_id).is_some() {
            warn!("Component {} added twice, replacing", component_id);
            self.sink.emit(UiEvent::ComponentRemoved { component_id });
        }
        self.sink.emit(UiEvent::ComponentAdded {
            component_id,
            component_type: component.component_type(),
        });
        let sink = &mut self.sink;
        for property in component.properties_mut() {
            property.initialize(|change| {
                sink.emit(UiEvent::PropertyChanged {
                    component_id,
                    change,
                })
            });
        }
        for (property, value) in component.properties_mut().iter_mut().zip(values) {
            property.set(value, |change| {
                sink.emit(UiEvent::PropertyChanged {
                    component_id,
                    change,
                })
            });
        }
        page.components_mut().insert(component_id, component);
    }

    fn remove_component(&mut self, page_id: &str, component_id: u32) {
        let removed = self
            .pages
            .get_mut(page_id)
            .and_then(|page| page.components_mut().remove(&component_id));
        match removed {
            Some(_) => self.sink.emit(UiEvent::ComponentRemoved { component_id }),
            None => warn!("Cannot remove unknown component {}", component_id),
        }
    }

    fn update_property(&mut self, page_id: &str, updated: UpdatedProperty) {
        let component_id = updated.component_id;
        let Some(component) = self
            .pages
            .get_mut(page_id)
            .and_then(|page| page.components_mut().get_mut(&component_id))
        else {
            warn!("Property update for unknown component {}", component_id);
            return;
        };
        let Some(property) = component.property_mut(updated.property_id) else {
            warn!(
                "Unknown property {} on component {} ({})",
                updated.property_id,
                component_id,
                component.component_type()
            );
            return;
        };
        let sink = &mut self.sink;
        let mut reader = updated.value.reader();
        if let Err(error) = property.decode_and_set(&mut reader, |change| {
            sink.emit(UiEvent::PropertyChanged {
                component_id,
                change,
            })
        }) {
            warn!(
                "Malformed value for property {} on component {}: {}",
                updated.property_id, component_id, error
            );
        }
    }

    /// Decode a server action against the target component's declaration.
    pub fn on_server_action(&mut self, action: ServerAction) {
        let component_id = action.component_id;
        let Some(component) = self
            .current_page()
            .and_then(|page| page.component(component_id))
        else {
            warn!("Server action for unknown component {}", component_id);
            return;
        };
        let Some(spec) = component.server_action(action.action_id).copied() else {
            warn!(
                "Unknown server action {} on component {}",
                action.action_id, component_id
            );
            return;
        };
        match spec.kind.read_server(&mut action.payload.reader()) {
            Ok(value) => self.sink.emit(UiEvent::ServerAction {
                component_id,
                action: spec.name,
                value,
            }),
            Err(error) => warn!(
                "Malformed payload for server action {} on component {}: {}",
                spec.name, component_id, error
            ),
        }
    }

    /// Queue the packet for client action `action` on a component of the current page.
    pub fn send_action(&mut self, component_id: u32, action: &str, value: ActionValue) -> bool {
        let packet = self
            .current_page()
            .and_then(|page| page.component(component_id))
            .and_then(|component| component.action_packet(action, value));
        match packet {
            Some(packet) => {
                self.outbox.push(packet);
                true
            }
            None => {
                warn!(
                    "Cannot send action \"{}\" to component {}",
                    action, component_id
                );
                false
            }
        }
    }
}

fn decode_properties(
    component: &Component,
    mut reader: ByteReader<'_>,
) -> Result<Vec<PropertyValue>, CodecError> {
    component
        .properties()
        .iter()
        .map(|property| property.kind().decode(&mut reader))
        .collect()
}
