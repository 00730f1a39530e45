use crate::protocol::{ActionKind, ActionValue, ClientPacket};
use crate::sync::property::{Color, EnumValue, Property, PropertyKind, PropertyValue, ThemeColor};

use std::collections::HashMap;

/// A declared client or server action slot. Ids are declaration positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSpec {
    pub id: u16,
    pub name: &'static str,
    pub kind: ActionKind,
}

/// A live component on the current page.
#[derive(Debug, Clone)]
pub struct Component {
    id: u32,
    component_type: &'static str,
    properties: Vec<Property>,
    client_actions: Vec<ActionSpec>,
    server_actions: Vec<ActionSpec>,
}

impl Component {
    pub fn builder(id: u32, component_type: &'static str) -> ComponentBuilder {
        ComponentBuilder {
            component: Component {
                id,
                component_type,
                properties: Vec::new(),
                client_actions: Vec::new(),
                server_actions: Vec::new(),
            },
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn component_type(&self) -> &'static str {
        self.component_type
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut [Property] {
        &mut self.properties
    }

    pub fn property(&self, id: u16) -> Option<&Property> {
        self.properties.get(usize::from(id))
    }

    pub fn property_mut(&mut self, id: u16) -> Option<&mut Property> {
        self.properties.get_mut(usize::from(id))
    }

    pub fn property_by_name(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.name() == name)
    }

    pub fn client_actions(&self) -> &[ActionSpec] {
        &self.client_actions
    }

    pub fn client_action(&self, name: &str) -> Option<&ActionSpec> {
        self.client_actions.iter().find(|action| action.name == name)
    }

    pub fn server_action(&self, id: u16) -> Option<&ActionSpec> {
        self.server_actions.get(usize::from(id))
    }

    /// Build the packet that fires client action `name` with `value`.
    ///
    /// Returns `None` when the action is unknown or the value has the wrong kind.
    pub fn action_packet(&self, name: &str, value: ActionValue) -> Option<ClientPacket> {
        let action = self.client_action(name)?;
        if action.kind != value.kind() {
            return None;
        }
        Some(ClientPacket::PageAction {
            component_id: self.id,
            action_id: action.id,
            payload: value,
        })
    }
}

/// Declares a component type's properties and actions in wire order.
pub struct ComponentBuilder {
    component: Component,
}

impl ComponentBuilder {
    fn property(
        mut self,
        name: &'static str,
        kind: PropertyKind,
        default: Option<PropertyValue>,
    ) -> Self {
        let id = self.component.properties.len() as u16;
        self.component
            .properties
            .push(Property::new(id, name, kind, default));
        self
    }

    pub fn boolean(self, name: &'static str, default: Option<bool>) -> Self {
        self.property(name, PropertyKind::Boolean, default.map(PropertyValue::Boolean))
    }

    pub fn byte_string(self, name: &'static str, default: Option<Option<&str>>) -> Self {
        self.property(name, PropertyKind::ByteString, text_default(default))
    }

    pub fn short_string(self, name: &'static str, default: Option<Option<&str>>) -> Self {
        self.property(name, PropertyKind::ShortString, text_default(default))
    }

    /// `Some(None)` defaults to null; `None` leaves the property undefined.
    pub fn string(self, name: &'static str, default: Option<Option<&str>>) -> Self {
        self.property(name, PropertyKind::String, text_default(default))
    }

    pub fn byte(self, name: &'static str, default: Option<u8>) -> Self {
        self.property(name, PropertyKind::Byte, default.map(PropertyValue::Byte))
    }

    pub fn short(self, name: &'static str, default: Option<u16>) -> Self {
        self.property(name, PropertyKind::Short, default.map(PropertyValue::Short))
    }

    pub fn integer(self, name: &'static str, default: Option<u32>) -> Self {
        self.property(name, PropertyKind::Integer, default.map(PropertyValue::Integer))
    }

    pub fn float(self, name: &'static str, default: Option<f32>) -> Self {
        self.property(name, PropertyKind::Float, default.map(PropertyValue::Float))
    }

    /// `default` is an index into `values`.
    pub fn enumeration(
        self,
        name: &'static str,
        values: &'static [&'static str],
        default: Option<u32>,
    ) -> Self {
        let default = default.map(|ordinal| {
            PropertyValue::Enum(
                values
                    .get(ordinal as usize)
                    .map(|name| EnumValue { ordinal, name: *name }),
            )
        });
        self.property(name, PropertyKind::Enum(values), default)
    }

    pub fn color(self, name: &'static str, default: Option<Color>) -> Self {
        self.property(name, PropertyKind::Color, default.map(PropertyValue::Color))
    }

    pub fn theme_color(self, name: &'static str, default: Option<ThemeColor>) -> Self {
        self.property(
            name,
            PropertyKind::ThemeColor,
            default.map(|color| PropertyValue::Color(Color::Theme(color))),
        )
    }

    fn client_action(mut self, name: &'static str, kind: ActionKind) -> Self {
        let id = self.component.client_actions.len() as u16;
        self.component
            .client_actions
            .push(ActionSpec { id, name, kind });
        self
    }

    pub fn void_client_action(self, name: &'static str) -> Self {
        self.client_action(name, ActionKind::Void)
    }

    pub fn string_client_action(self, name: &'static str) -> Self {
        self.client_action(name, ActionKind::String)
    }

    fn server_action(mut self, name: &'static str, kind: ActionKind) -> Self {
        let id = self.component.server_actions.len() as u16;
        self.component
            .server_actions
            .push(ActionSpec { id, name, kind });
        self
    }

    pub fn void_server_action(self, name: &'static str) -> Self {
        self.server_action(name, ActionKind::Void)
    }

    pub fn string_server_action(self, name: &'static str) -> Self {
        self.server_action(name, ActionKind::String)
    }

    pub fn build(self) -> Component {
        self.component
    }
}

fn text_default(default: Option<Option<&str>>) -> Option<PropertyValue> {
    default.map(|text| PropertyValue::Text(text.map(str::to_string)))
}

pub type ComponentConstructor = fn(u32) -> Component;

/// Maps wire type names to component constructors.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    constructors: HashMap<String, ComponentConstructor>,
}

impl ComponentRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with every built-in component type.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for (type_name, constructor) in crate::sync::catalog::BUILTIN_COMPONENTS {
            registry.register(*type_name, *constructor);
        }
        registry
    }

    /// Returns the constructor previously registered under `type_name`, if any.
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        constructor: ComponentConstructor,
    ) -> Option<ComponentConstructor> {
        self.constructors.insert(type_name.into(), constructor)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    pub fn create(&self, type_name: &str, component_id: u32) -> Option<Component> {
        self.constructors
            .get(type_name)
            .map(|constructor| constructor(component_id))
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }
}
