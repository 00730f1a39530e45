//! Typed component properties.
//!
//! Each [`PropertyKind`] knows its own wire decoding. A [`Property`] holds the
//! current value and routes every mutation through [`Property::set`], which
//! reports the previous and next value before committing.

use crate::codec::ByteReader;
use crate::error::codec::CodecError;

use std::fmt::{Display, Formatter, Result as FormatResult};

use log::warn;

/// Built-in palette entries addressed by a u16 id on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeColor {
    BrightRed = 1,
    BrightOrange = 2,
    BrightYellow = 3,
    BrightGreen = 4,
    BrightCyan = 5,
    BrightBlue = 6,
    BrightPurple = 7,
    BrightMagenta = 8,
    BrightGray = 9,
    DarkRed = 10,
    DarkOrange = 11,
    DarkYellow = 12,
    DarkGreen = 13,
    DarkCyan = 14,
    DarkBlue = 15,
    DarkPurple = 16,
    DarkMagenta = 17,
    DarkGray = 18,
    Background = 19,
    BackgroundBrighter = 20,
    BackgroundDarker = 21,
    BackgroundEvenDarker = 22,
    Primary = 23,
    Secondary = 24,
    Text = 25,
}

impl ThemeColor {
    const ALL: [ThemeColor; 25] = [
        ThemeColor::BrightRed,
        ThemeColor::BrightOrange,
        ThemeColor::BrightYellow,
        ThemeColor::BrightGreen,
        ThemeColor::BrightCyan,
        ThemeColor::BrightBlue,
        ThemeColor::BrightPurple,
        ThemeColor::BrightMagenta,
        ThemeColor::BrightGray,
        ThemeColor::DarkRed,
        ThemeColor::DarkOrange,
        ThemeColor::DarkYellow,
        ThemeColor::DarkGreen,
        ThemeColor::DarkCyan,
        ThemeColor::DarkBlue,
        ThemeColor::DarkPurple,
        ThemeColor::DarkMagenta,
        ThemeColor::DarkGray,
        ThemeColor::Background,
        ThemeColor::BackgroundBrighter,
        ThemeColor::BackgroundDarker,
        ThemeColor::BackgroundEvenDarker,
        ThemeColor::Primary,
        ThemeColor::Secondary,
        ThemeColor::Text,
    ];

    /// Id 0 and ids past the palette mean "no color".
    pub fn from_id(id: u16) -> Option<ThemeColor> {
        Self::ALL.into_iter().find(|color| color.id() == id)
    }

    pub fn id(self) -> u16 {
        self as u16
    }

    /// Name of the palette slot in the rendering theme.
    pub fn theme_key(self) -> &'static str {
        match self {
            ThemeColor::BrightRed => "colors_bright_red",
            ThemeColor::BrightOrange => "colors_bright_orange",
            ThemeColor::BrightYellow => "colors_bright_yellow",
            ThemeColor::BrightGreen => "colors_bright_green",
            ThemeColor::BrightCyan => "colors_bright_cyan",
            ThemeColor::BrightBlue => "colors_bright_blue",
            ThemeColor::BrightPurple => "colors_bright_purple",
            ThemeColor::BrightMagenta => "colors_bright_magenta",
            ThemeColor::BrightGray => "colors_bright_gray",
            ThemeColor::DarkRed => "colors_dark_red",
            ThemeColor::DarkOrange => "colors_dark_orange",
            ThemeColor::DarkYellow => "colors_dark_yellow",
            ThemeColor::DarkGreen => "colors_dark_green",
            ThemeColor::DarkCyan => "colors_dark_cyan",
            ThemeColor::DarkBlue => "colors_dark_blue",
            ThemeColor::DarkPurple => "colors_dark_purple",
            ThemeColor::DarkMagenta => "colors_dark_magenta",
            ThemeColor::DarkGray => "colors_dark_gray",
            ThemeColor::Background => "background",
            ThemeColor::BackgroundBrighter => "backgroundBrighter",
            ThemeColor::BackgroundDarker => "backgroundDarker",
            ThemeColor::BackgroundEvenDarker => "backgroundEvenDarker",
            ThemeColor::Primary => "primary",
            ThemeColor::Secondary => "secondary",
            ThemeColor::Text => "text",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    None,
    Theme(ThemeColor),
    Rgba { red: u8, green: u8, blue: u8, alpha: u8 },
}

impl Color {
    pub fn from_theme_id(id: u16) -> Color {
        ThemeColor::from_id(id).map_or(Color::None, Color::Theme)
    }

    /// Alpha as a fraction in `0.0..=1.0`; theme colors are opaque.
    pub fn opacity(&self) -> f32 {
        match self {
            Color::None => 0.0,
            Color::Theme(_) => 1.0,
            Color::Rgba { alpha, .. } => f32::from(*alpha) / 255.0,
        }
    }
}

impl Display for Color {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        match self {
            Color::None => write!(formatter, "none"),
            Color::Theme(color) => write!(formatter, "theme({})", color.theme_key()),
            Color::Rgba {
                red,
                green,
                blue,
                alpha,
            } => write!(
                formatter,
                "rgba({}, {}, {}, {:.3})",
                red,
                green,
                blue,
                f32::from(*alpha) / 255.0
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumValue {
    pub ordinal: u32,
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Boolean(bool),
    Text(Option<String>),
    Byte(u8),
    Short(u16),
    Integer(u32),
    Float(f32),
    Enum(Option<EnumValue>),
    Color(Color),
}

impl PropertyValue {
    pub fn text(value: &str) -> PropertyValue {
        PropertyValue::Text(Some(value.to_string()))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(text) => text.as_deref(),
            _ => None,
        }
    }
}

impl Display for PropertyValue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        match self {
            PropertyValue::Boolean(value) => write!(formatter, "{}", value),
            PropertyValue::Text(Some(text)) => write!(formatter, "{:?}", text),
            PropertyValue::Text(None) => write!(formatter, "null"),
            PropertyValue::Byte(value) => write!(formatter, "{}", value),
            PropertyValue::Short(value) => write!(formatter, "{}", value),
            PropertyValue::Integer(value) => write!(formatter, "{}", value),
            PropertyValue::Float(value) => write!(formatter, "{}", value),
            PropertyValue::Enum(Some(value)) => write!(formatter, "{}", value.name),
            PropertyValue::Enum(None) => write!(formatter, "null"),
            PropertyValue::Color(color) => write!(formatter, "{}", color),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Boolean,
    /// u8 code-unit count.
    ByteString,
    /// u16 code-unit count.
    ShortString,
    /// u32 code-unit count.
    String,
    Byte,
    Short,
    Integer,
    Float,
    Enum(&'static [&'static str]),
    Color,
    ThemeColor,
}

impl PropertyKind {
    pub fn decode(&self, reader: &mut ByteReader<'_>) -> Result<PropertyValue, CodecError> {
        let value = match self {
            PropertyKind::Boolean => PropertyValue::Boolean(reader.read_u8()? > 0),
            PropertyKind::ByteString => PropertyValue::Text(reader.read_string_u8()?),
            PropertyKind::ShortString => PropertyValue::Text(reader.read_string_u16()?),
            PropertyKind::String => PropertyValue::Text(reader.read_string_u32()?),
            PropertyKind::Byte => PropertyValue::Byte(reader.read_u8()?),
            PropertyKind::Short => PropertyValue::Short(reader.read_u16()?),
            PropertyKind::Integer => PropertyValue::Integer(reader.read_u32()?),
            PropertyKind::Float => PropertyValue::Float(reader.read_f32()?),
            PropertyKind::Enum(values) => PropertyValue::Enum(decode_enum(values, reader)?),
            PropertyKind::Color => PropertyValue::Color(decode_color(reader)?),
            PropertyKind::ThemeColor => {
                PropertyValue::Color(Color::from_theme_id(reader.read_u16()?))
            }
        };
        Ok(value)
    }
}

fn decode_enum(
    values: &'static [&'static str],
    reader: &mut ByteReader<'_>,
) -> Result<Option<EnumValue>, CodecError> {
    let ordinal = if values.len() < 256 {
        u32::from(reader.read_u8()?)
    } else if values.len() < 65536 {
        u32::from(reader.read_u16()?)
    } else {
        reader.read_u32()?
    };
    let value = values.get(ordinal as usize).map(|name| EnumValue {
        ordinal,
        name: *name,
    });
    if value.is_none() {
        warn!(
            "Enum ordinal {} out of range for {} values, treating as null",
            ordinal,
            values.len()
        );
    }
    Ok(value)
}

fn decode_color(reader: &mut ByteReader<'_>) -> Result<Color, CodecError> {
    let alpha = reader.read_u8()?;
    if alpha == 0 {
        reader.skip(1)?;
        return Ok(Color::from_theme_id(reader.read_u16()?));
    }
    Ok(Color::Rgba {
        red: reader.read_u8()?,
        green: reader.read_u8()?,
        blue: reader.read_u8()?,
        alpha,
    })
}

/// Old and new value of one property mutation. `old` is `None` on first set.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChange {
    pub property_id: u16,
    pub name: &'static str,
    pub old: Option<PropertyValue>,
    pub new: PropertyValue,
}

#[derive(Debug, Clone)]
pub struct Property {
    id: u16,
    name: &'static str,
    kind: PropertyKind,
    default: Option<PropertyValue>,
    value: Option<PropertyValue>,
}

impl Property {
    pub fn new(
        id: u16,
        name: &'static str,
        kind: PropertyKind,
        default: Option<PropertyValue>,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            default,
            value: None,
        }
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    pub fn default_value(&self) -> Option<&PropertyValue> {
        self.default.as_ref()
    }

    /// `None` until the first set.
    pub fn value(&self) -> Option<&PropertyValue> {
        self.value.as_ref()
    }

    /// Report the change to `on_change`, then commit `new`.
    pub fn set(&mut self, new: PropertyValue, on_change: impl FnOnce(PropertyChange)) {
        on_change(PropertyChange {
            property_id: self.id,
            name: self.name,
            old: self.value.clone(),
            new: new.clone(),
        });
        self.value = Some(new);
    }

    /// Apply the declared default, if there is one.
    pub fn initialize(&mut self, on_change: impl FnOnce(PropertyChange)) {
        if let Some(default) = self.default.clone() {
            self.set(default, on_change);
        }
    }

    pub fn decode_and_set(
        &mut self,
        reader: &mut ByteReader<'_>,
        on_change: impl FnOnce(PropertyChange),
    ) -> Result<(), CodecError> {
        let value = self.kind.decode(reader)?;
        self.set(value, on_change);
        Ok(())
    }
}
