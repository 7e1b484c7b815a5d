//! Dynamic property access for host glue (inspectors, scripting panels).
//!
//! Every morph exposes a fixed set of named properties. Derived ones are
//! computed from the tree on read and reject writes.

use crate::error::{MorphError, Result};
use crate::geometry::{Color, Point, Rect};
use crate::tree::NodeId;
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Width,
    Height,
    Position,
    Color,
    Hidden,
    Scale,
    Name,
    Texture,
    WorldPosition,
    AbsolutePosition,
    Bounds,
}

impl Property {
    pub const ALL: [Property; 11] = [
        Property::Width,
        Property::Height,
        Property::Position,
        Property::Color,
        Property::Hidden,
        Property::Scale,
        Property::Name,
        Property::Texture,
        Property::WorldPosition,
        Property::AbsolutePosition,
        Property::Bounds,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Property::Width => "width",
            Property::Height => "height",
            Property::Position => "position",
            Property::Color => "color",
            Property::Hidden => "is_hidden",
            Property::Scale => "scale",
            Property::Name => "name",
            Property::Texture => "texture",
            Property::WorldPosition => "world_position",
            Property::AbsolutePosition => "absolute_position",
            Property::Bounds => "bounds",
        }
    }

    pub fn from_name(name: &str) -> Option<Property> {
        Property::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn is_read_only(self) -> bool {
        matches!(
            self,
            Property::WorldPosition | Property::AbsolutePosition | Property::Bounds
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Scalar(f32),
    Point(Point),
    Color(Color),
    Flag(bool),
    Text(Option<String>),
    Rect(Rect),
}

fn type_error(property: Property, expected: &'static str) -> MorphError {
    MorphError::PropertyType {
        property: property.name(),
        expected,
    }
}

impl World {
    pub fn get_property(&self, id: NodeId, property: Property) -> Result<PropertyValue> {
        let morph = self.get(id)?;
        let value = match property {
            Property::Width => PropertyValue::Scalar(morph.width()),
            Property::Height => PropertyValue::Scalar(morph.height()),
            Property::Position => PropertyValue::Point(morph.get_position()),
            Property::Color => PropertyValue::Color(morph.get_color()),
            Property::Hidden => PropertyValue::Flag(morph.is_hidden()),
            Property::Scale => PropertyValue::Scalar(morph.scale()),
            Property::Name => PropertyValue::Text(morph.get_name().map(str::to_string)),
            Property::Texture => {
                PropertyValue::Text(morph.textures().active_name().map(str::to_string))
            }
            Property::WorldPosition => PropertyValue::Point(self.world_position(id)),
            Property::AbsolutePosition => PropertyValue::Point(self.absolute_position(id)),
            Property::Bounds => PropertyValue::Rect(morph.bounds()),
        };
        Ok(value)
    }

    pub fn set_property(
        &mut self,
        id: NodeId,
        property: Property,
        value: PropertyValue,
    ) -> Result<()> {
        if property.is_read_only() {
            return Err(MorphError::ReadOnlyProperty(property.name()));
        }

        match (property, value) {
            (Property::Width, PropertyValue::Scalar(v)) => self.get_mut(id)?.set_width(v),
            (Property::Height, PropertyValue::Scalar(v)) => self.get_mut(id)?.set_height(v),
            (Property::Position, PropertyValue::Point(p)) => {
                self.get_mut(id)?.set_position(p);
                Ok(())
            }
            (Property::Color, PropertyValue::Color(c)) => {
                self.get_mut(id)?.set_color(c);
                Ok(())
            }
            (Property::Hidden, PropertyValue::Flag(hidden)) => self.set_hidden(id, hidden),
            (Property::Scale, PropertyValue::Scalar(s)) => self.set_scale(id, s),
            (Property::Name, PropertyValue::Text(name)) => {
                self.get_mut(id)?.set_name(name);
                Ok(())
            }
            (Property::Texture, PropertyValue::Text(Some(name))) => self.set_texture(id, &name),
            (Property::Texture, PropertyValue::Text(None)) => {
                self.get_mut(id)?.textures_mut().deactivate();
                Ok(())
            }
            (Property::Width | Property::Height | Property::Scale, _) => {
                Err(type_error(property, "scalar"))
            }
            (Property::Position, _) => Err(type_error(property, "point")),
            (Property::Color, _) => Err(type_error(property, "color")),
            (Property::Hidden, _) => Err(type_error(property, "flag")),
            (Property::Name | Property::Texture, _) => Err(type_error(property, "text")),
            (Property::WorldPosition | Property::AbsolutePosition | Property::Bounds, _) => {
                Err(MorphError::ReadOnlyProperty(property.name()))
            }
        }
    }
}
