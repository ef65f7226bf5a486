//! The VEVENT under construction, before serialization.

use serde::Serialize;

/// Value of a passthrough property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PropertyValue {
    Text(String),
    /// Comma-separated properties such as CATEGORIES
    List(Vec<String>),
    Geo { latitude: f64, longitude: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedProperty {
    /// Lower-case property name without the `event-` prefix
    pub name: String,
    pub value: PropertyValue,
}

/// Properties collected for one feed entry.
///
/// Fixed fields (times, UID, summary) are set by the generator; everything
/// copied from metadata lands in `properties` in metadata order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedEvent {
    pub properties: Vec<FeedProperty>,
    pub comment: Option<String>,
}

impl FeedEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing an earlier value with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: PropertyValue) {
        let name = name.into();
        match self
            .properties
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(&name))
        {
            Some(existing) => existing.value = value,
            None => self.properties.push(FeedProperty { name, value }),
        }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| &p.value)
    }

    pub fn get_text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(PropertyValue::Text(s)) => Some(s),
            _ => None,
        }
    }
}
