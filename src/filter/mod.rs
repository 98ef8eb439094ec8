//! Structured narrowing of a candidate list.
//!
//! Every populated field of a [`PropertyFilter`] is an independent predicate;
//! a property survives only if it passes all of them. Unset fields, empty
//! lists and non-finite bounds constrain nothing.

use crate::models::{ListingType, Property, PropertyType};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Query specification built fresh for each user interaction
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PropertyFilter {
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub property_type: Option<Vec<PropertyType>>,
    #[serde(default, deserialize_with = "lenient_value", skip_serializing_if = "Option::is_none")]
    pub listing_type: Option<ListingType>,
    #[serde(default, deserialize_with = "lenient_bound", skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_bound", skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<Vec<u32>>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<Vec<f32>>,
    #[serde(default, deserialize_with = "lenient_bound", skip_serializing_if = "Option::is_none")]
    pub min_area: Option<f64>,
    #[serde(default, deserialize_with = "lenient_bound", skip_serializing_if = "Option::is_none")]
    pub max_area: Option<f64>,
    #[serde(default, deserialize_with = "lenient_value", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

/// Accepts a number or a numeric string; anything else means "no bound".
fn lenient_bound<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let bound = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(bound.filter(|b| b.is_finite()))
}

/// Read one filter value, trying the raw JSON, then a lower-cased string,
/// then a numeric string. `None` when nothing fits.
fn coerce<T: DeserializeOwned>(value: Value) -> Option<T> {
    let raw = match value {
        Value::String(s) => s,
        other => return serde_json::from_value(other).ok(),
    };
    let trimmed = raw.trim();

    if let Ok(parsed) = serde_json::from_value(Value::String(trimmed.to_string())) {
        return Some(parsed);
    }
    if let Ok(parsed) = serde_json::from_value(Value::String(trimmed.to_lowercase())) {
        return Some(parsed);
    }
    let number = if let Ok(n) = trimmed.parse::<u64>() {
        Value::from(n)
    } else {
        Value::from(trimmed.parse::<f64>().ok()?)
    };
    serde_json::from_value(number).ok()
}

/// Single value; a malformed one means "no constraint".
fn lenient_value<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => Ok(coerce(value)),
    }
}

/// List value; malformed entries are dropped and a bare scalar counts as a
/// one-entry list.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values: Vec<T> = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(None),
        Value::Array(items) => items.into_iter().filter_map(coerce).collect(),
        scalar => coerce(scalar).into_iter().collect(),
    };
    Ok(Some(values).filter(|v| !v.is_empty()))
}

/// A bound only constrains when it is a real number.
pub(crate) fn bound(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// An optional list only constrains when it has entries.
fn non_empty<T>(values: &Option<Vec<T>>) -> Option<&[T]> {
    values.as_deref().filter(|v| !v.is_empty())
}

impl PropertyFilter {
    /// True when no field would constrain anything.
    pub fn is_empty(&self) -> bool {
        self.listing_type.is_none()
            && non_empty(&self.property_type).is_none()
            && bound(self.min_price).is_none()
            && bound(self.max_price).is_none()
            && non_empty(&self.bedrooms).is_none()
            && non_empty(&self.bathrooms).is_none()
            && bound(self.min_area).is_none()
            && bound(self.max_area).is_none()
            && self.city_needle().is_none()
            && non_empty(&self.features).is_none()
    }

    pub(crate) fn city_needle(&self) -> Option<String> {
        self.city
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_lowercase)
    }

    pub fn property_types(&self) -> Option<&[PropertyType]> {
        non_empty(&self.property_type)
    }

    pub fn bedroom_counts(&self) -> Option<&[u32]> {
        non_empty(&self.bedrooms)
    }

    pub fn bathroom_counts(&self) -> Option<&[f32]> {
        non_empty(&self.bathrooms)
    }

    pub fn wanted_features(&self) -> Option<&[String]> {
        non_empty(&self.features)
    }

    /// Check a single property against every populated predicate.
    pub fn matches(&self, property: &Property) -> bool {
        if let Some(listing_type) = self.listing_type {
            if property.listing_type != listing_type {
                return false;
            }
        }

        if let Some(types) = self.property_types() {
            if !types.contains(&property.property_type) {
                return false;
            }
        }

        if let Some(min) = bound(self.min_price) {
            if property.price < min {
                return false;
            }
        }
        if let Some(max) = bound(self.max_price) {
            if property.price > max {
                return false;
            }
        }

        if let Some(counts) = self.bedroom_counts() {
            match property.bedrooms {
                Some(beds) if counts.contains(&beds) => {}
                _ => return false,
            }
        }

        if let Some(counts) = self.bathroom_counts() {
            match property.bathrooms {
                Some(baths) if counts.iter().any(|c| (c - baths).abs() < f32::EPSILON) => {}
                _ => return false,
            }
        }

        if let Some(min) = bound(self.min_area) {
            if property.area < min {
                return false;
            }
        }
        if let Some(max) = bound(self.max_area) {
            if property.area > max {
                return false;
            }
        }

        if let Some(city) = self.city_needle() {
            if !property.location.city.to_lowercase().contains(&city) {
                return false;
            }
        }

        // Any requested feature is enough.
        if let Some(wanted) = self.wanted_features() {
            if !wanted.iter().any(|w| property.features.contains(w)) {
                return false;
            }
        }

        true
    }
}

/// Narrow `properties` to those passing `filter`, preserving input order.
pub fn apply_filters(properties: &[Property], filter: &PropertyFilter) -> Vec<Property> {
    properties
        .iter()
        .filter(|p| filter.matches(p))
        .cloned()
        .collect()
}
