use crate::config::DEFAULT_PAGE_SIZE;
use crate::models::{ListingType, Location, PropertyStatus, PropertyType};
use serde::{Deserialize, Serialize};

/// Offset/limit window over an ordered listing query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Page {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// Zero-based page number of `size` rows
    pub fn number(number: usize, size: usize) -> Self {
        Self::new(number.saturating_mul(size), size)
    }

    pub fn next(&self) -> Self {
        Self::new(self.offset.saturating_add(self.limit), self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// Payload for creating a listing; the store assigns id and timestamps
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProperty {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub currency: String,
    pub property_type: PropertyType,
    pub listing_type: ListingType,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f32>,
    pub area: f64,
    #[serde(flatten)]
    pub location: Location,
    pub features: Vec<String>,
    pub agent_id: Option<String>,
    pub is_featured: bool,
}

/// Partial update; only `Some` fields are sent
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PropertyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PropertyStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_type: Option<ListingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_navigation() {
        let page = Page::number(2, 10);
        assert_eq!(page, Page::new(20, 10));
        assert_eq!(page.next(), Page::new(30, 10));
        assert_eq!(Page::default().limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_update_serializes_only_set_fields() {
        let update = PropertyUpdate {
            price: Some(199_000.0),
            status: Some(PropertyStatus::Pending),
            ..Default::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, serde_json::json!({"price": 199000.0, "status": "pending"}));
    }
}
