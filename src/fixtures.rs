//! Property builders shared by the unit tests.

use crate::models::{ListingType, Location, Property, PropertyStatus, PropertyType};
use chrono::{TimeZone, Utc};

pub fn property(id: &str, title: &str, price: f64) -> Property {
    let created = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
    Property {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        price,
        currency: "USD".to_string(),
        property_type: PropertyType::House,
        listing_type: ListingType::Sale,
        status: PropertyStatus::Active,
        bedrooms: None,
        bathrooms: None,
        area: 100.0,
        location: Location {
            address: String::new(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62701".to_string(),
            latitude: None,
            longitude: None,
        },
        features: Vec::new(),
        agent_id: None,
        is_featured: false,
        views: 0,
        created_at: created,
        updated_at: created,
    }
}

pub fn with_features(mut property: Property, features: &[&str]) -> Property {
    property.features = features.iter().map(|f| f.to_string()).collect();
    property
}

pub fn ids(properties: &[Property]) -> Vec<&str> {
    properties.iter().map(|p| p.id.as_str()).collect()
}
