use crate::error::{RepositoryError, Result};
use crate::filter::{apply_filters, PropertyFilter};
use crate::models::{
    AgentProfile, ListingType, Location, Property, PropertyDetails, PropertyImage,
    PropertyStatus, PropertyType,
};
use crate::repository::traits::PropertyRepository;
use crate::repository::types::{NewProperty, Page, PropertyUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Default)]
struct Store {
    properties: Vec<Property>,
    agents: HashMap<String, AgentProfile>,
    images: Vec<PropertyImage>,
    next_id: u64,
}

impl Store {
    fn position(&self, id: &str) -> Result<usize> {
        self.properties
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    /// Active listings, newest first; ties keep insertion order
    fn active_newest_first(&self) -> Vec<Property> {
        let mut active: Vec<Property> = self
            .properties
            .iter()
            .filter(|p| p.status == PropertyStatus::Active)
            .cloned()
            .collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        active
    }
}

fn paginate(properties: Vec<Property>, page: Page) -> Vec<Property> {
    properties
        .into_iter()
        .skip(page.offset)
        .take(page.limit)
        .collect()
}

/// Listing store held in process memory.
///
/// Used for local JSON data sets, the bundled sample listings and tests.
#[derive(Default)]
pub struct InMemoryPropertyRepository {
    store: RwLock<Store>,
}

impl InMemoryPropertyRepository {
    pub fn new(properties: Vec<Property>) -> Self {
        Self::with_relations(properties, Vec::new(), Vec::new())
    }

    pub fn with_relations(
        properties: Vec<Property>,
        agents: Vec<AgentProfile>,
        images: Vec<PropertyImage>,
    ) -> Self {
        let next_id = properties.len() as u64 + 1;
        Self {
            store: RwLock::new(Store {
                properties,
                agents: agents.into_iter().map(|a| (a.id.clone(), a)).collect(),
                images,
                next_id,
            }),
        }
    }

    /// Load a JSON array of properties, e.g. an export of the listings table
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let properties: Vec<Property> = serde_json::from_str(&raw)?;
        info!("Loaded {} properties from {}", properties.len(), path.display());
        Ok(Self::new(properties))
    }

    /// Repository seeded with [`sample_properties`] and their agents/images
    pub fn sample() -> Self {
        Self::with_relations(sample_properties(), sample_agents(), sample_images())
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.properties.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PropertyRepository for InMemoryPropertyRepository {
    async fn fetch_active(&self, page: Page) -> Result<Vec<Property>> {
        let store = self.store.read().await;
        Ok(paginate(store.active_newest_first(), page))
    }

    async fn fetch_by_id(&self, id: &str) -> Result<PropertyDetails> {
        let store = self.store.read().await;
        let property = store.properties[store.position(id)?].clone();

        let agent = property
            .agent_id
            .as_ref()
            .and_then(|agent_id| store.agents.get(agent_id))
            .cloned();
        let mut images: Vec<PropertyImage> = store
            .images
            .iter()
            .filter(|image| image.property_id == id)
            .cloned()
            .collect();
        images.sort_by_key(|image| image.position);

        Ok(PropertyDetails {
            property,
            agent,
            images,
        })
    }

    async fn fetch_featured(&self, limit: usize) -> Result<Vec<Property>> {
        let store = self.store.read().await;
        Ok(store
            .active_newest_first()
            .into_iter()
            .filter(|p| p.is_featured)
            .take(limit)
            .collect())
    }

    async fn fetch_filtered(&self, filter: &PropertyFilter, page: Page) -> Result<Vec<Property>> {
        let store = self.store.read().await;
        let matched = apply_filters(&store.active_newest_first(), filter);
        debug!("In-memory filter matched {} properties", matched.len());
        Ok(paginate(matched, page))
    }

    async fn increment_views(&self, id: &str) -> Result<u64> {
        let mut store = self.store.write().await;
        let index = store.position(id)?;
        let property = &mut store.properties[index];
        property.views += 1;
        Ok(property.views)
    }

    async fn create(&self, new: NewProperty) -> Result<Property> {
        let mut store = self.store.write().await;
        let mut id = format!("prop_{}", store.next_id);
        while store.properties.iter().any(|p| p.id == id) {
            store.next_id += 1;
            id = format!("prop_{}", store.next_id);
        }
        store.next_id += 1;

        let now = Utc::now();
        let property = Property {
            id,
            title: new.title,
            description: new.description,
            price: new.price,
            currency: new.currency,
            property_type: new.property_type,
            listing_type: new.listing_type,
            status: PropertyStatus::Active,
            bedrooms: new.bedrooms,
            bathrooms: new.bathrooms,
            area: new.area,
            location: new.location,
            features: new.features,
            agent_id: new.agent_id,
            is_featured: new.is_featured,
            views: 0,
            created_at: now,
            updated_at: now,
        };
        store.properties.push(property.clone());
        info!("Created property {}", property.id);
        Ok(property)
    }

    async fn update(&self, id: &str, update: PropertyUpdate) -> Result<Property> {
        let mut store = self.store.write().await;
        let index = store.position(id)?;
        let property = &mut store.properties[index];

        if let Some(title) = update.title {
            property.title = title;
        }
        if let Some(description) = update.description {
            property.description = description;
        }
        if let Some(price) = update.price {
            property.price = price;
        }
        if let Some(status) = update.status {
            property.status = status;
        }
        if let Some(listing_type) = update.listing_type {
            property.listing_type = listing_type;
        }
        if let Some(bedrooms) = update.bedrooms {
            property.bedrooms = Some(bedrooms);
        }
        if let Some(bathrooms) = update.bathrooms {
            property.bathrooms = Some(bathrooms);
        }
        if let Some(area) = update.area {
            property.area = area;
        }
        if let Some(features) = update.features {
            property.features = features;
        }
        if let Some(is_featured) = update.is_featured {
            property.is_featured = is_featured;
        }
        property.updated_at = Utc::now();

        Ok(property.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        let index = store.position(id)?;
        store.properties.remove(index);
        store.images.retain(|image| image.property_id != id);
        Ok(())
    }

    fn source_name(&self) -> &'static str {
        "memory"
    }
}

fn listed(days_ago: i64) -> DateTime<Utc> {
    let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    base - Duration::days(days_ago)
}

#[allow(clippy::too_many_arguments)]
fn sample_listing(
    id: &str,
    title: &str,
    description: &str,
    price: f64,
    property_type: PropertyType,
    listing_type: ListingType,
    rooms: (Option<u32>, Option<f32>),
    area: f64,
    address: (&str, &str, &str, &str),
    features: &[&str],
    days_ago: i64,
) -> Property {
    Property {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        price,
        currency: "USD".to_string(),
        property_type,
        listing_type,
        status: PropertyStatus::Active,
        bedrooms: rooms.0,
        bathrooms: rooms.1,
        area,
        location: Location {
            address: address.0.to_string(),
            city: address.1.to_string(),
            state: address.2.to_string(),
            postal_code: address.3.to_string(),
            latitude: None,
            longitude: None,
        },
        features: features.iter().map(|f| f.to_string()).collect(),
        agent_id: Some("agent_1".to_string()),
        is_featured: false,
        views: 0,
        created_at: listed(days_ago),
        updated_at: listed(days_ago),
    }
}

/// Typical listings for local runs and demos
pub fn sample_properties() -> Vec<Property> {
    let mut properties = vec![
        sample_listing(
            "prop_sample_1",
            "Craftsman House with Garden",
            "Renovated family home on a quiet street. Hardwood floors throughout.",
            425_000.0,
            PropertyType::House,
            ListingType::Sale,
            (Some(3), Some(2.0)),
            165.0,
            ("214 Maple Street", "Portland", "OR", "97214"),
            &["Garden", "Garage", "Fireplace"],
            3,
        ),
        sample_listing(
            "prop_sample_2",
            "Downtown Loft",
            "Open plan loft with exposed brick, walking distance to transit.",
            2_400.0,
            PropertyType::Apartment,
            ListingType::Rent,
            (Some(1), Some(1.0)),
            68.0,
            ("88 Pearl Ave", "Portland", "OR", "97209"),
            &["Gym", "Elevator", "Rooftop Terrace"],
            1,
        ),
        sample_listing(
            "prop_sample_3",
            "Lakeview Condo",
            "Bright corner unit with balcony facing the lake.",
            389_000.0,
            PropertyType::Condo,
            ListingType::Sale,
            (Some(2), Some(1.5)),
            92.0,
            ("5 Shore Road", "Seattle", "WA", "98109"),
            &["Balcony", "Pool", "Security"],
            10,
        ),
        sample_listing(
            "prop_sample_4",
            "Hillside Villa",
            "Five bedroom villa with panoramic views and a heated pool.",
            1_850_000.0,
            PropertyType::Villa,
            ListingType::Sale,
            (Some(5), Some(4.5)),
            410.0,
            ("77 Sunset Blvd", "Los Angeles", "CA", "90046"),
            &["Pool", "Sea View", "Garden", "Security"],
            5,
        ),
        sample_listing(
            "prop_sample_5",
            "Corner Retail Space",
            "Ground floor commercial unit with large street frontage.",
            6_500.0,
            PropertyType::Commercial,
            ListingType::Rent,
            (None, Some(1.0)),
            140.0,
            ("300 Main Street", "Seattle", "WA", "98104"),
            &["Parking", "Storefront"],
            20,
        ),
        sample_listing(
            "prop_sample_6",
            "Buildable Lot",
            "Flat half-acre lot with utilities at the road.",
            120_000.0,
            PropertyType::Land,
            ListingType::Sale,
            (None, None),
            2_000.0,
            ("Lot 12 Cedar Rd", "Bend", "OR", "97701"),
            &[],
            30,
        ),
    ];
    properties[0].is_featured = true;
    properties[3].is_featured = true;
    properties[3].agent_id = Some("agent_2".to_string());
    properties
}

fn sample_agents() -> Vec<AgentProfile> {
    vec![
        AgentProfile {
            id: "agent_1".to_string(),
            full_name: "Dana Whitfield".to_string(),
            email: Some("dana@northwest-homes.example".to_string()),
            phone: Some("+1 503 555 0134".to_string()),
            agency: Some("Northwest Homes".to_string()),
            avatar_url: None,
        },
        AgentProfile {
            id: "agent_2".to_string(),
            full_name: "Ramon Castillo".to_string(),
            email: Some("ramon@coastline.example".to_string()),
            phone: None,
            agency: Some("Coastline Estates".to_string()),
            avatar_url: None,
        },
    ]
}

fn sample_images() -> Vec<PropertyImage> {
    vec![
        PropertyImage {
            id: "img_2".to_string(),
            property_id: "prop_sample_1".to_string(),
            url: "https://images.example.com/prop_sample_1/garden.jpg".to_string(),
            position: 2,
        },
        PropertyImage {
            id: "img_1".to_string(),
            property_id: "prop_sample_1".to_string(),
            url: "https://images.example.com/prop_sample_1/front.jpg".to_string(),
            position: 1,
        },
        PropertyImage {
            id: "img_3".to_string(),
            property_id: "prop_sample_4".to_string(),
            url: "https://images.example.com/prop_sample_4/pool.jpg".to_string(),
            position: 1,
        },
    ]
}
