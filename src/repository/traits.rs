use crate::error::Result;
use crate::filter::PropertyFilter;
use crate::models::{Property, PropertyDetails};
use crate::repository::types::{NewProperty, Page, PropertyUpdate};
use async_trait::async_trait;

/// Common trait for every listing store.
///
/// Search and filtering run on what these methods return; the store itself
/// only deals with fetching, hydrating and writing rows.
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    /// Active listings, newest first
    async fn fetch_active(&self, page: Page) -> Result<Vec<Property>>;

    /// One listing with its agent and images joined in
    async fn fetch_by_id(&self, id: &str) -> Result<PropertyDetails>;

    /// Active listings flagged as featured, newest first
    async fn fetch_featured(&self, limit: usize) -> Result<Vec<Property>>;

    /// Active listings narrowed by `filter` on the store side
    async fn fetch_filtered(&self, filter: &PropertyFilter, page: Page) -> Result<Vec<Property>>;

    /// Bump the view counter and return the new value
    async fn increment_views(&self, id: &str) -> Result<u64>;

    async fn create(&self, property: NewProperty) -> Result<Property>;

    async fn update(&self, id: &str, update: PropertyUpdate) -> Result<Property>;

    async fn delete(&self, id: &str) -> Result<()>;

    /// Name of the backing store, for logs
    fn source_name(&self) -> &'static str;
}
