use crate::config::AppConfig;
use crate::error::{RepositoryError, Result};
use crate::filter::{bound, PropertyFilter};
use crate::models::{Property, PropertyDetails};
use crate::repository::traits::PropertyRepository;
use crate::repository::types::{NewProperty, Page, PropertyUpdate};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

const PROPERTIES_TABLE: &str = "properties";
const DETAILS_SELECT: &str = "*,agent:profiles(*),images:property_images(*)";
const INCREMENT_VIEWS_RPC: &str = "increment_property_views";

type Query = Vec<(String, String)>;

/// Listing store backed by a hosted PostgREST endpoint
pub struct RestPropertyRepository {
    client: Client,
    base_url: String,
}

impl RestPropertyRepository {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let key = HeaderValue::from_str(api_key)
            .map_err(|_| RepositoryError::Config("API key is not a valid header value".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| RepositoryError::Config("API key is not a valid header value".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let url = config
            .backend_url
            .as_deref()
            .ok_or_else(|| RepositoryError::Config("ESTATE_BACKEND_URL is not set".to_string()))?;
        let key = config
            .api_key
            .as_deref()
            .ok_or_else(|| RepositoryError::Config("ESTATE_API_KEY is not set".to_string()))?;
        Self::new(url, key, config.http_timeout)
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, PROPERTIES_TABLE)
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, function)
    }

    async fn get_rows<T: DeserializeOwned>(&self, query: &Query) -> Result<Vec<T>> {
        let request = self.client.get(self.table_url()).query(query);
        send_json(request).await
    }
}

/// Send and decode, turning non-2xx answers into [`RepositoryError::Http`].
async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request.send().await?;
    let body = read_body(response).await?;
    Ok(serde_json::from_str(&body)?)
}

async fn read_body(response: Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        warn!("Backend returned status: {}", status);
        return Err(RepositoryError::Http {
            status: status.as_u16(),
            body,
        });
    }
    debug!("Received {} bytes from backend", body.len());
    Ok(body)
}

fn first_or_not_found<T>(rows: Vec<T>, id: &str) -> Result<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
}

fn page_params(query: &mut Query, page: Page) {
    query.push(("offset".to_string(), page.offset.to_string()));
    query.push(("limit".to_string(), page.limit.to_string()));
}

fn active_listing_query() -> Query {
    vec![
        ("select".to_string(), "*".to_string()),
        ("status".to_string(), "eq.active".to_string()),
        ("order".to_string(), "created_at.desc".to_string()),
    ]
}

fn id_param(id: &str) -> (String, String) {
    ("id".to_string(), format!("eq.{}", id))
}

fn in_list<T: ToString>(values: &[T]) -> String {
    let joined: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("in.({})", joined.join(","))
}

/// Quote array members so spaces and commas survive `{a,b}` literals.
fn array_literal(values: &[String]) -> String {
    let quoted: Vec<String> = values
        .iter()
        .map(|v| format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("{{{}}}", quoted.join(","))
}

/// Translate a [`PropertyFilter`] into PostgREST query parameters.
///
/// Mirrors [`PropertyFilter::matches`]: unset, empty or non-finite fields
/// add nothing.
pub fn filter_query(filter: &PropertyFilter) -> Query {
    let mut query = Vec::new();
    let mut push = |column: &str, value: String| query.push((column.to_string(), value));

    if let Some(listing_type) = filter.listing_type {
        push("listing_type", format!("eq.{}", listing_type));
    }
    if let Some(types) = filter.property_types() {
        push("property_type", in_list(types));
    }
    if let Some(min) = bound(filter.min_price) {
        push("price", format!("gte.{}", min));
    }
    if let Some(max) = bound(filter.max_price) {
        push("price", format!("lte.{}", max));
    }
    if let Some(counts) = filter.bedroom_counts() {
        push("bedrooms", in_list(counts));
    }
    if let Some(counts) = filter.bathroom_counts() {
        push("bathrooms", in_list(counts));
    }
    if let Some(min) = bound(filter.min_area) {
        push("area", format!("gte.{}", min));
    }
    if let Some(max) = bound(filter.max_area) {
        push("area", format!("lte.{}", max));
    }
    if let Some(city) = filter.city_needle() {
        push("city", format!("ilike.*{}*", city.replace('*', "")));
    }
    if let Some(features) = filter.wanted_features() {
        push("features", format!("ov.{}", array_literal(features)));
    }

    query
}

#[async_trait]
impl PropertyRepository for RestPropertyRepository {
    #[tracing::instrument(skip(self))]
    async fn fetch_active(&self, page: Page) -> Result<Vec<Property>> {
        let mut query = active_listing_query();
        page_params(&mut query, page);
        let properties: Vec<Property> = self.get_rows(&query).await?;
        info!("Fetched {} active properties", properties.len());
        Ok(properties)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_by_id(&self, id: &str) -> Result<PropertyDetails> {
        let query = vec![("select".to_string(), DETAILS_SELECT.to_string()), id_param(id)];
        let rows: Vec<PropertyDetails> = self.get_rows(&query).await?;
        first_or_not_found(rows, id)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_featured(&self, limit: usize) -> Result<Vec<Property>> {
        let mut query = active_listing_query();
        query.push(("is_featured".to_string(), "eq.true".to_string()));
        query.push(("limit".to_string(), limit.to_string()));
        self.get_rows(&query).await
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_filtered(&self, filter: &PropertyFilter, page: Page) -> Result<Vec<Property>> {
        let mut query = active_listing_query();
        query.extend(filter_query(filter));
        page_params(&mut query, page);
        let properties: Vec<Property> = self.get_rows(&query).await?;
        info!("Filter matched {} properties on the backend", properties.len());
        Ok(properties)
    }

    #[tracing::instrument(skip(self))]
    async fn increment_views(&self, id: &str) -> Result<u64> {
        let request = self
            .client
            .post(self.rpc_url(INCREMENT_VIEWS_RPC))
            .json(&json!({ "property_id": id }));
        let views: Option<u64> = send_json(request).await?;
        views.ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    #[tracing::instrument(skip(self, property), fields(title = %property.title))]
    async fn create(&self, property: NewProperty) -> Result<Property> {
        let request = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=representation")
            .json(&property);
        let rows: Vec<Property> = send_json(request).await?;
        let created = rows.into_iter().next().ok_or_else(|| RepositoryError::Http {
            status: 200,
            body: "insert returned no rows".to_string(),
        })?;
        info!("Created property {}", created.id);
        Ok(created)
    }

    #[tracing::instrument(skip(self, update))]
    async fn update(&self, id: &str, update: PropertyUpdate) -> Result<Property> {
        let request = self
            .client
            .patch(self.table_url())
            .query(&[id_param(id)])
            .header("Prefer", "return=representation")
            .json(&update);
        let rows: Vec<Property> = send_json(request).await?;
        first_or_not_found(rows, id)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<()> {
        let request = self
            .client
            .delete(self.table_url())
            .query(&[id_param(id)])
            .header("Prefer", "return=representation");
        let rows: Vec<serde_json::Value> = send_json(request).await?;
        first_or_not_found(rows, id).map(|_| ())
    }

    fn source_name(&self) -> &'static str {
        "rest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListingType, PropertyType};

    fn pairs(query: &Query) -> Vec<(&str, &str)> {
        query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    #[test]
    fn test_empty_filter_adds_nothing() {
        assert!(filter_query(&PropertyFilter::default()).is_empty());
    }

    #[test]
    fn test_filter_query_translation() {
        let filter = PropertyFilter {
            property_type: Some(vec![PropertyType::House, PropertyType::Villa]),
            listing_type: Some(ListingType::Sale),
            min_price: Some(100_000.0),
            max_price: Some(250_000.5),
            bedrooms: Some(vec![2, 3]),
            bathrooms: Some(vec![1.5]),
            min_area: Some(80.0),
            max_area: None,
            city: Some(" Port ".to_string()),
            features: Some(vec!["Pool".to_string(), "Sea view".to_string()]),
        };

        assert_eq!(
            pairs(&filter_query(&filter)),
            vec![
                ("listing_type", "eq.sale"),
                ("property_type", "in.(house,villa)"),
                ("price", "gte.100000"),
                ("price", "lte.250000.5"),
                ("bedrooms", "in.(2,3)"),
                ("bathrooms", "in.(1.5)"),
                ("area", "gte.80"),
                ("city", "ilike.*port*"),
                ("features", "ov.{\"Pool\",\"Sea view\"}"),
            ]
        );
    }

    #[test]
    fn test_filter_query_skips_unusable_values() {
        let filter = PropertyFilter {
            min_price: Some(f64::NAN),
            bedrooms: Some(vec![]),
            city: Some(String::new()),
            ..Default::default()
        };
        assert!(filter_query(&filter).is_empty());
    }

    #[test]
    fn test_urls() {
        let repo = RestPropertyRepository::new(
            "https://db.example.com/",
            "anon-key",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(repo.table_url(), "https://db.example.com/rest/v1/properties");
        assert_eq!(
            repo.rpc_url(INCREMENT_VIEWS_RPC),
            "https://db.example.com/rest/v1/rpc/increment_property_views"
        );
        assert_eq!(repo.source_name(), "rest");
    }

    #[test]
    fn test_from_config_requires_backend() {
        let err = match RestPropertyRepository::from_config(&AppConfig::default()) {
            Err(err) => err,
            Ok(_) => panic!("expected a configuration error"),
        };
        assert!(matches!(err, RepositoryError::Config(_)));
    }

    #[test]
    fn test_invalid_api_key_rejected() {
        let result = RestPropertyRepository::new("https://db.example.com", "bad\nkey", Duration::from_secs(5));
        assert!(matches!(result, Err(RepositoryError::Config(_))));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let repo = RestPropertyRepository::new(
            "http://127.0.0.1:9",
            "anon-key",
            Duration::from_secs(2),
        )
        .unwrap();
        let err = repo.fetch_active(Page::default()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Transport(_)));
    }
}
