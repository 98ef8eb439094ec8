pub mod memory;
pub mod rest;
pub mod traits;
pub mod types;

pub use memory::{sample_properties, InMemoryPropertyRepository};
pub use rest::RestPropertyRepository;
pub use traits::PropertyRepository;
pub use types::{NewProperty, Page, PropertyUpdate};

use crate::error::Result;
use crate::filter::PropertyFilter;
use crate::models::Property;
use std::future::Future;
use tracing::debug;

/// Keep requesting pages until one comes back short.
async fn collect_pages<F, Fut>(page_size: usize, mut fetch: F) -> Result<Vec<Property>>
where
    F: FnMut(Page) -> Fut,
    Fut: Future<Output = Result<Vec<Property>>>,
{
    let mut page = Page::new(0, page_size.max(1));
    let mut all = Vec::new();

    loop {
        let batch = fetch(page).await?;
        let done = batch.len() < page.limit;
        debug!("Fetched page at offset {} ({} rows)", page.offset, batch.len());
        all.extend(batch);
        if done {
            break;
        }
        page = page.next();
    }

    Ok(all)
}

/// Walk every page of active listings into one candidate list.
pub async fn fetch_all_active(
    repository: &dyn PropertyRepository,
    page_size: usize,
) -> Result<Vec<Property>> {
    collect_pages(page_size, move |page| repository.fetch_active(page)).await
}

/// Walk every page of a store-side filtered query.
pub async fn fetch_all_filtered(
    repository: &dyn PropertyRepository,
    filter: &PropertyFilter,
    page_size: usize,
) -> Result<Vec<Property>> {
    collect_pages(page_size, move |page| repository.fetch_filtered(filter, page)).await
}
