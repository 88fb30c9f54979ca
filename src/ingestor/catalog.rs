//! Catalog fetcher

use tracing::{debug, info};

use crate::errors::SourceResult;
use crate::models::{Catalog, CatalogSection, Credentials};
use crate::sources::ProviderSession;

/// Log in, then list every category and its channels in provider order
///
/// A rejected login aborts before anything is listed, so a failed cycle never
/// works from a partial catalog.
pub async fn fetch_catalog<S>(credentials: &Credentials, session: &S) -> SourceResult<Catalog>
where
    S: ProviderSession + ?Sized,
{
    session.login(credentials).await?;
    debug!("Logged in as {}", credentials.username);

    let categories = session.categories().await?;
    debug!("Received {} categories", categories.len());

    let mut catalog = Vec::with_capacity(categories.len());
    for category in categories {
        let channels = session.channels(&category).await?;
        debug!(
            "Category '{}' lists {} channels",
            category.name,
            channels.len()
        );
        catalog.push(CatalogSection::new(category, channels));
    }

    let channel_count: usize = catalog.iter().map(|section| section.channels.len()).sum();
    info!(
        "Fetched catalog: {} categories, {} channels",
        catalog.len(),
        channel_count
    );
    Ok(catalog)
}
