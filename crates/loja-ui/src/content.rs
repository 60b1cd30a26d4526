//! Partial markup provider
//!
//! The server renders modal bodies; this side only asks for a view and
//! splices whatever comes back into the page.

use crate::config::{PartialPaths, UiConfig};
use crate::error::ContentError;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;

/// Partial views the page loads on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Cart modal
    CartModal,
    /// Installation upsell modal
    InstallationModal,
    /// Installation service details shown inside the upsell modal
    InstallationService,
}

impl View {
    /// Path of this view under `paths`
    #[must_use]
    pub fn path<'a>(&self, paths: &'a PartialPaths) -> &'a str {
        match self {
            Self::CartModal => &paths.cart_modal,
            Self::InstallationModal => &paths.installation_modal,
            Self::InstallationService => &paths.installation_service,
        }
    }
}

/// Server-rendered markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    /// Wrap raw markup
    #[inline]
    #[must_use]
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    /// Raw markup
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if markup is blank
    #[inline]
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Source of partial markup
#[async_trait]
pub trait PartialContentProvider: Send + Sync {
    /// Fetch the markup of `view`
    ///
    /// # Errors
    /// - `ContentError` if the markup cannot be produced
    async fn fetch(&self, view: View) -> Result<Markup, ContentError>;
}

#[async_trait]
impl<T: PartialContentProvider + ?Sized> PartialContentProvider for Arc<T> {
    async fn fetch(&self, view: View) -> Result<Markup, ContentError> {
        (**self).fetch(view).await
    }
}

/// Fetches partials over HTTP
#[derive(Debug, Clone)]
pub struct HttpContentProvider {
    client: reqwest::Client,
    base_url: String,
    paths: PartialPaths,
}

impl HttpContentProvider {
    /// Create provider from configuration
    #[must_use]
    pub fn new(config: &UiConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create provider sharing an existing client
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: &UiConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            paths: config.partials.clone(),
        }
    }

    /// Absolute URL of `view`
    #[must_use]
    pub fn url(&self, view: View) -> String {
        format!("{}{}", self.base_url, view.path(&self.paths))
    }
}

#[async_trait]
impl PartialContentProvider for HttpContentProvider {
    async fn fetch(&self, view: View) -> Result<Markup, ContentError> {
        let url = self.url(view);
        tracing::debug!(?view, %url, "fetching partial");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status {
                view,
                status: status.as_u16(),
            });
        }

        let markup = Markup::new(response.text().await?);
        if markup.is_blank() {
            return Err(ContentError::Empty(view));
        }
        Ok(markup)
    }
}

/// Memoizes successful fetches per view
///
/// Failures are not cached, so the next attempt goes back to the source.
#[derive(Debug, Clone)]
pub struct CachedContentProvider<P> {
    inner: P,
    cache: Cache<View, Markup>,
}

impl<P: PartialContentProvider> CachedContentProvider<P> {
    /// Wrap `inner`
    #[must_use]
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: Cache::new(16),
        }
    }

    /// Drop cached markup for `view`
    pub async fn invalidate(&self, view: View) {
        self.cache.invalidate(&view).await;
    }
}

#[async_trait]
impl<P: PartialContentProvider> PartialContentProvider for CachedContentProvider<P> {
    async fn fetch(&self, view: View) -> Result<Markup, ContentError> {
        if let Some(cached) = self.cache.get(&view).await {
            return Ok(cached);
        }

        let markup = self.inner.fetch(view).await?;
        self.cache.insert(view, markup.clone()).await;
        Ok(markup)
    }
}
