//! HTTP client for the admin API
//!
//! Product writes go out as multipart forms, the way the admin page's
//! forms post them. Order lists, order details and brand options come back
//! as server-rendered markup.

use crate::brand::{brand_name, parse_brand_options, Brand, DUPLICATE_BRAND};
use crate::config::AdminConfig;
use crate::error::AdminError;
use crate::markup::to_text;
use crate::order::{OrderFilter, OrderStatus, StatusUpdate};
use crate::product::{Product, ProductForm};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

const PRODUCTS_PATH: &str = "/api/admin/products";
const ORDERS_PATH: &str = "/api/admin/orders";
const BRANDS_PATH: &str = "/api/admin/brands";
const BRAND_OPTIONS_PATH: &str = "/api/admin/brands/options";

/// Admin console operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// Every product in the catalogue
    async fn list_products(&self) -> Result<Vec<Product>, AdminError>;

    /// Create a product
    async fn create_product(&self, form: &ProductForm) -> Result<Product, AdminError>;

    /// Replace product `id`
    async fn update_product(&self, id: i64, form: &ProductForm) -> Result<(), AdminError>;

    /// Delete product `id`
    async fn delete_product(&self, id: i64) -> Result<(), AdminError>;

    /// Order list markup for `filter`
    async fn list_orders(&self, filter: &OrderFilter) -> Result<String, AdminError>;

    /// Move order `id` to `status`
    async fn update_order_status(&self, id: i64, status: OrderStatus) -> Result<(), AdminError>;

    /// Detail markup of order `id`, items included
    async fn order_detail(&self, id: i64) -> Result<String, AdminError>;

    /// Brand `<option>` markup for the product form
    async fn list_brand_options(&self) -> Result<String, AdminError>;

    /// Register brand `name`
    async fn create_brand(&self, name: &str) -> Result<Brand, AdminError>;
}

/// Admin API over HTTP
#[derive(Debug, Clone)]
pub struct AdminClient {
    client: reqwest::Client,
    config: AdminConfig,
}

impl AdminClient {
    /// Create client for `config`
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create client sharing an existing client (and its session cookies)
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: AdminConfig) -> Self {
        Self { client, config }
    }

    /// URL of product `id`
    #[must_use]
    pub fn product_url(&self, id: i64) -> String {
        self.config.url(&format!("{PRODUCTS_PATH}/{id}"))
    }

    /// URL of order `id`
    #[must_use]
    pub fn order_url(&self, id: i64) -> String {
        self.config.url(&format!("{ORDERS_PATH}/{id}"))
    }

    /// URL of the status endpoint of order `id`
    #[must_use]
    pub fn order_status_url(&self, id: i64) -> String {
        self.config.url(&format!("{ORDERS_PATH}/{id}/status"))
    }

    fn multipart(form: &ProductForm) -> Result<Form, AdminError> {
        let mut body = form
            .text_fields()
            .into_iter()
            .fold(Form::new(), |body, (name, value)| body.text(name, value));

        if let Some(image) = &form.image {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)
                .map_err(|e| AdminError::Image(format!("invalid content type: {e}")))?;
            body = body.part("image", part);
        }
        Ok(body)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, AdminError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = status.as_u16(), %body, "admin request failed");
        Err(AdminError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl AdminApi for AdminClient {
    async fn list_products(&self) -> Result<Vec<Product>, AdminError> {
        let response = self
            .client
            .get(self.config.url(PRODUCTS_PATH))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn create_product(&self, form: &ProductForm) -> Result<Product, AdminError> {
        form.validate()?;
        let response = self
            .client
            .post(self.config.url(PRODUCTS_PATH))
            .multipart(Self::multipart(form)?)
            .send()
            .await?;
        let product: Product = Self::check(response).await?.json().await?;
        tracing::info!(id = product.id, name = %product.name, "product created");
        Ok(product)
    }

    async fn update_product(&self, id: i64, form: &ProductForm) -> Result<(), AdminError> {
        form.validate()?;
        let response = self
            .client
            .put(self.product_url(id))
            .multipart(Self::multipart(form)?)
            .send()
            .await?;
        Self::check(response).await?;
        tracing::info!(id, "product updated");
        Ok(())
    }

    async fn delete_product(&self, id: i64) -> Result<(), AdminError> {
        let response = self.client.delete(self.product_url(id)).send().await?;
        Self::check(response).await?;
        tracing::info!(id, "product deleted");
        Ok(())
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<String, AdminError> {
        let response = self
            .client
            .get(self.config.url(ORDERS_PATH))
            .query(&filter.query_pairs())
            .send()
            .await?;
        Ok(Self::check(response).await?.text().await?)
    }

    async fn update_order_status(&self, id: i64, status: OrderStatus) -> Result<(), AdminError> {
        let response = self
            .client
            .put(self.order_status_url(id))
            .json(&StatusUpdate { status })
            .send()
            .await?;
        Self::check(response).await?;
        tracing::info!(id, %status, "order status updated");
        Ok(())
    }

    async fn order_detail(&self, id: i64) -> Result<String, AdminError> {
        let response = self.client.get(self.order_url(id)).send().await?;
        Ok(Self::check(response).await?.text().await?)
    }

    async fn list_brand_options(&self) -> Result<String, AdminError> {
        let response = self
            .client
            .get(self.config.url(BRAND_OPTIONS_PATH))
            .send()
            .await?;
        Ok(Self::check(response).await?.text().await?)
    }

    async fn create_brand(&self, name: &str) -> Result<Brand, AdminError> {
        let name = brand_name(name)?;
        let response = self
            .client
            .post(self.config.url(BRANDS_PATH))
            .form(&[("name", name)])
            .send()
            .await?;
        let brand: Brand = Self::check(response).await?.json().await?;
        tracing::info!(id = brand.id, name = %brand.name, "brand created");
        Ok(brand)
    }
}

/// Brands the product form can pick from
///
/// # Errors
/// - `AdminError` from the options request
pub async fn brands(api: &dyn AdminApi) -> Result<Vec<Brand>, AdminError> {
    Ok(parse_brand_options(&api.list_brand_options().await?))
}

/// Create brand `name`; `Ok(None)` if the server already has it
///
/// # Errors
/// - `AdminError::Invalid` for a blank name
/// - `AdminError` from the request, except the duplicate-name refusal
pub async fn create_brand_once(
    api: &dyn AdminApi,
    name: &str,
) -> Result<Option<Brand>, AdminError> {
    let name = brand_name(name)?;
    match api.create_brand(name).await {
        Ok(brand) => Ok(Some(brand)),
        Err(AdminError::Status { status: 400, body }) if body.contains(DUPLICATE_BRAND) => {
            tracing::debug!(name, "brand already registered");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Order `id` as plain text lines
///
/// # Errors
/// - `AdminError` from the detail request
pub async fn order_detail_text(api: &dyn AdminApi, id: i64) -> Result<String, AdminError> {
    Ok(to_text(&api.order_detail(id).await?))
}

/// Delete `id` only if it is still listed; `Ok(false)` if it was already gone
///
/// # Errors
/// - `AdminError` from either request, except a not-found delete
pub async fn delete_if_listed(api: &dyn AdminApi, id: i64) -> Result<bool, AdminError> {
    let listed = api.list_products().await?.iter().any(|p| p.id == id);
    if !listed {
        tracing::debug!(id, "product already removed");
        return Ok(false);
    }
    match api.delete_product(id).await {
        Ok(()) => Ok(true),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e),
    }
}
