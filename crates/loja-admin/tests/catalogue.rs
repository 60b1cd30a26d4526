use async_trait::async_trait;
use loja_admin::{
    brands, create_brand_once, delete_if_listed, order_detail_text, AdminApi, AdminError, Brand,
    OrderFilter, OrderStatus, Product, ProductForm,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// In-memory admin API
#[derive(Default)]
struct Catalogue {
    products: Mutex<BTreeMap<i64, Product>>,
    orders: Mutex<BTreeMap<i64, OrderStatus>>,
    brands: Mutex<Vec<Brand>>,
}

#[async_trait]
impl AdminApi for Catalogue {
    async fn list_products(&self) -> Result<Vec<Product>, AdminError> {
        Ok(self.products.lock().values().cloned().collect())
    }

    async fn create_product(&self, form: &ProductForm) -> Result<Product, AdminError> {
        form.validate()?;
        let mut products = self.products.lock();
        let id = products.keys().next_back().map_or(1, |last| last + 1);
        let product = Product {
            id,
            product_id: 1000 + id,
            name: form.name.clone(),
            price: form.price,
            image: form
                .image
                .as_ref()
                .map(|image| format!("/uploads/{}", image.file_name))
                .unwrap_or_default(),
            category: form.category.clone(),
            is_available: form.is_available,
            brand_ids: form.brand_ids.clone(),
            fits_product_ids: form.fits_product_ids.clone(),
        };
        products.insert(id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: i64, form: &ProductForm) -> Result<(), AdminError> {
        form.validate()?;
        let mut products = self.products.lock();
        let product = products.get_mut(&id).ok_or(AdminError::Status {
            status: 404,
            body: "Product not found".into(),
        })?;
        product.name = form.name.clone();
        product.price = form.price;
        product.category = form.category.clone();
        product.is_available = form.is_available;
        product.image = form.current_image.clone().unwrap_or_default();
        Ok(())
    }

    async fn delete_product(&self, id: i64) -> Result<(), AdminError> {
        self.products
            .lock()
            .remove(&id)
            .map(|_| ())
            .ok_or(AdminError::Status {
                status: 404,
                body: String::new(),
            })
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<String, AdminError> {
        Ok(self
            .orders
            .lock()
            .iter()
            .filter(|(_, status)| filter.status.map_or(true, |wanted| wanted == **status))
            .map(|(id, status)| format!("<tr data-order-id=\"{id}\"><td>{status}</td></tr>"))
            .collect())
    }

    async fn update_order_status(&self, id: i64, status: OrderStatus) -> Result<(), AdminError> {
        self.orders.lock().insert(id, status);
        Ok(())
    }

    async fn order_detail(&self, id: i64) -> Result<String, AdminError> {
        let orders = self.orders.lock();
        let status = orders.get(&id).ok_or(AdminError::Status {
            status: 500,
            body: "sql: no rows in result set".into(),
        })?;
        Ok(format!("<h2>Pedido #{id}</h2>\n<p>Status: {status}</p>"))
    }

    async fn list_brand_options(&self) -> Result<String, AdminError> {
        let mut brands = self.brands.lock().clone();
        brands.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(brands
            .iter()
            .map(|brand| format!("<option value=\"{}\">{}</option>", brand.id, brand.name))
            .collect())
    }

    async fn create_brand(&self, name: &str) -> Result<Brand, AdminError> {
        let mut brands = self.brands.lock();
        if brands.iter().any(|brand| brand.name == name) {
            return Err(AdminError::Status {
                status: 400,
                body: "marca ja cadastrada\n".into(),
            });
        }
        let brand = Brand {
            id: i64::try_from(brands.len()).unwrap() + 1,
            name: name.to_string(),
        };
        brands.push(brand.clone());
        Ok(brand)
    }
}

#[tokio::test]
async fn test_edit_round_keeps_image_and_relabels() {
    let api = Catalogue::default();
    let created = api
        .create_product(&ProductForm::new("Refil Alfa", Decimal::new(3990, 2), "refis"))
        .await
        .unwrap();

    let mut form = ProductForm::from_product(&created);
    form.category = "pecas".into();
    form.price = Decimal::new(4490, 2);
    api.update_product(created.id, &form).await.unwrap();

    let listed = api.list_products().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].category_label(), "Peças");
    assert_eq!(listed[0].price, Decimal::new(4490, 2));
}

#[tokio::test]
async fn test_compatibility_rejected_outside_parts() {
    let api = Catalogue::default();
    let mut form = ProductForm::new("Bebedouro", Decimal::new(49900, 2), "bebedouros");
    form.fits_product_ids = vec![1];

    let err = api.create_product(&form).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid form: Compatibility is only allowed for refis or pecas"
    );
    assert!(api.list_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_twice() {
    let api = Catalogue::default();
    let created = api
        .create_product(&ProductForm::new("Purificador", Decimal::ONE, "purificadores"))
        .await
        .unwrap();

    assert!(delete_if_listed(&api, created.id).await.unwrap());
    assert!(!delete_if_listed(&api, created.id).await.unwrap());
    assert!(api.delete_product(created.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_status_filter() {
    let api = Catalogue::default();
    api.update_order_status(1, OrderStatus::Pending).await.unwrap();
    api.update_order_status(2, OrderStatus::Shipped).await.unwrap();

    let shipped = api
        .list_orders(&OrderFilter::new().with_status(OrderStatus::Shipped))
        .await
        .unwrap();
    assert_eq!(shipped, "<tr data-order-id=\"2\"><td>shipped</td></tr>");
    assert_eq!(api.list_orders(&OrderFilter::new()).await.unwrap().matches("<tr").count(), 2);
}

#[tokio::test]
async fn test_brand_registration_feeds_product_form() {
    let api = Catalogue::default();
    let everpure = create_brand_once(&api, " Everpure ").await.unwrap().unwrap();
    create_brand_once(&api, "Acqua").await.unwrap();
    assert_eq!(create_brand_once(&api, "Everpure").await.unwrap(), None);

    let listed = brands(&api).await.unwrap();
    assert_eq!(
        listed.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(),
        vec!["Acqua", "Everpure"]
    );

    let mut form = ProductForm::new("Refil Everpure", Decimal::new(8990, 2), "refis");
    form.brand_ids = vec![everpure.id];
    let product = api.create_product(&form).await.unwrap();
    assert_eq!(product.brand_ids, vec![everpure.id]);
}

#[tokio::test]
async fn test_order_detail_text() {
    let api = Catalogue::default();
    api.update_order_status(4, OrderStatus::Processing).await.unwrap();

    assert_eq!(
        order_detail_text(&api, 4).await.unwrap(),
        "Pedido #4\nStatus: processing"
    );
    assert!(order_detail_text(&api, 5).await.is_err());
}
