//! Product catalogue records and the admin product form

use crate::error::AdminError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const CATEGORY_LABELS: &[(&str, &str)] = &[
    ("bebedouros", "Bebedouros"),
    ("purificadores", "Purificadores"),
    ("refis", "Refis"),
    ("pecas", "Peças"),
];

/// Display name of a category slug; unknown slugs are shown as is
#[must_use]
pub fn category_label(slug: &str) -> &str {
    CATEGORY_LABELS
        .iter()
        .find(|(known, _)| *known == slug)
        .map_or(slug, |(_, label)| *label)
}

/// Whether products in `slug` may list compatible products
#[inline]
#[must_use]
pub fn is_parts_category(slug: &str) -> bool {
    matches!(slug, "refis" | "pecas")
}

/// A catalogue product as the admin API returns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Row id
    pub id: i64,
    /// Public product number
    #[serde(default)]
    pub product_id: i64,
    /// Product name
    pub name: String,
    /// Unit price
    pub price: Decimal,
    /// Image URL
    #[serde(default)]
    pub image: String,
    /// Category slug
    pub category: String,
    /// Shown in the storefront
    #[serde(default)]
    pub is_available: bool,
    /// Brand ids
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub brand_ids: Vec<i64>,
    /// Products this part fits
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fits_product_ids: Vec<i64>,
}

impl Product {
    /// Display name of the category
    #[inline]
    #[must_use]
    pub fn category_label(&self) -> &str {
        category_label(&self.category)
    }
}

/// Image attached to a product form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// File name sent with the part
    pub file_name: String,
    /// MIME type
    pub content_type: String,
    /// File contents
    pub bytes: Vec<u8>,
}

/// Fields of the add/edit product form
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductForm {
    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub is_available: bool,
    pub brand_ids: Vec<i64>,
    pub fits_product_ids: Vec<i64>,
    /// New image; on edit, `None` keeps `current_image`
    pub image: Option<ImageUpload>,
    /// Image URL kept when no new image is attached
    pub current_image: Option<String>,
}

impl ProductForm {
    /// Form for a new product
    #[must_use]
    pub fn new(name: impl Into<String>, price: Decimal, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price,
            category: category.into(),
            is_available: true,
            ..Self::default()
        }
    }

    /// Edit form prefilled from `product`
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price,
            category: product.category.clone(),
            is_available: product.is_available,
            brand_ids: product.brand_ids.clone(),
            fits_product_ids: product.fits_product_ids.clone(),
            image: None,
            current_image: Some(product.image.clone()).filter(|image| !image.is_empty()),
        }
    }

    /// With attached image
    #[inline]
    #[must_use]
    pub fn with_image(mut self, image: ImageUpload) -> Self {
        self.image = Some(image);
        self
    }

    /// Check the rules the server enforces
    ///
    /// # Errors
    /// - `AdminError::Invalid` naming the first rule broken
    pub fn validate(&self) -> Result<(), AdminError> {
        if self.name.trim().is_empty() || self.category.trim().is_empty() {
            return Err(AdminError::Invalid("Missing required fields".to_string()));
        }
        if self.price.is_sign_negative() {
            return Err(AdminError::Invalid("Invalid price format".to_string()));
        }
        if !self.fits_product_ids.is_empty() && !is_parts_category(&self.category) {
            return Err(AdminError::Invalid(
                "Compatibility is only allowed for refis or pecas".to_string(),
            ));
        }
        Ok(())
    }

    /// Text parts of the multipart body, in form order
    ///
    /// `is_available` is sent only when checked, as a browser checkbox is.
    #[must_use]
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("name", self.name.trim().to_string()),
            ("price", self.price.normalize().to_string()),
            ("category", self.category.clone()),
        ];
        if self.is_available {
            fields.push(("is_available", "on".to_string()));
        }
        fields.extend(self.brand_ids.iter().map(|id| ("brand_ids", id.to_string())));
        fields.extend(
            self.fits_product_ids
                .iter()
                .map(|id| ("fits_product_ids", id.to_string())),
        );
        if let Some(current) = &self.current_image {
            fields.push(("current_image", current.clone()));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn labels_known_and_unknown_categories() {
        assert_eq!(category_label("pecas"), "Peças");
        assert_eq!(category_label("bebedouros"), "Bebedouros");
        assert_eq!(category_label("acessorios"), "acessorios");
    }

    #[test]
    fn product_reads_api_json() {
        let product: Product = serde_json::from_str(
            r#"{"id":7,"productId":1007,"name":"Refil X","price":39.9,
                "image":"/uploads/x.png","category":"refis","isAvailable":true,
                "fitsProductIds":[3]}"#,
        )
        .unwrap();
        assert_eq!(product.price, Decimal::new(399, 1));
        assert_eq!(product.fits_product_ids, vec![3]);
        assert!(product.brand_ids.is_empty());
        assert_eq!(product.category_label(), "Refis");
    }

    #[test]
    fn form_fields_follow_checkbox_semantics() {
        let mut form = ProductForm::new("Bebedouro Y", Decimal::new(89900, 2), "bebedouros");
        form.brand_ids = vec![1, 2];
        assert_eq!(
            form.text_fields(),
            vec![
                ("name", "Bebedouro Y".to_string()),
                ("price", "899".to_string()),
                ("category", "bebedouros".to_string()),
                ("is_available", "on".to_string()),
                ("brand_ids", "1".to_string()),
                ("brand_ids", "2".to_string()),
            ]
        );

        form.is_available = false;
        assert!(!form.text_fields().iter().any(|(k, _)| *k == "is_available"));
    }

    #[test]
    fn edit_form_keeps_current_image() {
        let product = Product {
            id: 1,
            product_id: 1001,
            name: "Purificador Z".into(),
            price: Decimal::new(59990, 2),
            image: "/uploads/z.png".into(),
            category: "purificadores".into(),
            is_available: false,
            brand_ids: vec![],
            fits_product_ids: vec![],
        };
        let form = ProductForm::from_product(&product);
        assert_eq!(form.current_image.as_deref(), Some("/uploads/z.png"));
        assert!(form
            .text_fields()
            .contains(&("current_image", "/uploads/z.png".to_string())));
    }

    #[test]
    fn validation_mirrors_server_rules() {
        assert!(ProductForm::new("", Decimal::ONE, "refis").validate().is_err());
        assert!(ProductForm::new("A", Decimal::NEGATIVE_ONE, "refis")
            .validate()
            .is_err());

        let mut form = ProductForm::new("Bebedouro", Decimal::ONE, "bebedouros");
        form.fits_product_ids = vec![4];
        assert!(matches!(form.validate(), Err(AdminError::Invalid(_))));

        form.category = "pecas".into();
        assert!(form.validate().is_ok());
    }
}
