//! Loja Admin - admin console client
//!
//! Product catalogue CRUD, brands, and order review against the storefront
//! server. Independent of the cart.

#![warn(unreachable_pub)]

pub mod brand;
pub mod client;
pub mod config;
pub mod error;
pub mod markup;
pub mod order;
pub mod product;

pub use brand::{parse_brand_options, Brand};
pub use client::{
    brands, create_brand_once, delete_if_listed, order_detail_text, AdminApi, AdminClient,
};
pub use config::AdminConfig;
pub use error::AdminError;
pub use markup::to_text;
pub use order::{OrderFilter, OrderStatus};
pub use product::{category_label, is_parts_category, ImageUpload, Product, ProductForm};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
