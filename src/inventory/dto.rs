use serde::{Deserialize, Serialize};

use crate::flash::Flash;
use crate::inventory::repo::Product;

/// Form body shared by Add and Edit. Quantity and price arrive as raw
/// strings so malformed input can fall back to zero instead of failing
/// extraction.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub price: String,
}

impl ProductForm {
    /// Lenient coercion: absent, malformed or negative input becomes 0.
    pub fn quantity(&self) -> i64 {
        self.quantity.trim().parse::<i64>().unwrap_or(0).max(0)
    }

    /// Same coercion contract as [`ProductForm::quantity`].
    pub fn price(&self) -> f64 {
        self.price.trim().parse::<f64>().unwrap_or(0.0).max(0.0)
    }
}

/// Query string for the list view.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: String,
}

/// Payload backing the inventory list view.
#[derive(Debug, Serialize)]
pub struct InventoryPage {
    pub items: Vec<Product>,
    pub q: String,
    pub flash: Option<Flash>,
}

/// Payload backing the add and edit form views; `item` is the product
/// being edited, or `None` for a blank form.
#[derive(Debug, Serialize)]
pub struct ProductFormPage {
    pub item: Option<Product>,
    pub flash: Option<Flash>,
}

/// Dashboard metrics.
#[derive(Debug, Serialize)]
pub struct DashboardPage {
    pub count: i64,
    pub total_value: f64,
    pub flash: Option<Flash>,
}

/// Low-stock report alongside the dashboard total.
#[derive(Debug, Serialize)]
pub struct ReportPage {
    pub total_value: f64,
    pub low_stock: Vec<Product>,
    pub flash: Option<Flash>,
}
