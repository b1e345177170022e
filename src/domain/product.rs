use serde::{Deserialize, Serialize};

pub type ProductId = i64;

/// Product type used when none is given.
pub const DEFAULT_PRODUCT_TYPE: &str = "data_feed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Free-form tag, e.g. "data_feed" or "subscription"
    pub product_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub product_type: String,
}

impl NewProduct {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            product_type: DEFAULT_PRODUCT_TYPE.to_string(),
        }
    }

    pub fn with_type(mut self, product_type: impl Into<String>) -> Self {
        self.product_type = product_type.into();
        self
    }
}
