use serde::{Deserialize, Serialize};

use intake_core::{DomainError, DomainResult, Entity, ProductId};

/// Product type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Service,
    Consumable,
    Storable,
}

impl ProductType {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductType::Service => "service",
            ProductType::Consumable => "consumable",
            ProductType::Storable => "storable",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "service" => Some(ProductType::Service),
            "consumable" => Some(ProductType::Consumable),
            "storable" => Some(ProductType::Storable),
            _ => None,
        }
    }
}

/// Field set for a product that does not exist yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub product_type: ProductType,
    pub list_price: f64,
}

impl NewProduct {
    /// Minimal service product priced at the line's unit price.
    pub fn service(name: impl Into<String>, list_price: f64) -> Self {
        Self {
            name: name.into(),
            product_type: ProductType::Service,
            list_price,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if !self.list_price.is_finite() {
            return Err(DomainError::invalid_value("list price must be finite"));
        }
        Ok(())
    }
}

/// A persisted product record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub product_type: ProductType,
    pub list_price: f64,
}

impl Product {
    pub fn from_new(id: ProductId, new: NewProduct) -> Self {
        Self {
            id,
            name: new.name,
            product_type: new.product_type,
            list_price: new.list_price,
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::RecordId;

    #[test]
    fn service_product_uses_supplied_price() {
        let new = NewProduct::service("Consulting hour", 75.5);
        assert_eq!(new.product_type, ProductType::Service);
        assert_eq!(new.list_price, 75.5);
        assert!(new.validate().is_ok());

        let product = Product::from_new(ProductId::from_raw(3), new);
        assert_eq!(product.id().get(), 3);
        assert_eq!(product.name, "Consulting hour");
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = NewProduct::service("  ", 0.0).validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn product_type_round_trips_through_text() {
        for t in [ProductType::Service, ProductType::Consumable, ProductType::Storable] {
            assert_eq!(ProductType::parse(t.as_str()), Some(t));
        }
        assert_eq!(
            serde_json::to_value(ProductType::Service).unwrap(),
            serde_json::json!("service")
        );
        assert_eq!(ProductType::parse("gadget"), None);
    }
}
