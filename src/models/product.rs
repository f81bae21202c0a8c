use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppError, AppResult};

pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 255;
pub const DEFAULT_PAGE_SIZE: i64 = 5;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ── Request payloads ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i32,
}

impl CreateProduct {
    pub fn validate(&self) -> AppResult<()> {
        validate_name(&self.name)?;
        validate_description(self.description.as_deref())?;
        validate_price(self.price)?;
        validate_quantity(self.quantity)
    }
}

/// Fields left out keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    /// `None` when absent, `Some(None)` for an explicit `null` that clears it.
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub price: Option<f64>,
    pub quantity: Option<i32>,
}

/// Marks a field as present, so `null` becomes `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateProduct {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        validate_description(self.description.as_ref().and_then(|d| d.as_deref()))?;
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(quantity) = self.quantity {
            validate_quantity(quantity)?;
        }
        Ok(())
    }

    /// Description to store after applying this update over `existing`.
    pub fn merged_description<'a>(&'a self, existing: Option<&'a str>) -> Option<&'a str> {
        match &self.description {
            Some(description) => description.as_deref(),
            None => existing,
        }
    }
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(AppError::BadRequest(format!(
            "name must be at most {} characters",
            NAME_MAX_LEN
        )));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> AppResult<()> {
    match description {
        Some(d) if d.chars().count() > DESCRIPTION_MAX_LEN => Err(AppError::BadRequest(format!(
            "description must be at most {} characters",
            DESCRIPTION_MAX_LEN
        ))),
        _ => Ok(()),
    }
}

fn validate_price(price: f64) -> AppResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::BadRequest("price must be >= 0".to_string()));
    }
    Ok(())
}

fn validate_quantity(quantity: i32) -> AppResult<()> {
    if quantity < 0 {
        return Err(AppError::BadRequest("quantity must be >= 0".to_string()));
    }
    Ok(())
}

// ── Query parameters ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ProductPagination {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for ProductPagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ProductPagination {
    /// Returns `(offset, limit)` with the limit capped at [`MAX_PAGE_SIZE`].
    pub fn bounds(&self) -> AppResult<(i64, i64)> {
        if self.offset < 0 {
            return Err(AppError::BadRequest("offset must be >= 0".to_string()));
        }
        if self.limit < 0 {
            return Err(AppError::BadRequest("limit must be >= 0".to_string()));
        }
        Ok((self.offset, self.limit.min(MAX_PAGE_SIZE)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str) -> CreateProduct {
        CreateProduct {
            name: name.to_string(),
            description: None,
            price: 9.99,
            quantity: 3,
        }
    }

    #[test]
    fn valid_create_payload_passes() {
        assert!(create("Keyboard").validate().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(matches!(create("   ").validate(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn name_length_is_bounded() {
        assert!(create(&"a".repeat(NAME_MAX_LEN)).validate().is_ok());
        assert!(create(&"a".repeat(NAME_MAX_LEN + 1)).validate().is_err());
    }

    #[test]
    fn description_length_is_bounded() {
        let mut payload = create("Mouse");
        payload.description = Some("d".repeat(DESCRIPTION_MAX_LEN + 1));
        assert!(payload.validate().is_err());
    }

    #[test]
    fn negative_price_and_quantity_are_rejected() {
        let mut payload = create("Mouse");
        payload.price = -0.01;
        assert!(payload.validate().is_err());

        let mut payload = create("Mouse");
        payload.quantity = -1;
        assert!(payload.validate().is_err());

        let mut payload = create("Mouse");
        payload.price = f64::NAN;
        assert!(payload.validate().is_err());
    }

    #[test]
    fn empty_update_is_valid() {
        assert!(UpdateProduct::default().validate().is_ok());
    }

    #[test]
    fn update_checks_only_supplied_fields() {
        let update = UpdateProduct {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = UpdateProduct {
            quantity: Some(0),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
    }

    #[test]
    fn update_payload_deserializes_partial_json() {
        let update: UpdateProduct = serde_json::from_str(r#"{"price": 12.5}"#).unwrap();
        assert_eq!(update.price, Some(12.5));
        assert!(update.name.is_none());
    }

    #[test]
    fn explicit_null_description_clears_it() {
        let update: UpdateProduct = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(update.description, Some(None));
        assert_eq!(update.merged_description(Some("old")), None);
    }

    #[test]
    fn absent_description_keeps_stored_value() {
        let update: UpdateProduct = serde_json::from_str("{}").unwrap();
        assert_eq!(update.description, None);
        assert_eq!(update.merged_description(Some("old")), Some("old"));
    }

    #[test]
    fn supplied_description_overwrites() {
        let update: UpdateProduct =
            serde_json::from_str(r#"{"description": "new"}"#).unwrap();
        assert_eq!(update.merged_description(Some("old")), Some("new"));
        assert_eq!(update.merged_description(None), Some("new"));
    }

    #[test]
    fn oversized_description_in_update_is_rejected() {
        let update = UpdateProduct {
            description: Some(Some("d".repeat(DESCRIPTION_MAX_LEN + 1))),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn pagination_defaults() {
        let page: ProductPagination = serde_json::from_str("{}").unwrap();
        assert_eq!(page.bounds().unwrap(), (0, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn pagination_caps_limit_and_rejects_negatives() {
        let page = ProductPagination {
            offset: 10,
            limit: 10_000,
        };
        assert_eq!(page.bounds().unwrap(), (10, MAX_PAGE_SIZE));

        let page = ProductPagination {
            offset: -1,
            limit: 5,
        };
        assert!(page.bounds().is_err());

        let page = ProductPagination {
            offset: 0,
            limit: -5,
        };
        assert!(page.bounds().is_err());
    }
}
