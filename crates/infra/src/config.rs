//! Configuration loading.
//!
//! Field-length limits for inbound requests. Defaults match the sales API
//! contract; each can be overridden through the environment.

/// Maximum character counts accepted by request validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationLimits {
    pub sale_number: usize,
    /// Customer, branch and product names.
    pub name: usize,
    pub email: usize,
    pub document: usize,
    pub address: usize,
    pub city: usize,
    pub state: usize,
    pub sku: usize,
    pub category: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            sale_number: 50,
            name: 200,
            email: 200,
            document: 20,
            address: 500,
            city: 100,
            state: 2,
            sku: 50,
            category: 100,
        }
    }
}

impl ValidationLimits {
    /// Read overrides from `RETAIL_MAX_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build limits from an arbitrary key lookup; unset or malformed keys keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read = |key: &str, default: usize| -> usize {
            match lookup(key) {
                None => default,
                Some(raw) => match raw.trim().parse::<usize>() {
                    Ok(value) if value > 0 => value,
                    _ => {
                        tracing::warn!(key, value = %raw, default, "ignoring invalid limit");
                        default
                    }
                },
            }
        };

        Self {
            sale_number: read("RETAIL_MAX_SALE_NUMBER_LEN", defaults.sale_number),
            name: read("RETAIL_MAX_NAME_LEN", defaults.name),
            email: read("RETAIL_MAX_EMAIL_LEN", defaults.email),
            document: read("RETAIL_MAX_DOCUMENT_LEN", defaults.document),
            address: read("RETAIL_MAX_ADDRESS_LEN", defaults.address),
            city: read("RETAIL_MAX_CITY_LEN", defaults.city),
            state: read("RETAIL_MAX_STATE_LEN", defaults.state),
            sku: read("RETAIL_MAX_SKU_LEN", defaults.sku),
            category: read("RETAIL_MAX_CATEGORY_LEN", defaults.category),
        }
    }
}
