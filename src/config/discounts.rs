use log::{ debug, info };
use serde::{ Deserialize, Serialize };
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

const DEFAULT_RATE: f64 = 0.15;
const DEFAULT_MAX_RATE: f64 = 0.5;

fn default_max_rate() -> f64 {
    DEFAULT_MAX_RATE
}

/// Discount rates by listing category, nudged by how flexible the selling
/// platform tends to be. The figures are plausible defaults, not a model.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DiscountTable {
    pub default_rate: f64,
    #[serde(default = "default_max_rate")]
    pub max_rate: f64,
    #[serde(default)]
    pub categories: HashMap<String, f64>,
    #[serde(default)]
    pub platforms: HashMap<String, f64>,
}

impl Default for DiscountTable {
    fn default() -> Self {
        let categories = [
            ("cars", 0.12),
            ("motorcycles", 0.12),
            ("real-estate", 0.05),
            ("electronics", 0.2),
            ("gadgets", 0.2),
            ("furniture", 0.25),
        ];
        // Peer-to-peer marketplaces haggle more than dealer and agent listings.
        let platforms = [
            ("facebook", 0.03),
            ("facebook marketplace", 0.03),
            ("craigslist", 0.03),
            ("offerup", 0.03),
            ("ebay", 0.0),
            ("zillow", -0.02),
            ("autotrader", -0.02),
            ("cars.com", -0.02),
        ];
        Self {
            default_rate: DEFAULT_RATE,
            max_rate: DEFAULT_MAX_RATE,
            categories: categories
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
            platforms: platforms
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }
}

impl DiscountTable {
    fn normalize_keys(mut self) -> Self {
        self.categories = self.categories
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .collect();
        self.platforms = self.platforms
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .collect();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_rate > 0.0 && self.max_rate < 1.0) {
            return Err(ConfigError::Invalid(format!("max_rate {} must be in (0, 1)", self.max_rate)));
        }
        if !(0.0..1.0).contains(&self.default_rate) {
            return Err(
                ConfigError::Invalid(format!("default_rate {} must be in [0, 1)", self.default_rate))
            );
        }
        for (name, rate) in &self.categories {
            if !(0.0..1.0).contains(rate) {
                return Err(
                    ConfigError::Invalid(format!("category '{}' rate {} must be in [0, 1)", name, rate))
                );
            }
        }
        for (name, modifier) in &self.platforms {
            if !(modifier.abs() < 1.0) {
                return Err(
                    ConfigError::Invalid(
                        format!("platform '{}' modifier {} must be in (-1, 1)", name, modifier)
                    )
                );
            }
        }
        Ok(())
    }

    /// Effective discount for a listing. Unknown categories use `default_rate`,
    /// unknown platforms add nothing. Result is clamped to `[0, max_rate]`.
    pub fn rate_for(&self, platform: &str, category: &str) -> f64 {
        let category_key = category.trim().to_lowercase();
        let platform_key = platform.trim().to_lowercase();

        let base = match self.categories.get(&category_key) {
            Some(rate) => *rate,
            None => {
                debug!("No discount rate for category '{}', using default {}", category, self.default_rate);
                self.default_rate
            }
        };
        let modifier = self.platforms.get(&platform_key).copied().unwrap_or_else(|| {
            debug!("No modifier for platform '{}'", platform);
            0.0
        });

        (base + modifier).clamp(0.0, self.max_rate)
    }
}

pub fn load_discounts<P: AsRef<Path>>(path: P) -> Result<DiscountTable, ConfigError> {
    let file_content = fs::read_to_string(&path)?;
    let table: DiscountTable = serde_json::from_str(&file_content)?;
    let table = table.normalize_keys();
    table.validate()?;
    info!(
        "Loaded discount table from {} ({} categories, {} platforms)",
        path.as_ref().display(),
        table.categories.len(),
        table.platforms.len()
    );
    Ok(table)
}
