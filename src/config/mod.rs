pub mod discounts;
pub mod templates;

use log::info;
use std::time::Duration;

use crate::cli::Args;
use crate::error::ConfigError;
use discounts::{ load_discounts, DiscountTable };
use templates::{ load_templates, TemplateSet };

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub discounts: DiscountTable,
    pub templates: TemplateSet,
    pub message_delay: Duration,
    pub analysis_delay: Duration,
    pub template_seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            discounts: DiscountTable::default(),
            templates: TemplateSet::default(),
            message_delay: Duration::ZERO,
            analysis_delay: Duration::ZERO,
            template_seed: None,
        }
    }
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let discounts = match &args.discounts_path {
            Some(path) => load_discounts(path)?,
            None => {
                info!("Using built-in discount table");
                DiscountTable::default()
            }
        };
        let templates = match &args.templates_path {
            Some(path) => load_templates(path)?,
            None => {
                info!("Using built-in message templates");
                TemplateSet::default()
            }
        };

        Ok(Self {
            discounts,
            templates,
            message_delay: Duration::from_millis(args.message_delay_ms),
            analysis_delay: Duration::from_millis(args.analysis_delay_ms),
            template_seed: args.template_seed,
        })
    }
}
