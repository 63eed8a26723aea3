use async_trait::async_trait;
use log::debug;
use rand::rngs::StdRng;
use rand::{ Rng, RngCore, SeedableRng };
use std::sync::Mutex;
use std::time::Duration;

use crate::config::templates::{ render, TemplateSet, TemplateValues };
use crate::config::AppConfig;
use crate::error::{ HaggleError, Result };
use crate::offer::MAX_PRICE;

#[derive(Debug, Clone, Default)]
pub struct DraftRequest {
    pub title: String,
    pub original_price: f64,
    pub offer_price: f64,
    pub platform: String,
    pub context: String,
    pub category: String,
}

impl DraftRequest {
    fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(HaggleError::InvalidInput("listing title is required".to_string()));
        }
        if self.platform.trim().is_empty() {
            return Err(HaggleError::InvalidInput("platform is required".to_string()));
        }
        if !(self.original_price.is_finite() && self.original_price > 0.0) {
            return Err(HaggleError::InvalidInput("asking price must be greater than zero".to_string()));
        }
        if !(self.offer_price.is_finite() && self.offer_price >= 0.0) {
            return Err(HaggleError::InvalidInput("offer price must not be negative".to_string()));
        }
        if self.original_price > MAX_PRICE || self.offer_price > MAX_PRICE {
            return Err(HaggleError::InvalidInput(format!("prices must not exceed {}", MAX_PRICE)));
        }
        Ok(())
    }
}

#[async_trait]
pub trait MessageDrafter: Send + Sync {
    async fn draft(&self, request: &DraftRequest) -> Result<String>;
}

/// Fills a canned category template. No network access; the optional delay
/// only imitates the latency of a real assistant.
pub struct TemplateDrafter {
    templates: TemplateSet,
    rng: Mutex<Box<dyn RngCore + Send>>,
    delay: Duration,
}

impl TemplateDrafter {
    pub fn new<R: RngCore + Send + 'static>(templates: TemplateSet, rng: R, delay: Duration) -> Self {
        Self {
            templates,
            rng: Mutex::new(Box::new(rng)),
            delay,
        }
    }

    pub fn seeded(templates: TemplateSet, seed: u64, delay: Duration) -> Self {
        Self::new(templates, StdRng::seed_from_u64(seed), delay)
    }

    pub fn from_config(config: &AppConfig) -> Self {
        match config.template_seed {
            Some(seed) => Self::seeded(config.templates.clone(), seed, config.message_delay),
            None => Self::new(config.templates.clone(), StdRng::from_entropy(), config.message_delay),
        }
    }

    fn pick<'a>(&self, variants: &'a [String]) -> &'a str {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let index = rng.gen_range(0..variants.len());
        &variants[index]
    }
}

#[async_trait]
impl MessageDrafter for TemplateDrafter {
    async fn draft(&self, request: &DraftRequest) -> Result<String> {
        request.validate()?;

        let variants = self.templates.variants_for(&request.category);
        if variants.is_empty() {
            return Err(HaggleError::InvalidInput("no message templates configured".to_string()));
        }
        let template = self.pick(variants);

        if !self.delay.is_zero() {
            debug!("Simulating drafting latency of {:?}", self.delay);
            tokio::time::sleep(self.delay).await;
        }

        Ok(
            render(template, &(TemplateValues {
                title: request.title.trim(),
                original_price: request.original_price,
                offer_price: request.offer_price,
                platform: request.platform.trim(),
                context: &request.context,
            }))
        )
    }
}
