use log::info;
use serde::{ Deserialize, Serialize };
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Canned negotiation paragraphs, keyed by category. Each category may carry
/// several variants; one is picked per draft.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TemplateSet {
    pub generic: Vec<String>,
    #[serde(default)]
    pub categories: HashMap<String, Vec<String>>,
}

/// Values substituted into a template.
#[derive(Debug, Clone)]
pub struct TemplateValues<'a> {
    pub title: &'a str,
    pub original_price: f64,
    pub offer_price: f64,
    pub platform: &'a str,
    pub context: &'a str,
}

fn owned(variants: &[&str]) -> Vec<String> {
    variants
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for TemplateSet {
    fn default() -> Self {
        let mut categories = HashMap::new();
        categories.insert(
            "cars".to_string(),
            owned(
                &[
                    "Hi! I'm very interested in your {title}. I've been looking for exactly this model and I'm ready to purchase this week. Based on current market values and the condition, would you consider {offer_price}? That's {savings_percentage}% under your {original_price} asking price, and I can come see it and complete the purchase with financing already arranged.{context}",
                    "Hello! Your {title} on {platform} caught my eye. I've compared similar vehicles in the area and I'd like to offer {offer_price}. I'm a serious buyer with financing ready and can move quickly if that works for you.{context}",
                ]
            )
        );
        categories.insert(
            "motorcycles".to_string(),
            owned(
                &[
                    "Hi! I'm interested in your {title}. I ride regularly and know this model well. Looking at comparable bikes, would you take {offer_price}? I can pick it up this week with cash.{context}",
                    "Hey, is the {title} still available? I can offer {offer_price} cash and handle the transport myself.{context}",
                ]
            )
        );
        categories.insert(
            "electronics".to_string(),
            owned(
                &[
                    "Hi! I'm very interested in your {title}. I've been looking for this exact model and I'm ready to purchase today. Based on current market prices, would you consider {offer_price}? I can pick it up immediately with cash if we can agree on this price.{context}",
                    "Hello! Is the {title} still available? I've seen similar listings going for less than {original_price}, so would {offer_price} work? I can meet today and pay in cash.{context}",
                ]
            )
        );
        categories.insert(
            "gadgets".to_string(),
            owned(
                &[
                    "Hi! Your {title} is just what I need. Would you consider {offer_price}? I can pay right away and pick it up whenever suits you.{context}",
                    "Hey! Still have the {title}? I'd like to offer {offer_price}, cash on pickup.{context}",
                ]
            )
        );
        categories.insert(
            "furniture".to_string(),
            owned(
                &[
                    "Hi! I love your {title}, it would fit perfectly in my place. I have a truck and can handle pickup this weekend. Would you consider {offer_price}? That saves you the hassle of moving it.{context}",
                    "Hello! Is the {title} still available? I'd like to offer {offer_price} and can take it off your hands quickly with my own transport.{context}",
                ]
            )
        );
        categories.insert(
            "real-estate".to_string(),
            owned(
                &[
                    "Hello, I'm very interested in {title}. I'm a pre-qualified buyer with financing arranged. Based on recent comparables in the neighborhood, I'd like to submit an offer of {offer_price}. I can provide proof of funds and move quickly toward closing.{context}",
                    "Hi, thank you for listing {title}. After reviewing comparable sales, I'd like to offer {offer_price} against the {original_price} asking price. I'm flexible on the closing timeline.{context}",
                ]
            )
        );

        Self {
            generic: owned(
                &[
                    "Hi! I'm interested in your {title}. Would you consider {offer_price}? I'm ready to buy and can pick it up at your convenience.{context}",
                    "Hello! Is the {title} still available? I'd like to offer {offer_price} and can complete the purchase quickly.{context}",
                ]
            ),
            categories,
        }
    }
}

impl TemplateSet {
    fn normalize_keys(mut self) -> Self {
        self.categories = self.categories
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .collect();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generic.is_empty() {
            return Err(ConfigError::Invalid("generic templates must not be empty".to_string()));
        }
        for (name, variants) in &self.categories {
            if variants.is_empty() {
                return Err(
                    ConfigError::Invalid(format!("templates for category '{}' must not be empty", name))
                );
            }
        }
        Ok(())
    }

    /// Variants for a category, or the generic ones if the category is unknown.
    pub fn variants_for(&self, category: &str) -> &[String] {
        self.categories
            .get(&category.trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .map(|v| v.as_slice())
            .unwrap_or(&self.generic)
    }
}

/// `$15,500` for whole amounts, `$15,500.50` otherwise.
pub fn format_money(amount: f64) -> String {
    let negative = amount < 0.0;
    // Digits come from the float's own formatting so huge amounts never wrap or saturate.
    let cents = format!("{:03.0}", (amount.abs() * 100.0).round());
    let (digits, frac) = cents.split_at(cents.len() - 2);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    if frac == "00" {
        format!("{}${}", sign, grouped)
    } else {
        format!("{}${}.{}", sign, grouped, frac)
    }
}

/// Fills `{name}` placeholders in one left-to-right pass. Inserted values are
/// never scanned again, so a title containing `{offer_price}` stays literal.
/// Unknown placeholders are kept as written.
pub fn render(template: &str, values: &TemplateValues<'_>) -> String {
    let savings = (values.original_price - values.offer_price).max(0.0);
    let savings_percentage = if values.original_price > 0.0 {
        ((savings / values.original_price) * 100.0).round() as u32
    } else {
        0
    };
    let context = values.context.trim();
    let context = if context.is_empty() { String::new() } else { format!(" {}", context) };

    let mut out = String::with_capacity(template.len() + 64);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = match after.find(&['}', '{'][..]) {
            Some(close) if after.as_bytes()[close] == b'}' => close,
            _ => {
                out.push('{');
                rest = after;
                continue;
            }
        };
        let name = &after[..close];
        match name {
            "title" => out.push_str(values.title),
            "original_price" => out.push_str(&format_money(values.original_price)),
            "offer_price" => out.push_str(&format_money(values.offer_price)),
            "savings" => out.push_str(&format_money(savings)),
            "savings_percentage" => out.push_str(&savings_percentage.to_string()),
            "platform" => out.push_str(values.platform),
            "context" => out.push_str(&context),
            _ => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

pub fn load_templates<P: AsRef<Path>>(path: P) -> Result<TemplateSet, ConfigError> {
    let file_content = fs::read_to_string(&path)?;
    let templates: TemplateSet = serde_json::from_str(&file_content)?;
    let templates = templates.normalize_keys();
    templates.validate()?;
    info!(
        "Loaded message templates from {} ({} categories)",
        path.as_ref().display(),
        templates.categories.len()
    );
    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(15500.0), "$15,500");
        assert_eq!(format_money(800.0), "$800");
        assert_eq!(format_money(1234567.5), "$1,234,567.50");
        assert_eq!(format_money(0.0), "$0");
        assert_eq!(format_money(0.05), "$0.05");
        assert_eq!(format_money(-2500.0), "-$2,500");
    }

    #[test]
    fn test_format_money_large_amounts_do_not_saturate() {
        assert_eq!(format_money(1e20), "$100,000,000,000,000,000,000");
        assert_eq!(format_money(1_000_000_000_000.0), "$1,000,000,000,000");
    }

    #[test]
    fn test_render_substitutes_all_placeholders() {
        let values = TemplateValues {
            title: "2019 Honda Civic",
            original_price: 18000.0,
            offer_price: 15500.0,
            platform: "Craigslist",
            context: "",
        };
        let rendered = render(
            "{title}|{original_price}|{offer_price}|{savings}|{savings_percentage}|{platform}|{context}",
            &values
        );
        assert_eq!(rendered, "2019 Honda Civic|$18,000|$15,500|$2,500|14|Craigslist|");
    }

    #[test]
    fn test_render_appends_context_with_space() {
        let values = TemplateValues {
            title: "Couch",
            original_price: 400.0,
            offer_price: 300.0,
            platform: "OfferUp",
            context: "  I live nearby.  ",
        };
        assert_eq!(render("Offer {offer_price}.{context}", &values), "Offer $300. I live nearby.");
    }

    #[test]
    fn test_render_leaves_braces_inside_values_alone() {
        let values = TemplateValues {
            title: "Gift card {offer_price}",
            original_price: 100.0,
            offer_price: 80.0,
            platform: "{context}",
            context: "ignored?",
        };
        assert_eq!(render("{title} on {platform}", &values), "Gift card {offer_price} on {context}");
    }

    #[test]
    fn test_render_keeps_unknown_and_unclosed_placeholders() {
        let values = TemplateValues {
            title: "Lamp",
            original_price: 50.0,
            offer_price: 40.0,
            platform: "eBay",
            context: "",
        };
        assert_eq!(render("{buyer} wants {title} {{offer_price} {", &values), "{buyer} wants Lamp {$40 {");
    }

    #[test]
    fn test_default_templates_cover_every_category() {
        let templates = TemplateSet::default();
        assert!(templates.validate().is_ok());
        for category in crate::models::Category::ALL {
            assert!(
                templates.categories.contains_key(category.as_str()),
                "missing templates for {}",
                category
            );
        }
    }

    #[test]
    fn test_unknown_category_uses_generic_variants() {
        let templates = TemplateSet::default();
        assert_eq!(templates.variants_for("boats"), templates.generic.as_slice());
        assert_eq!(templates.variants_for(""), templates.generic.as_slice());
    }

    #[test]
    fn test_load_templates_rejects_empty_generic() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "generic": [] }}"#).unwrap();
        assert!(matches!(load_templates(file.path()), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_templates_normalizes_keys() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "generic": ["g {{title}}"], "categories": {{ "Cars": ["c {{title}}"] }} }}"#).unwrap();
        let templates = load_templates(file.path()).expect("Should load templates");
        assert_eq!(templates.variants_for("cars"), &["c {title}".to_string()]);
    }
}
