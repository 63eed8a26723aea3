use async_trait::async_trait;
use log::debug;
use std::time::Duration;

use crate::analysis::{ validate_upload, ConversationAnalyzer };
use crate::error::Result;
use crate::models::{ AnalysisResult, Category, Level, PriceAnalysis, ScreenshotUpload, Sentiment };

/// Stand-in analyzer: validates the upload, waits, and returns a fixed result
/// for the category. The image bytes are never inspected.
pub struct MockAnalyzer {
    delay: Duration,
}

impl MockAnalyzer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ConversationAnalyzer for MockAnalyzer {
    async fn analyze(
        &self,
        upload: &ScreenshotUpload,
        category: Option<Category>
    ) -> Result<AnalysisResult> {
        let category = validate_upload(upload, category)?;
        debug!("Analyzing '{}' ({} bytes) as {}", upload.file_name, upload.bytes.len(), category);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(canned_result(category))
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn canned_result(category: Category) -> AnalysisResult {
    match category {
        Category::Cars =>
            AnalysisResult {
                sentiment: Sentiment::Neutral,
                key_points: strings(
                    &[
                        "Seller mentions recent maintenance records available",
                        "Price seems negotiable based on \"open to reasonable offers\" language",
                        "Seller is motivated due to upcoming move mentioned",
                        "No major red flags detected in conversation tone",
                        "Seller responds quickly indicating active engagement",
                    ]
                ),
                suggested_response: "Thank you for the detailed information about the recent maintenance. I understand you're moving soon, and I'd love to make this a smooth transaction for both of us. Based on the current market for similar vehicles, would you consider $X? I'm pre-approved for financing and can complete the purchase this week.".to_string(),
                negotiation_tips: strings(
                    &[
                        "Emphasize the quick sale benefit due to their move",
                        "Acknowledge the maintenance positively to build rapport",
                        "Show you're a serious, qualified buyer with financing ready",
                        "Offer to work with their timeline to add value",
                        "Reference market research to justify your offer",
                    ]
                ),
                price_analysis: Some(PriceAnalysis {
                    mentioned_price: Some("$15,000".to_string()),
                    price_flexibility: Level::Medium,
                }),
                urgency_level: Level::Medium,
                seller_motivation: "Moving timeline creates moderate urgency".to_string(),
            },
        Category::Furniture =>
            AnalysisResult {
                sentiment: Sentiment::Neutral,
                key_points: strings(
                    &[
                        "Seller mentions moving and needs to sell quickly",
                        "Furniture is from smoke-free, pet-free home",
                        "Some minor wear mentioned but seller is honest about it",
                        "Seller seems reasonable and open to negotiation",
                        "Pickup logistics discussed - seller is flexible",
                    ]
                ),
                suggested_response: "I really appreciate your honesty about the minor wear. I understand you're moving and need to sell quickly, and I'd love to make that easier for you. Given your timeline and the wear you mentioned, would $X work? I have a truck and can handle pickup this weekend.".to_string(),
                negotiation_tips: strings(
                    &[
                        "Leverage the moving timeline for urgency",
                        "Offer pickup convenience to add value",
                        "Acknowledge honesty about condition to build trust",
                        "Emphasize helping their situation",
                        "Show you have logistics handled",
                    ]
                ),
                price_analysis: Some(PriceAnalysis {
                    mentioned_price: Some("$400".to_string()),
                    price_flexibility: Level::High,
                }),
                urgency_level: Level::High,
                seller_motivation: "Moving deadline creates high urgency".to_string(),
            },
        Category::RealEstate =>
            AnalysisResult {
                sentiment: Sentiment::Positive,
                key_points: strings(
                    &[
                        "Seller mentions recent updates and improvements",
                        "Property has been well-maintained",
                        "Seller seems motivated but not desperate",
                        "Flexible on closing timeline mentioned",
                        "Open to serious offers from qualified buyers",
                    ]
                ),
                suggested_response: "Thank you for sharing the details about the recent updates. I'm a pre-qualified buyer with financing already arranged, and I appreciate your flexibility on the closing timeline. Based on recent comparables in the neighborhood, I'd like to submit an offer of $X. I can provide proof of funds and move quickly.".to_string(),
                negotiation_tips: strings(
                    &[
                        "Emphasize your pre-qualification and financing",
                        "Acknowledge the property improvements positively",
                        "Reference comparable sales for justification",
                        "Show you're a serious, qualified buyer",
                        "Offer quick closing if beneficial",
                    ]
                ),
                price_analysis: Some(PriceAnalysis {
                    mentioned_price: Some("$285,000".to_string()),
                    price_flexibility: Level::Low,
                }),
                urgency_level: Level::Low,
                seller_motivation: "Motivated but patient, looking for right buyer".to_string(),
            },
        Category::Electronics | Category::Gadgets | Category::Motorcycles =>
            AnalysisResult {
                sentiment: Sentiment::Positive,
                key_points: strings(
                    &[
                        "Item is in excellent condition with original packaging",
                        "Seller mentions barely used, purchased recently",
                        "Original accessories and warranty info included",
                        "Seller seems flexible on timing for pickup",
                        "Multiple interested buyers mentioned (competition factor)",
                    ]
                ),
                suggested_response: "I really appreciate you including all the original packaging and accessories. I understand you have other interested buyers, but I'm ready to purchase today with cash and can pick it up at your convenience. Would you consider $X? I can come get it within the hour.".to_string(),
                negotiation_tips: strings(
                    &[
                        "Act quickly due to competition from other buyers",
                        "Emphasize immediate cash payment and pickup",
                        "Acknowledge the excellent condition to build rapport",
                        "Offer convenience of immediate transaction",
                        "Show urgency without appearing desperate",
                    ]
                ),
                price_analysis: Some(PriceAnalysis {
                    mentioned_price: Some("$800".to_string()),
                    price_flexibility: Level::High,
                }),
                urgency_level: Level::High,
                seller_motivation: "Quick sale desired, multiple buyers create urgency".to_string(),
            },
    }
}
