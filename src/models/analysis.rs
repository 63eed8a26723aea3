use serde::{ Serialize, Deserialize };

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    High,
    Medium,
    Low,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceAnalysis {
    pub mentioned_price: Option<String>,
    pub price_flexibility: Level,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub sentiment: Sentiment,
    pub key_points: Vec<String>,
    pub suggested_response: String,
    pub negotiation_tips: Vec<String>,
    pub price_analysis: Option<PriceAnalysis>,
    pub urgency_level: Level,
    pub seller_motivation: String,
}

/// An uploaded conversation screenshot.
#[derive(Debug, Clone)]
pub struct ScreenshotUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}
