use chrono::{ DateTime, Utc };
use serde::{ Deserialize, Serialize };
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Cars,
    Electronics,
    Furniture,
    RealEstate,
    Motorcycles,
    Gadgets,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Cars,
        Category::Electronics,
        Category::Furniture,
        Category::RealEstate,
        Category::Motorcycles,
        Category::Gadgets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Cars => "cars",
            Category::Electronics => "electronics",
            Category::Furniture => "furniture",
            Category::RealEstate => "real-estate",
            Category::Motorcycles => "motorcycles",
            Category::Gadgets => "gadgets",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseCategoryError {
    message: String,
}

impl fmt::Display for ParseCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseCategoryError {}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cars" => Ok(Category::Cars),
            "electronics" => Ok(Category::Electronics),
            "furniture" => Ok(Category::Furniture),
            "real-estate" | "real estate" => Ok(Category::RealEstate),
            "motorcycles" => Ok(Category::Motorcycles),
            "gadgets" => Ok(Category::Gadgets),
            _ =>
                Err(ParseCategoryError {
                    message: format!("Invalid category: '{}'", s),
                }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NegotiationStatus {
    Active,
    Completed,
    Closed,
}

impl FromStr for NegotiationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(NegotiationStatus::Active),
            "completed" => Ok(NegotiationStatus::Completed),
            "closed" => Ok(NegotiationStatus::Closed),
            _ => Err(format!("Invalid status: '{}'", s)),
        }
    }
}

impl NegotiationStatus {
    /// `Completed` and `Closed` never lead back to `Active`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, NegotiationStatus::Active)
    }
}

impl fmt::Display for NegotiationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NegotiationStatus::Active => "active",
            NegotiationStatus::Completed => "completed",
            NegotiationStatus::Closed => "closed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Ai,
    Seller,
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" | "me" => Ok(MessageKind::User),
            "ai" => Ok(MessageKind::Ai),
            "seller" => Ok(MessageKind::Seller),
            _ => Err(format!("Invalid message type: '{}'", s)),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NegotiationMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// How far along a negotiation is, as shown next to its progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStage {
    EarlyStage,
    InProgress,
    NearCompletion,
}

impl ProgressStage {
    pub fn from_progress(progress: u8) -> Self {
        if progress < 30 {
            ProgressStage::EarlyStage
        } else if progress < 70 {
            ProgressStage::InProgress
        } else {
            ProgressStage::NearCompletion
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProgressStage::EarlyStage => "Early Stage",
            ProgressStage::InProgress => "In Progress",
            ProgressStage::NearCompletion => "Near Completion",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationTab {
    pub id: String,
    pub title: String,
    pub category: Option<Category>,
    pub platform: String,
    pub original_price: f64,
    pub max_budget: Option<f64>,
    pub current_offer: Option<f64>,
    pub status: NegotiationStatus,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub progress: u8,
    pub messages: Vec<NegotiationMessage>,
}

impl NegotiationTab {
    pub fn new(id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: "New Negotiation".to_string(),
            category: None,
            platform: String::new(),
            original_price: 0.0,
            max_budget: None,
            current_offer: None,
            status: NegotiationStatus::Active,
            created_at: now,
            last_activity: now,
            progress: 0,
            messages: Vec::new(),
        }
    }

    pub fn latest_message(&self) -> Option<&NegotiationMessage> {
        self.messages.last()
    }

    pub fn stage(&self) -> ProgressStage {
        ProgressStage::from_progress(self.progress)
    }

    /// Savings implied by the current offer as `(amount, rounded percentage)`.
    /// `None` unless there is an offer strictly below a positive asking price.
    pub fn projected_savings(&self) -> Option<(f64, u32)> {
        let offer = self.current_offer?;
        if self.original_price <= 0.0 || offer >= self.original_price {
            return None;
        }
        let savings = self.original_price - offer;
        Some((savings, percentage_of(savings, self.original_price)))
    }
}

pub(crate) fn percentage_of(part: f64, whole: f64) -> u32 {
    ((part / whole) * 100.0).round() as u32
}

/// Partial update applied by `SessionStore::update_session`.
/// Has no `messages` field; messages only grow through `append_message`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionUpdate {
    pub title: Option<String>,
    pub category: Option<Option<Category>>,
    pub platform: Option<String>,
    pub original_price: Option<f64>,
    pub max_budget: Option<Option<f64>>,
    pub current_offer: Option<f64>,
    pub progress: Option<u8>,
    pub status: Option<NegotiationStatus>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SessionFilter {
    #[default]
    All,
    Status(NegotiationStatus),
    Category(Category),
}

impl SessionFilter {
    pub fn matches(&self, tab: &NegotiationTab) -> bool {
        match self {
            SessionFilter::All => true,
            SessionFilter::Status(status) => tab.status == *status,
            SessionFilter::Category(category) => tab.category == Some(*category),
        }
    }
}
