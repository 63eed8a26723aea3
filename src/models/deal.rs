use chrono::{ DateTime, Utc };
use serde::{ Deserialize, Serialize };

use super::negotiation::{ percentage_of, Category, NegotiationTab };

/// Frozen record of a negotiation that ended below the asking price.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedDeal {
    pub id: String,
    pub title: String,
    pub category: Option<Category>,
    pub platform: String,
    pub original_price: f64,
    pub final_price: f64,
    pub savings: f64,
    pub savings_percentage: u32,
    pub completed_at: DateTime<Utc>,
    pub deal_closed: bool,
}

impl CompletedDeal {
    /// Returns `None` unless `0 < final_price < original_price`.
    pub fn from_tab(tab: &NegotiationTab, final_price: f64, now: DateTime<Utc>) -> Option<Self> {
        if !(final_price > 0.0 && final_price < tab.original_price) {
            return None;
        }
        let savings = tab.original_price - final_price;
        Some(Self {
            id: tab.id.clone(),
            title: tab.title.clone(),
            category: tab.category,
            platform: tab.platform.clone(),
            original_price: tab.original_price,
            final_price,
            savings,
            savings_percentage: percentage_of(savings, tab.original_price),
            completed_at: now,
            deal_closed: true,
        })
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CloseOutcome {
    pub deal_closed: bool,
    pub final_price: Option<f64>,
}

impl CloseOutcome {
    pub fn deal(final_price: f64) -> Self {
        Self { deal_closed: true, final_price: Some(final_price) }
    }

    pub fn no_deal() -> Self {
        Self::default()
    }
}

#[derive(Clone, Debug)]
pub enum CloseReport {
    Deal(CompletedDeal),
    NoDeal {
        id: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsStats {
    pub total_savings: f64,
    pub total_deals: usize,
    pub average_savings: f64,
    pub average_discount: u32,
    pub active_negotiations: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySavings {
    pub category: Category,
    pub deals: usize,
    pub savings: f64,
}

const MILESTONES: [f64; 6] = [1000.0, 2500.0, 5000.0, 10000.0, 25000.0, 50000.0];
const FINAL_MILESTONE: f64 = 100000.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsMilestone {
    pub next_milestone: f64,
    pub progress: f64,
}

impl SavingsMilestone {
    pub fn for_total(total_savings: f64) -> Self {
        let next_milestone = MILESTONES.iter()
            .copied()
            .find(|m| *m > total_savings)
            .unwrap_or(FINAL_MILESTONE);
        let progress = ((total_savings / next_milestone) * 100.0).min(100.0);
        Self { next_milestone, progress }
    }
}
