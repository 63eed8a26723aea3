use chrono::Utc;
use log::{ debug, info };
use uuid::Uuid;

use crate::error::{ HaggleError, Result };
use crate::offer::MAX_PRICE;
use crate::models::{
    Category,
    CategorySavings,
    CloseOutcome,
    CloseReport,
    CompletedDeal,
    MessageKind,
    NegotiationMessage,
    NegotiationStatus,
    NegotiationTab,
    SavingsMilestone,
    SavingsStats,
    SessionFilter,
    SessionUpdate,
};

/// In-memory owner of every open negotiation and the deals closed so far.
/// Tabs keep creation order; deals are kept newest first.
#[derive(Debug, Default, Clone)]
pub struct SessionStore {
    tabs: Vec<NegotiationTab>,
    deals: Vec<CompletedDeal>,
}

fn check_price(label: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(HaggleError::InvalidInput(format!("{} must be a non-negative number, got {}", label, value)));
    }
    if value > MAX_PRICE {
        return Err(HaggleError::InvalidInput(format!("{} must not exceed {}, got {}", label, MAX_PRICE, value)));
    }
    Ok(())
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from existing state, e.g. sample data or a previous snapshot.
    pub fn with_state(tabs: Vec<NegotiationTab>, deals: Vec<CompletedDeal>) -> Self {
        Self { tabs, deals }
    }

    pub fn create_session(&mut self) -> String {
        let id = Uuid::new_v4().to_string();
        self.tabs.push(NegotiationTab::new(id.clone(), Utc::now()));
        info!("Started negotiation {}", id);
        id
    }

    pub fn get_session(&self, id: &str) -> Result<&NegotiationTab> {
        self.tabs
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| HaggleError::NotFound(id.to_string()))
    }

    fn session_mut(&mut self, id: &str) -> Result<&mut NegotiationTab> {
        self.tabs
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| HaggleError::NotFound(id.to_string()))
    }

    /// Shallow-merges `update` into the session and refreshes `last_activity`.
    /// Validation happens before anything is written.
    pub fn update_session(&mut self, id: &str, update: SessionUpdate) -> Result<&NegotiationTab> {
        if let Some(price) = update.original_price {
            check_price("asking price", price)?;
        }
        if let Some(Some(budget)) = update.max_budget {
            check_price("max budget", budget)?;
        }
        if let Some(offer) = update.current_offer {
            check_price("current offer", offer)?;
        }
        if let Some(progress) = update.progress {
            if progress > 100 {
                return Err(HaggleError::InvalidInput(format!("progress must be 0-100, got {}", progress)));
            }
        }

        if let Some(status) = update.status {
            let current = self.get_session(id)?.status;
            if current.is_terminal() && status != current {
                return Err(
                    HaggleError::InvalidInput(
                        format!("negotiation is {} and cannot move to {}", current, status)
                    )
                );
            }
        }

        let tab = self.session_mut(id)?;
        if let Some(title) = update.title {
            tab.title = title;
        }
        if let Some(category) = update.category {
            tab.category = category;
        }
        if let Some(platform) = update.platform {
            tab.platform = platform;
        }
        if let Some(price) = update.original_price {
            tab.original_price = price;
        }
        if let Some(budget) = update.max_budget {
            tab.max_budget = budget;
        }
        if let Some(offer) = update.current_offer {
            tab.current_offer = Some(offer);
        }
        if let Some(progress) = update.progress {
            tab.progress = progress;
        }
        if let Some(status) = update.status {
            tab.status = status;
        }
        tab.last_activity = Utc::now();
        debug!("Updated negotiation {}", id);
        Ok(tab)
    }

    pub fn append_message(&mut self, id: &str, kind: MessageKind, content: &str) -> Result<&NegotiationMessage> {
        let tab = self.session_mut(id)?;
        let now = Utc::now();
        tab.messages.push(NegotiationMessage {
            id: Uuid::new_v4().to_string(),
            kind,
            content: content.to_string(),
            timestamp: now,
        });
        tab.last_activity = now;
        debug!("Appended {:?} message to negotiation {} ({} total)", kind, id, tab.messages.len());
        match tab.messages.last() {
            Some(message) => Ok(message),
            None => Err(HaggleError::NotFound(id.to_string())),
        }
    }

    /// Records a generated counter-offer together with the drafted message.
    pub fn apply_offer(&mut self, id: &str, offer: f64, message: &str) -> Result<&NegotiationTab> {
        check_price("counter-offer", offer)?;
        self.session_mut(id)?.current_offer = Some(offer);
        self.append_message(id, MessageKind::Ai, message)?;
        self.get_session(id)
    }

    pub fn advance_progress(&mut self, id: &str, step: u8) -> Result<u8> {
        let tab = self.session_mut(id)?;
        tab.progress = tab.progress.saturating_add(step).min(100);
        tab.last_activity = Utc::now();
        Ok(tab.progress)
    }

    /// Removes the session. A `CompletedDeal` is recorded only when the deal was
    /// closed at a price above zero and below the asking price. A second close of
    /// the same id fails with `NotFound`.
    pub fn close_session(&mut self, id: &str, outcome: CloseOutcome) -> Result<CloseReport> {
        if let Some(price) = outcome.final_price {
            check_price("final price", price)?;
        }
        let index = self.tabs
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| HaggleError::NotFound(id.to_string()))?;
        let tab = self.tabs.remove(index);

        let deal = match (outcome.deal_closed, outcome.final_price) {
            (true, Some(final_price)) => CompletedDeal::from_tab(&tab, final_price, Utc::now()),
            _ => None,
        };

        match deal {
            Some(deal) => {
                info!(
                    "Closed negotiation {} with a deal: saved {} ({}% off)",
                    id,
                    deal.savings,
                    deal.savings_percentage
                );
                self.deals.insert(0, deal.clone());
                Ok(CloseReport::Deal(deal))
            }
            None => {
                info!("Closed negotiation {} without a deal", id);
                Ok(CloseReport::NoDeal { id: tab.id })
            }
        }
    }

    pub fn list_sessions(&self, filter: Option<SessionFilter>) -> Vec<&NegotiationTab> {
        let filter = filter.unwrap_or_default();
        self.tabs
            .iter()
            .filter(|t| filter.matches(t))
            .collect()
    }

    pub fn completed_deals(&self) -> &[CompletedDeal] {
        &self.deals
    }

    pub fn active_count(&self) -> usize {
        self.tabs
            .iter()
            .filter(|t| t.status == NegotiationStatus::Active)
            .count()
    }

    pub fn aggregate_stats(&self) -> SavingsStats {
        let total_deals = self.deals.len();
        let total_savings: f64 = self.deals
            .iter()
            .map(|d| d.savings)
            .sum();
        let (average_savings, average_discount) = if total_deals > 0 {
            let discount_sum: u32 = self.deals
                .iter()
                .map(|d| d.savings_percentage)
                .sum();
            (
                (total_savings / (total_deals as f64)).round(),
                ((discount_sum as f64) / (total_deals as f64)).round() as u32,
            )
        } else {
            (0.0, 0)
        };

        SavingsStats {
            total_savings,
            total_deals,
            average_savings,
            average_discount,
            active_negotiations: self.active_count(),
        }
    }

    pub fn category_breakdown(&self) -> Vec<CategorySavings> {
        Category::ALL.iter()
            .map(|category| {
                let matching = self.deals.iter().filter(|d| d.category == Some(*category));
                let (deals, savings) = matching.fold((0, 0.0), |(n, s), d| (n + 1, s + d.savings));
                CategorySavings { category: *category, deals, savings }
            })
            .collect()
    }

    pub fn milestone(&self) -> SavingsMilestone {
        SavingsMilestone::for_total(self.aggregate_stats().total_savings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_civic() -> (SessionStore, String) {
        let mut store = SessionStore::new();
        let id = store.create_session();
        store
            .update_session(&id, SessionUpdate {
                title: Some("2019 Honda Civic".to_string()),
                category: Some(Some(Category::Cars)),
                platform: Some("Craigslist".to_string()),
                original_price: Some(18000.0),
                ..Default::default()
            })
            .unwrap();
        (store, id)
    }

    #[test]
    fn test_create_session_defaults() {
        let mut store = SessionStore::new();
        let id = store.create_session();
        let tab = store.get_session(&id).unwrap();
        assert_eq!(tab.status, NegotiationStatus::Active);
        assert_eq!(tab.progress, 0);
        assert!(tab.messages.is_empty());
        assert!(tab.category.is_none());
        assert_eq!(tab.created_at, tab.last_activity);
    }

    #[test]
    fn test_create_session_ids_are_unique() {
        let mut store = SessionStore::new();
        let a = store.create_session();
        let b = store.create_session();
        assert_ne!(a, b);
        assert_eq!(store.list_sessions(None).len(), 2);
    }

    #[test]
    fn test_update_merges_and_refreshes_activity() {
        let (mut store, id) = store_with_civic();
        let before = store.get_session(&id).unwrap().last_activity;

        let tab = store
            .update_session(&id, SessionUpdate { max_budget: Some(Some(16000.0)), ..Default::default() })
            .unwrap();
        assert_eq!(tab.title, "2019 Honda Civic");
        assert_eq!(tab.max_budget, Some(16000.0));
        assert!(tab.last_activity >= before);

        let tab = store
            .update_session(&id, SessionUpdate { max_budget: Some(None), ..Default::default() })
            .unwrap();
        assert_eq!(tab.max_budget, None);
    }

    #[test]
    fn test_update_missing_session_leaves_store_unchanged() {
        let (mut store, id) = store_with_civic();
        let result = store.update_session("missing", SessionUpdate {
            title: Some("x".to_string()),
            ..Default::default()
        });
        assert!(matches!(result, Err(HaggleError::NotFound(_))));
        let sessions = store.list_sessions(None);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, id);
        assert_eq!(sessions[0].title, "2019 Honda Civic");
    }

    #[test]
    fn test_update_rejects_invalid_values_without_partial_write() {
        let (mut store, id) = store_with_civic();
        let result = store.update_session(&id, SessionUpdate {
            title: Some("Changed".to_string()),
            original_price: Some(-1.0),
            ..Default::default()
        });
        assert!(matches!(result, Err(HaggleError::InvalidInput(_))));
        assert_eq!(store.get_session(&id).unwrap().title, "2019 Honda Civic");

        let result = store.update_session(&id, SessionUpdate { progress: Some(101), ..Default::default() });
        assert!(matches!(result, Err(HaggleError::InvalidInput(_))));
    }

    #[test]
    fn test_prices_above_cap_are_rejected() {
        let (mut store, id) = store_with_civic();
        let result = store.update_session(&id, SessionUpdate { original_price: Some(1e20), ..Default::default() });
        assert!(matches!(result, Err(HaggleError::InvalidInput(_))));
        assert_eq!(store.get_session(&id).unwrap().original_price, 18000.0);

        let result = store.apply_offer(&id, 1e20, "too much");
        assert!(matches!(result, Err(HaggleError::InvalidInput(_))));
        assert!(store.get_session(&id).unwrap().messages.is_empty());
    }

    #[test]
    fn test_terminal_status_cannot_reopen() {
        let (mut store, id) = store_with_civic();
        store
            .update_session(&id, SessionUpdate { status: Some(NegotiationStatus::Closed), ..Default::default() })
            .unwrap();

        let result = store.update_session(&id, SessionUpdate {
            status: Some(NegotiationStatus::Active),
            title: Some("Reopened".to_string()),
            ..Default::default()
        });
        assert!(matches!(result, Err(HaggleError::InvalidInput(_))));
        let tab = store.get_session(&id).unwrap();
        assert_eq!(tab.status, NegotiationStatus::Closed);
        assert_eq!(tab.title, "2019 Honda Civic");

        let result = store.update_session(&id, SessionUpdate {
            status: Some(NegotiationStatus::Completed),
            ..Default::default()
        });
        assert!(matches!(result, Err(HaggleError::InvalidInput(_))));

        // Re-stating the same terminal status is harmless.
        assert!(store
            .update_session(&id, SessionUpdate { status: Some(NegotiationStatus::Closed), ..Default::default() })
            .is_ok());
    }

    #[test]
    fn test_messages_are_append_only() {
        let (mut store, id) = store_with_civic();
        let kinds = [MessageKind::Ai, MessageKind::Seller, MessageKind::User];
        for n in 0..9 {
            let content = format!("message {}", n);
            store.append_message(&id, kinds[n % 3], &content).unwrap();
            let tab = store.get_session(&id).unwrap();
            assert_eq!(tab.messages.len(), n + 1);
            assert_eq!(tab.latest_message().unwrap().content, content);
        }
        let contents: Vec<_> = store
            .get_session(&id)
            .unwrap()
            .messages.iter()
            .map(|m| m.content.clone())
            .collect();
        let expected: Vec<_> = (0..9).map(|n| format!("message {}", n)).collect();
        assert_eq!(contents, expected);
    }

    #[test]
    fn test_apply_offer_sets_offer_and_appends_ai_message() {
        let (mut store, id) = store_with_civic();
        let tab = store.apply_offer(&id, 15300.0, "Would you take $15,300?").unwrap();
        assert_eq!(tab.current_offer, Some(15300.0));
        assert_eq!(tab.messages.len(), 1);
        assert_eq!(tab.messages[0].kind, MessageKind::Ai);
        assert_eq!(tab.projected_savings(), Some((2700.0, 15)));
    }

    #[test]
    fn test_advance_progress_caps_at_hundred() {
        let (mut store, id) = store_with_civic();
        store.update_session(&id, SessionUpdate { progress: Some(95), ..Default::default() }).unwrap();
        assert_eq!(store.advance_progress(&id, 10).unwrap(), 100);
        assert_eq!(store.advance_progress(&id, 10).unwrap(), 100);
    }

    #[test]
    fn test_close_with_deal_records_savings() {
        let (mut store, id) = store_with_civic();
        let report = store.close_session(&id, CloseOutcome::deal(15500.0)).unwrap();
        match report {
            CloseReport::Deal(deal) => {
                assert_eq!(deal.savings, 2500.0);
                assert_eq!(deal.savings_percentage, 14);
                assert_eq!(deal.final_price, 15500.0);
                assert!(deal.deal_closed);
            }
            other => panic!("expected a deal, got {:?}", other),
        }
        assert!(store.list_sessions(None).is_empty());
        assert_eq!(store.completed_deals().len(), 1);
    }

    #[test]
    fn test_close_without_savings_records_nothing() {
        for final_price in [18000.0, 19000.0, 0.0] {
            let (mut store, id) = store_with_civic();
            let report = store.close_session(&id, CloseOutcome::deal(final_price)).unwrap();
            assert!(matches!(report, CloseReport::NoDeal { .. }));
            assert!(store.completed_deals().is_empty());
            assert!(store.list_sessions(None).is_empty());
        }

        let (mut store, id) = store_with_civic();
        let report = store.close_session(&id, CloseOutcome::no_deal()).unwrap();
        assert!(matches!(report, CloseReport::NoDeal { .. }));
        assert!(store.completed_deals().is_empty());
    }

    #[test]
    fn test_close_rejects_negative_final_price() {
        let (mut store, id) = store_with_civic();
        let result = store.close_session(&id, CloseOutcome::deal(-10.0));
        assert!(matches!(result, Err(HaggleError::InvalidInput(_))));
        assert!(store.get_session(&id).is_ok());
    }

    #[test]
    fn test_second_close_is_not_found() {
        let (mut store, id) = store_with_civic();
        store.close_session(&id, CloseOutcome::deal(15500.0)).unwrap();
        let result = store.close_session(&id, CloseOutcome::deal(15500.0));
        assert!(matches!(result, Err(HaggleError::NotFound(_))));
        assert_eq!(store.completed_deals().len(), 1);
    }

    #[test]
    fn test_aggregate_stats_empty() {
        let stats = SessionStore::new().aggregate_stats();
        assert_eq!(stats.total_savings, 0.0);
        assert_eq!(stats.total_deals, 0);
        assert_eq!(stats.average_savings, 0.0);
        assert_eq!(stats.average_discount, 0);
    }

    #[test]
    fn test_aggregate_stats_and_breakdown() {
        let mut store = SessionStore::new();
        for (category, price, final_price) in [
            (Category::Cars, 18000.0, 15500.0),
            (Category::Electronics, 1200.0, 950.0),
            (Category::Furniture, 800.0, 550.0),
        ] {
            let id = store.create_session();
            store
                .update_session(&id, SessionUpdate {
                    category: Some(Some(category)),
                    original_price: Some(price),
                    ..Default::default()
                })
                .unwrap();
            store.close_session(&id, CloseOutcome::deal(final_price)).unwrap();
        }
        store.create_session();

        let stats = store.aggregate_stats();
        assert_eq!(stats.total_savings, 3000.0);
        assert_eq!(stats.total_deals, 3);
        assert_eq!(stats.average_savings, 1000.0);
        // 14%, 21%, 31%
        assert_eq!(stats.average_discount, 22);
        assert_eq!(stats.active_negotiations, 1);

        let breakdown = store.category_breakdown();
        let cars = breakdown.iter().find(|c| c.category == Category::Cars).unwrap();
        assert_eq!(cars.deals, 1);
        assert_eq!(cars.savings, 2500.0);
        let gadgets = breakdown.iter().find(|c| c.category == Category::Gadgets).unwrap();
        assert_eq!(gadgets.deals, 0);

        assert_eq!(store.completed_deals()[0].category, Some(Category::Furniture));
        let milestone = store.milestone();
        assert_eq!(milestone.next_milestone, 5000.0);
        assert!((milestone.progress - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_list_sessions_filter() {
        let (mut store, id) = store_with_civic();
        let other = store.create_session();
        store
            .update_session(&other, SessionUpdate {
                status: Some(NegotiationStatus::Completed),
                ..Default::default()
            })
            .unwrap();

        let active = store.list_sessions(Some(SessionFilter::Status(NegotiationStatus::Active)));
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, id);
        let cars = store.list_sessions(Some(SessionFilter::Category(Category::Cars)));
        assert_eq!(cars.len(), 1);
        assert_eq!(store.active_count(), 1);
    }
}
