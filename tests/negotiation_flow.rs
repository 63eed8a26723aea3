use haggle::config::discounts::DiscountTable;
use haggle::config::templates::TemplateSet;
use haggle::error::HaggleError;
use haggle::models::{ Category, CloseOutcome, CloseReport, MessageKind, SessionUpdate };
use haggle::offer::{ calculate_counter_offer, DraftRequest, MessageDrafter, TemplateDrafter };
use haggle::session::SessionStore;
use std::time::Duration;

#[tokio::test]
async fn test_generate_offer_then_close_with_deal() {
    let table = DiscountTable::default();
    let drafter = TemplateDrafter::seeded(TemplateSet::default(), 11, Duration::ZERO);
    let mut store = SessionStore::new();

    let id = store.create_session();
    store
        .update_session(&id, SessionUpdate {
            title: Some("2019 Honda Civic".to_string()),
            category: Some(Some(Category::Cars)),
            platform: Some("Craigslist".to_string()),
            original_price: Some(18000.0),
            max_budget: Some(Some(16000.0)),
            ..Default::default()
        })
        .expect("Should update session");

    let offer = calculate_counter_offer(18000.0, "Craigslist", "cars", &table).unwrap();
    assert!(offer > 0.0 && offer <= 18000.0);

    let message = drafter
        .draft(
            &(DraftRequest {
                title: "2019 Honda Civic".to_string(),
                original_price: 18000.0,
                offer_price: offer,
                platform: "Craigslist".to_string(),
                context: String::new(),
                category: "cars".to_string(),
            })
        ).await
        .expect("Should draft message");
    store.apply_offer(&id, offer, &message).unwrap();
    store.append_message(&id, MessageKind::Seller, "I could do $16,500.").unwrap();
    store.append_message(&id, MessageKind::User, "How about $15,500?").unwrap();

    let tab = store.get_session(&id).unwrap();
    assert_eq!(tab.messages.len(), 3);
    assert_eq!(tab.messages[0].content, message);
    assert_eq!(tab.latest_message().unwrap().content, "How about $15,500?");

    let report = store.close_session(&id, CloseOutcome::deal(15500.0)).unwrap();
    let deal = match report {
        CloseReport::Deal(deal) => deal,
        other => panic!("expected deal, got {:?}", other),
    };
    assert_eq!(deal.savings, 2500.0);
    assert_eq!(deal.savings_percentage, 14);
    assert_eq!(deal.title, "2019 Honda Civic");

    let stats = store.aggregate_stats();
    assert_eq!(stats.total_savings, 2500.0);
    assert_eq!(stats.total_deals, 1);
    assert_eq!(stats.average_savings, 2500.0);
    assert_eq!(stats.active_negotiations, 0);
}

#[test]
fn test_rejected_operations_leave_store_usable() {
    let mut store = SessionStore::new();
    let id = store.create_session();

    assert!(matches!(
        store.update_session("does-not-exist", SessionUpdate::default()),
        Err(HaggleError::NotFound(_))
    ));
    assert!(matches!(
        store.append_message("does-not-exist", MessageKind::User, "hi"),
        Err(HaggleError::NotFound(_))
    ));
    assert!(matches!(
        store.update_session(&id, SessionUpdate { current_offer: Some(f64::NAN), ..Default::default() }),
        Err(HaggleError::InvalidInput(_))
    ));

    store.append_message(&id, MessageKind::User, "still works").unwrap();
    assert_eq!(store.list_sessions(None).len(), 1);

    let report = store.close_session(&id, CloseOutcome::no_deal()).unwrap();
    assert!(matches!(report, CloseReport::NoDeal { .. }));
    assert_eq!(store.aggregate_stats().total_deals, 0);
}

#[test]
fn test_seeded_store_keeps_existing_deals() {
    let mut seed = SessionStore::new();
    let id = seed.create_session();
    seed
        .update_session(&id, SessionUpdate { original_price: Some(1200.0), ..Default::default() })
        .unwrap();
    seed.close_session(&id, CloseOutcome::deal(950.0)).unwrap();

    let store = SessionStore::with_state(Vec::new(), seed.completed_deals().to_vec());
    let stats = store.aggregate_stats();
    assert_eq!(stats.total_savings, 250.0);
    assert_eq!(stats.average_discount, 21);
}
