use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};

use opensplit::routes::{self, AppState, BalanceView, DebtView};
use opensplit::store::{ExpenseStore, MemoryStore};
use opensplit::SettlementConfig;

fn state(store: MemoryStore) -> web::Data<AppState> {
    web::Data::new(AppState {
        store: ExpenseStore::Memory(store),
        settlement: SettlementConfig::default(),
    })
}

fn person(id: &str) -> Value {
    json!({ "user_id": id, "name": id.to_uppercase(), "profile_image": "" })
}

#[actix_web::test]
async fn group_lifecycle_and_debts() {
    let app = test::init_service(
        App::new()
            .app_data(state(MemoryStore::new()))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::put()
        .uri("/groups/trip")
        .set_json(json!({ "name": "Trip" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::put()
        .uri("/groups/trip")
        .set_json(json!({ "name": "Trip again" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CONFLICT
    );

    let expense = json!({
        "title": "Dinner",
        "category": "food",
        "price": 9000,
        "paid_by": person("a"),
        "split_details": [
            { "user": person("a"), "amount": 3000 },
            { "user": person("b"), "amount": 3000 },
            { "user": person("c"), "amount": 3000 }
        ]
    });
    let req = test::TestRequest::post()
        .uri("/groups/trip/expenses")
        .set_json(&expense)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/groups/trip/balance")
        .to_request();
    let balances: Vec<BalanceView> = test::call_and_read_body_json(&app, req).await;
    let balances: Vec<(String, i64, String)> = balances
        .into_iter()
        .map(|b| (b.user.user_id, b.net.cents.cents(), b.net.display))
        .collect();
    assert_eq!(
        balances,
        vec![
            ("a".to_string(), 6000, "60".to_string()),
            ("b".to_string(), -3000, "-30".to_string()),
            ("c".to_string(), -3000, "-30".to_string()),
        ]
    );

    let req = test::TestRequest::get().uri("/groups/trip/debts").to_request();
    let debts: Vec<DebtView> = test::call_and_read_body_json(&app, req).await;
    let debts: Vec<(String, String, String)> = debts
        .into_iter()
        .map(|d| (d.from_user.user_id, d.to_user.user_id, d.amount.display))
        .collect();
    assert_eq!(
        debts,
        vec![
            ("b".to_string(), "a".to_string(), "30".to_string()),
            ("c".to_string(), "a".to_string(), "30".to_string()),
        ]
    );

    let req = test::TestRequest::get()
        .uri("/groups/trip/categories")
        .to_request();
    let totals: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        totals,
        json!([{ "category": "food", "total": 9000, "expense_count": 1 }])
    );

    let req = test::TestRequest::get().uri("/groups").to_request();
    let groups: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        groups,
        json!([{ "id": "trip", "name": "Trip", "expense_count": 1 }])
    );
}

#[actix_web::test]
async fn pairwise_view_skips_simplification() {
    let app = test::init_service(
        App::new()
            .app_data(state(MemoryStore::new()))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::put()
        .uri("/groups/chain")
        .set_json(json!({ "name": "Chain" }))
        .to_request();
    test::call_service(&app, req).await;

    // a pays for b, b pays for c: simplified, c pays a directly.
    for (payer, splitter) in [("a", "b"), ("b", "c")] {
        let req = test::TestRequest::post()
            .uri("/groups/chain/expenses")
            .set_json(json!({
                "price": 1000,
                "paid_by": person(payer),
                "split_details": [{ "user": person(splitter), "amount": 1000 }]
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri("/groups/chain/debts")
        .to_request();
    let simplified: Vec<DebtView> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(simplified.len(), 1);
    assert_eq!(simplified[0].from_user.user_id, "c");
    assert_eq!(simplified[0].to_user.user_id, "a");

    let req = test::TestRequest::get()
        .uri("/groups/chain/debts?view=pairwise")
        .to_request();
    let pairwise: Vec<DebtView> = test::call_and_read_body_json(&app, req).await;
    let pairs: Vec<(&str, &str)> = pairwise
        .iter()
        .map(|d| (d.from_user.user_id.as_str(), d.to_user.user_id.as_str()))
        .collect();
    assert_eq!(pairs, vec![("b", "a"), ("c", "b")]);
}

#[actix_web::test]
async fn bad_input_and_missing_groups() {
    let app = test::init_service(
        App::new()
            .app_data(state(MemoryStore::with_sample_data()))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/groups/unknown/debts")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "\"unknown\" group not found" }));

    let req = test::TestRequest::post()
        .uri("/groups/demo/expenses")
        .set_json(json!({
            "price": -5,
            "paid_by": person("alice"),
            "split_details": []
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "expense has a negative price" }));

    let req = test::TestRequest::post()
        .uri("/groups/demo/expenses")
        .set_json(json!({
            "price": 100,
            "paid_by": person("alice"),
            "split_details": [{ "user": person("bob"), "amount": -100 }]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({ "error": "expense assigns a negative share to \"bob\"" })
    );

    let req = test::TestRequest::get()
        .uri("/groups/demo/expenses")
        .to_request();
    let expenses: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(expenses.as_array().map(Vec::len), Some(3));
}

#[actix_web::test]
async fn sample_group_settles() {
    let app = test::init_service(
        App::new()
            .app_data(state(MemoryStore::with_sample_data()))
            .configure(routes::configure),
    )
    .await;

    // Groceries 90 (a, b, c), cinema 45.50 (a, b), taxi 30 (a, b, c):
    // alice +60 -22.75 -10 = 27.25, bob -30 +22.75 -10 = -17.25,
    // carol -30 +20 = -10.
    let req = test::TestRequest::get().uri("/groups/demo/debts").to_request();
    let debts: Vec<DebtView> = test::call_and_read_body_json(&app, req).await;
    let debts: Vec<(String, String, i64)> = debts
        .into_iter()
        .map(|d| (d.from_user.user_id, d.to_user.user_id, d.amount.cents.cents()))
        .collect();
    assert_eq!(
        debts,
        vec![
            ("bob".to_string(), "alice".to_string(), 1725),
            ("carol".to_string(), "alice".to_string(), 1000),
        ]
    );
}
