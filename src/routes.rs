use actix_web::{get, http::StatusCode, post, put, web, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::balance::{compute_net_balances, pairwise_debts, validate_expense};
use crate::categories::category_totals;
use crate::error::{BalanceError, StoreError};
use crate::exchange::{settle_balances, SettlementConfig};
use crate::money::MoneyCents;
use crate::schemas::{DebtSummary, Expense, User};
use crate::store::ExpenseStore;

pub struct AppState {
    pub store: ExpenseStore,
    pub settlement: SettlementConfig,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Balance(#[from] BalanceError),
    #[error("{0}")]
    InvalidExpense(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::GroupNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::ExistingGroup(_)) => StatusCode::CONFLICT,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Balance(_) | Self::InvalidExpense(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        } else {
            tracing::debug!("request rejected: {self}");
        }
        HttpResponse::build(status).json(json!({ "error": self.to_string() }))
    }
}

#[derive(Deserialize, Serialize)]
struct GroupNameJson {
    name: String,
}

/// A money amount as cents plus its display string.
#[derive(Debug, Serialize, Deserialize)]
pub struct AmountView {
    pub cents: MoneyCents,
    pub display: String,
}

impl From<MoneyCents> for AmountView {
    fn from(amount: MoneyCents) -> Self {
        Self {
            cents: amount,
            display: amount.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceView {
    pub user: User,
    pub net: AmountView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DebtView {
    pub from_user: User,
    pub to_user: User,
    pub amount: AmountView,
}

impl From<DebtSummary> for DebtView {
    fn from(debt: DebtSummary) -> Self {
        Self {
            from_user: debt.from_user,
            to_user: debt.to_user,
            amount: debt.amount.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DebtsView {
    #[default]
    Simplified,
    Pairwise,
}

#[derive(Debug, Deserialize)]
pub struct DebtsQuery {
    #[serde(default)]
    view: DebtsView,
}

#[get("/groups")]
async fn list_groups(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let groups = state.store.list_groups().await?;
    Ok(HttpResponse::Ok().json(groups))
}

#[put("/groups/{id}")]
async fn add_group(
    state: web::Data<AppState>,
    id: web::Path<String>,
    json: web::Json<GroupNameJson>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    state
        .store
        .create_group(&id, &json.into_inner().name)
        .await?;
    tracing::info!(group = %id, "group added");
    Ok(HttpResponse::Ok().body("Group added"))
}

#[post("/groups/{id}/expenses")]
async fn add_expense(
    state: web::Data<AppState>,
    id: web::Path<String>,
    expense: web::Json<Expense>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let expense = expense.into_inner();
    validate_expense(0, &expense).map_err(|err| match err {
        BalanceError::NegativePrice { .. } => {
            ApiError::InvalidExpense("expense has a negative price".to_string())
        }
        BalanceError::NegativeSplit { user_id, .. } => ApiError::InvalidExpense(format!(
            "expense assigns a negative share to \"{user_id}\""
        )),
        other => ApiError::Balance(other),
    })?;
    state.store.add_expense(&id, expense).await?;
    tracing::info!(group = %id, "expense added");
    Ok(HttpResponse::Ok().body("Expense added"))
}

#[get("/groups/{id}/expenses")]
async fn get_expenses(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let expenses = state.store.fetch_expenses(&id).await?;
    Ok(HttpResponse::Ok().json(expenses))
}

#[get("/groups/{id}/balance")]
async fn get_balance(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let expenses = state.store.fetch_expenses(&id).await?;
    let balances = compute_net_balances(&expenses)?;
    let view: Vec<BalanceView> = balances
        .iter()
        .map(|balance| BalanceView {
            user: balance.user.clone(),
            net: balance.net.into(),
        })
        .collect();
    Ok(HttpResponse::Ok().json(view))
}

#[get("/groups/{id}/debts")]
async fn get_debts(
    state: web::Data<AppState>,
    id: web::Path<String>,
    query: web::Query<DebtsQuery>,
) -> Result<HttpResponse, ApiError> {
    let expenses = state.store.fetch_expenses(&id).await?;
    let debts = match query.view {
        DebtsView::Simplified => {
            let balances = compute_net_balances(&expenses)?;
            settle_balances(&balances, &state.settlement)
        }
        DebtsView::Pairwise => pairwise_debts(&expenses)?,
    };
    tracing::debug!(group = %id, view = ?query.view, count = debts.len(), "debts computed");
    let view: Vec<DebtView> = debts.into_iter().map(DebtView::from).collect();
    Ok(HttpResponse::Ok().json(view))
}

#[get("/groups/{id}/categories")]
async fn get_categories(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let expenses = state.store.fetch_expenses(&id).await?;
    let totals = category_totals(&expenses)?;
    Ok(HttpResponse::Ok().json(totals))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_groups)
        .service(add_group)
        .service(add_expense)
        .service(get_expenses)
        .service(get_balance)
        .service(get_debts)
        .service(get_categories);
}
