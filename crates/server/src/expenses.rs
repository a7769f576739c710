//! Expenses API endpoints.
//!
//! All routes sit behind the identity middleware, so a [`Caller`] is always
//! present. Authorization beyond that (participant checks) is done by the
//! engine inside the same transaction as the write.

use api_types::{
    Success,
    expense::{AmountInput, ExpenseDelete, ExpenseNew, ExpenseUpdate, ExpenseView},
};
use axum::{Extension, Json, extract::State};
use axum_extra::extract::WithRejection;
use engine::{EngineError, Expense, ExpenseFields, LeaveOutcome};
use uuid::Uuid;

use crate::{
    ServerError,
    server::{Caller, ServerState},
    views::expense_view,
};

fn parse_fields(
    name: Option<String>,
    amount: Option<AmountInput>,
    description: Option<String>,
    paid: Option<bool>,
) -> Result<ExpenseFields, ServerError> {
    let amount = amount.map(|a| a.as_decimal_text());
    Ok(ExpenseFields::parse(
        name.as_deref(),
        amount.as_deref(),
        description.as_deref(),
        paid,
    )?)
}

fn parse_expense_id(id: Option<String>) -> Result<Uuid, ServerError> {
    let id = id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ServerError::BadRequest("expense id is required".to_string()))?;
    Uuid::parse_str(id).map_err(|_| ServerError::BadRequest(format!("invalid expense id: {id}")))
}

/// Errors caused by the caller's request. Database failures are logged
/// where they are turned into a response.
fn is_caller_rejection(err: &EngineError) -> bool {
    matches!(err, EngineError::Forbidden(_) | EngineError::Validation(_))
}

async fn present(state: &ServerState, expense: Expense) -> Result<ExpenseView, ServerError> {
    let directory = state.engine.users_by_ids(&expense.participants).await?;
    Ok(expense_view(expense, &directory))
}

pub async fn create(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<ExpenseNew>, ServerError>,
) -> Result<Json<ExpenseView>, ServerError> {
    let fields = parse_fields(
        payload.name,
        payload.amount,
        payload.description,
        payload.paid,
    )?;
    let participant_ids = payload.participant_ids.unwrap_or_default();

    let expense = state
        .engine
        .create_expense(&caller.0, fields, &participant_ids)
        .await?;
    tracing::info!(
        "expense {} created by {} with {} participant(s)",
        expense.id,
        caller.0,
        expense.participants.len()
    );

    Ok(Json(present(&state, expense).await?))
}

pub async fn list(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let expenses = state.engine.list_expenses(&caller.0).await?;

    let mut user_ids: Vec<String> = expenses
        .iter()
        .flat_map(|e| e.participants.iter().cloned())
        .collect();
    user_ids.sort();
    user_ids.dedup();
    let directory = state.engine.users_by_ids(&user_ids).await?;

    Ok(Json(
        expenses
            .into_iter()
            .map(|expense| expense_view(expense, &directory))
            .collect(),
    ))
}

pub async fn update(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<ExpenseUpdate>, ServerError>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense_id = parse_expense_id(payload.id)?;
    let fields = parse_fields(
        payload.name,
        payload.amount,
        payload.description,
        payload.paid,
    )?;
    let participant_ids = payload.participant_ids.unwrap_or_default();

    let expense = match state
        .engine
        .update_expense(expense_id, &caller.0, fields, &participant_ids)
        .await
    {
        Ok(expense) => expense,
        Err(err) => {
            if is_caller_rejection(&err) {
                tracing::warn!("update of expense {expense_id} by {} rejected: {err}", caller.0);
            }
            return Err(err.into());
        }
    };
    tracing::info!("expense {} updated by {}", expense.id, caller.0);

    Ok(Json(present(&state, expense).await?))
}

pub async fn delete(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<ExpenseDelete>, ServerError>,
) -> Result<Json<Success>, ServerError> {
    let expense_id = parse_expense_id(payload.id)?;

    match state.engine.leave_expense(expense_id, &caller.0).await? {
        LeaveOutcome::NotParticipant => {
            tracing::debug!("{} is not a participant of expense {expense_id}", caller.0)
        }
        LeaveOutcome::Left => tracing::info!("{} left expense {expense_id}", caller.0),
        LeaveOutcome::Removed => {
            tracing::info!("expense {expense_id} removed, {} was the last participant", caller.0)
        }
    }

    Ok(Json(Success::ok()))
}
