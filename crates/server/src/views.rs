//! Shapes engine records into API views.
//!
//! Display names are joined from a directory snapshot taken for the current
//! request, never stored on the expense.

use std::collections::HashMap;

use api_types::{
    expense::{ExpenseView, ParticipantView},
    user::UserView,
};
use engine::{Expense, UserProfile};

pub(crate) type Directory = HashMap<String, UserProfile>;

fn display_name(user_id: &str, directory: &Directory) -> String {
    directory
        .get(user_id)
        .and_then(UserProfile::display_name)
        .unwrap_or_else(|| user_id.to_string())
}

pub(crate) fn expense_view(expense: Expense, directory: &Directory) -> ExpenseView {
    let users = expense
        .participants
        .iter()
        .map(|user_id| ParticipantView {
            user_id: user_id.clone(),
            name: display_name(user_id, directory),
        })
        .collect();

    ExpenseView {
        id: expense.id.to_string(),
        name: expense.name,
        amount: expense.amount.to_string(),
        description: expense.description,
        paid: expense.paid,
        participant_ids: expense.participants,
        users,
    }
}

pub(crate) fn user_view(user: UserProfile) -> UserView {
    UserView {
        id: user.id,
        first_name: user.first_name,
        last_name: user.last_name,
    }
}
