use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    DatabaseTransaction, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Expense, ExpenseFields, ResultEngine, expenses, participants, util::participant_set,
};

use super::{Engine, with_tx};

/// What happened when a user left an expense.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The user had no link to the expense; nothing changed.
    NotParticipant,
    /// The user's link was removed, other participants remain.
    Left,
    /// The user was the last participant: the expense is gone.
    Removed,
}

impl Engine {
    /// Creates an expense and its participant links.
    ///
    /// The creator always ends up in the participant set, first, and every
    /// user id appears once.
    pub async fn create_expense(
        &self,
        creator_id: &str,
        fields: ExpenseFields,
        participant_ids: &[String],
    ) -> ResultEngine<Expense> {
        let participants = participant_set(creator_id, participant_ids)?;
        let expense_id = Uuid::new_v4();
        with_tx!(self, |db_tx| {
            let model = expenses::ActiveModel::from_fields(expense_id, &fields, Utc::now())
                .insert(&db_tx)
                .await?;
            self.replace_links(&db_tx, &model.id, &participants).await?;
            Expense::from_model(model, participants)
        })
    }

    /// Lists every expense `user_id` participates in, each with its full
    /// participant list, oldest first.
    pub async fn list_expenses(&self, user_id: &str) -> ResultEngine<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            let models = expenses::Entity::find()
                .join(JoinType::InnerJoin, expenses::Relation::Participants.def())
                .filter(participants::Column::UserId.eq(user_id))
                .order_by_asc(expenses::Column::CreatedAt)
                .order_by_asc(expenses::Column::Id)
                .all(&db_tx)
                .await?;

            let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
            let mut links = self.participants_of(&db_tx, &ids).await?;
            models
                .into_iter()
                .map(|model| {
                    let participants = links.remove(&model.id).unwrap_or_default();
                    Expense::from_model(model, participants)
                })
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Replaces the scalar fields and the whole participant set of an
    /// expense.
    ///
    /// Only a participant may update. The old links are dropped and the new
    /// set (requester first, deduplicated) is written in the same
    /// transaction, so no link from the previous set survives unless it is
    /// listed again.
    pub async fn update_expense(
        &self,
        expense_id: Uuid,
        requester_id: &str,
        fields: ExpenseFields,
        participant_ids: &[String],
    ) -> ResultEngine<Expense> {
        let participants = participant_set(requester_id, participant_ids)?;
        let id = expense_id.to_string();
        with_tx!(self, |db_tx| {
            self.require_participant(&db_tx, &id, requester_id).await?;

            let model = expenses::ActiveModel::replace(expense_id, &fields, Utc::now())
                .update(&db_tx)
                .await?;
            self.replace_links(&db_tx, &id, &participants).await?;
            Expense::from_model(model, participants)
        })
    }

    /// Removes the requester's own link to an expense.
    ///
    /// When no participant is left the expense is deleted as well. A user
    /// without a link gets [`LeaveOutcome::NotParticipant`] and nothing is
    /// touched.
    pub async fn leave_expense(
        &self,
        expense_id: Uuid,
        requester_id: &str,
    ) -> ResultEngine<LeaveOutcome> {
        let id = expense_id.to_string();
        with_tx!(self, |db_tx| {
            let removed =
                participants::Entity::delete_by_id((id.clone(), requester_id.to_string()))
                    .exec(&db_tx)
                    .await?;

            let outcome = if removed.rows_affected == 0 {
                LeaveOutcome::NotParticipant
            } else {
                let remaining = participants::Entity::find()
                    .filter(participants::Column::ExpenseId.eq(id.as_str()))
                    .count(&db_tx)
                    .await?;
                if remaining == 0 {
                    expenses::Entity::delete_by_id(id.clone())
                        .exec(&db_tx)
                        .await?;
                    LeaveOutcome::Removed
                } else {
                    LeaveOutcome::Left
                }
            };
            ResultEngine::Ok(outcome)
        })
    }

    /// Drops every link of `expense_id` and writes `user_ids` as the new set.
    async fn replace_links(
        &self,
        db: &DatabaseTransaction,
        expense_id: &str,
        user_ids: &[String],
    ) -> ResultEngine<()> {
        participants::Entity::delete_many()
            .filter(participants::Column::ExpenseId.eq(expense_id))
            .exec(db)
            .await?;
        participants::Entity::insert_many(participants::links_for(expense_id, user_ids))
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    async fn participants_of(
        &self,
        db: &DatabaseTransaction,
        expense_ids: &[String],
    ) -> ResultEngine<HashMap<String, Vec<String>>> {
        let rows = participants::Entity::find()
            .filter(participants::Column::ExpenseId.is_in(expense_ids.iter().cloned()))
            .order_by_asc(participants::Column::ExpenseId)
            .order_by_asc(participants::Column::Position)
            .all(db)
            .await?;

        let mut out: HashMap<String, Vec<String>> = HashMap::new();
        for row in rows {
            out.entry(row.expense_id).or_default().push(row.user_id);
        }
        Ok(out)
    }
}
