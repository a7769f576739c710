use sea_orm::{DatabaseTransaction, prelude::*};

use crate::{EngineError, ResultEngine, participants};

use super::Engine;

impl Engine {
    pub(super) async fn is_participant(
        &self,
        db: &DatabaseTransaction,
        expense_id: &str,
        user_id: &str,
    ) -> ResultEngine<bool> {
        participants::Entity::find_by_id((expense_id.to_string(), user_id.to_string()))
            .one(db)
            .await
            .map(|link| link.is_some())
            .map_err(Into::into)
    }

    /// Participation is the only ownership there is: any linked user may
    /// change the expense.
    pub(super) async fn require_participant(
        &self,
        db: &DatabaseTransaction,
        expense_id: &str,
        user_id: &str,
    ) -> ResultEngine<()> {
        if !self.is_participant(db, expense_id, user_id).await? {
            return Err(EngineError::Forbidden(
                "not a participant of this expense".to_string(),
            ));
        }
        Ok(())
    }
}
