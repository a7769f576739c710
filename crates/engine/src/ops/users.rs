use std::collections::HashMap;

use sea_orm::{QueryFilter, QueryOrder, prelude::*, sea_query::OnConflict};

use crate::{EngineError, ResultEngine, UserProfile, users};

use super::Engine;

impl Engine {
    /// Inserts a user or replaces its names.
    ///
    /// This is the sink for the identity provider's `user.created` events, so
    /// a re-delivered event must not fail.
    pub async fn upsert_user(&self, profile: UserProfile) -> ResultEngine<()> {
        if profile.id.trim().is_empty() {
            return Err(EngineError::Validation("user id must not be empty".to_string()));
        }
        users::Entity::insert(users::ActiveModel::from(&profile))
            .on_conflict(
                OnConflict::column(users::Column::Id)
                    .update_columns([users::Column::FirstName, users::Column::LastName])
                    .to_owned(),
            )
            .exec_without_returning(&self.database)
            .await?;
        Ok(())
    }

    /// Returns a user, if the directory knows it.
    pub async fn user(&self, user_id: &str) -> ResultEngine<Option<UserProfile>> {
        Ok(users::Entity::find_by_id(user_id.to_string())
            .one(&self.database)
            .await?
            .map(UserProfile::from))
    }

    /// Returns the known users among `user_ids`, keyed by id. Unknown ids are
    /// simply absent from the map.
    pub async fn users_by_ids(
        &self,
        user_ids: &[String],
    ) -> ResultEngine<HashMap<String, UserProfile>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids.iter().cloned()))
            .all(&self.database)
            .await?;
        Ok(rows
            .into_iter()
            .map(|model| (model.id.clone(), UserProfile::from(model)))
            .collect())
    }

    /// Lists the whole directory, ordered by id.
    pub async fn list_users(&self) -> ResultEngine<Vec<UserProfile>> {
        Ok(users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(UserProfile::from)
            .collect())
    }
}
