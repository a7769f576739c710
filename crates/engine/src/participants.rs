//! Participant links: the join table between users and expenses.
//!
//! A row `(expense_id, user_id)` means "user participates in expense". The
//! composite primary key keeps the pair unique; `position` remembers the order
//! in which the participant set was given.

use sea_orm::{ActiveValue, entity::prelude::*};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_participants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub expense_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Builds one link per user id, numbering them in the given order.
pub(crate) fn links_for(expense_id: &str, user_ids: &[String]) -> Vec<ActiveModel> {
    user_ids
        .iter()
        .zip(0..)
        .map(|(user_id, position)| ActiveModel {
            expense_id: ActiveValue::Set(expense_id.to_string()),
            user_id: ActiveValue::Set(user_id.clone()),
            position: ActiveValue::Set(position),
        })
        .collect()
}
