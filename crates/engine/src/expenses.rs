//! Expense primitives.
//!
//! An `Expense` is a shared cost. Who shares it is not stored on the expense
//! itself but in the `expense_participants` join table (see
//! [`participants`](crate::participants)).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Amount, EngineError, ResultEngine, util::parse_uuid};

/// Validated scalar fields of an expense.
///
/// Create and update both take a full set of fields: updates replace every
/// scalar value, there is no partial patch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseFields {
    pub name: String,
    pub amount: Amount,
    pub description: Option<String>,
    pub paid: bool,
}

impl ExpenseFields {
    /// Validates raw request fields.
    ///
    /// `name` must be present and non-blank, `amount` must be present and
    /// parse as a non-negative decimal with at most two fractional digits.
    /// A blank description is stored as `None`; a missing `paid` is `false`.
    pub fn parse(
        name: Option<&str>,
        amount: Option<&str>,
        description: Option<&str>,
        paid: Option<bool>,
    ) -> ResultEngine<Self> {
        let name = name
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| EngineError::Validation("expense name is required".to_string()))?;
        let amount: Amount = amount
            .ok_or_else(|| EngineError::Validation("expense amount is required".to_string()))?
            .parse()?;
        if amount.is_negative() {
            return Err(EngineError::Validation(
                "expense amount must not be negative".to_string(),
            ));
        }

        Ok(Self {
            name: name.to_string(),
            amount,
            description: description
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string),
            paid: paid.unwrap_or(false),
        })
    }
}

/// An expense together with its resolved participant list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub name: String,
    pub amount: Amount,
    pub description: Option<String>,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// User ids in link order, creator (or last updater) first.
    pub participants: Vec<String>,
}

impl Expense {
    pub fn is_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub paid: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::participants::Entity")]
    Participants,
}

impl Related<super::participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn from_fields(id: Uuid, fields: &ExpenseFields, now: DateTime<Utc>) -> Self {
        Self {
            id: ActiveValue::Set(id.to_string()),
            name: ActiveValue::Set(fields.name.clone()),
            amount_minor: ActiveValue::Set(fields.amount.cents()),
            description: ActiveValue::Set(fields.description.clone()),
            paid: ActiveValue::Set(fields.paid),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
    }

    /// Full replace of the scalar fields; `created_at` is left untouched.
    pub(crate) fn replace(id: Uuid, fields: &ExpenseFields, now: DateTime<Utc>) -> Self {
        Self {
            id: ActiveValue::Unchanged(id.to_string()),
            name: ActiveValue::Set(fields.name.clone()),
            amount_minor: ActiveValue::Set(fields.amount.cents()),
            description: ActiveValue::Set(fields.description.clone()),
            paid: ActiveValue::Set(fields.paid),
            created_at: ActiveValue::NotSet,
            updated_at: ActiveValue::Set(now),
        }
    }
}

impl Expense {
    pub(crate) fn from_model(model: Model, participants: Vec<String>) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            name: model.name,
            amount: Amount::new(model.amount_minor),
            description: model.description,
            paid: model.paid,
            created_at: model.created_at,
            updated_at: model.updated_at,
            participants,
        })
    }
}
