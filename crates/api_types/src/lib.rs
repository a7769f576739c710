use serde::{Deserialize, Serialize};

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// `{ "success": true }` acknowledgement.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

pub mod expense {
    use super::*;

    /// A decimal amount as sent by clients: either a JSON number (`12.5`) or
    /// a string (`"12.50"`, `"12,50"`).
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum AmountInput {
        Number(serde_json::Number),
        Text(String),
    }

    impl AmountInput {
        /// Decimal text handed to the engine's amount parser.
        pub fn as_decimal_text(&self) -> String {
            match self {
                Self::Number(n) => n.to_string(),
                Self::Text(s) => s.clone(),
            }
        }
    }

    /// Body of `POST /expenses`.
    ///
    /// Every field is optional at the wire level so that missing values are
    /// reported as validation errors rather than parse failures.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct ExpenseNew {
        pub name: Option<String>,
        pub amount: Option<AmountInput>,
        pub description: Option<String>,
        pub paid: Option<bool>,
        pub participant_ids: Option<Vec<String>>,
    }

    /// Body of `PUT /expenses`: a full replacement, participants included.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct ExpenseUpdate {
        pub id: Option<String>,
        pub name: Option<String>,
        pub amount: Option<AmountInput>,
        pub description: Option<String>,
        pub paid: Option<bool>,
        pub participant_ids: Option<Vec<String>>,
    }

    /// Body of `DELETE /expenses`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ExpenseDelete {
        pub id: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ParticipantView {
        pub user_id: String,
        /// Display name, or the raw user id when the directory has no name.
        pub name: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseView {
        pub id: String,
        pub name: String,
        /// Decimal string with two fractional digits, e.g. `"12.50"`.
        pub amount: String,
        pub description: Option<String>,
        pub paid: bool,
        pub participant_ids: Vec<String>,
        pub users: Vec<ParticipantView>,
    }
}

pub mod user {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserView {
        pub id: String,
        pub first_name: String,
        pub last_name: String,
    }

    /// Identity-provider event, e.g. `{"type": "user.created", "data": {...}}`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserEvent {
        #[serde(rename = "type")]
        pub kind: String,
        pub data: Option<UserEventData>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserEventData {
        pub id: String,
        #[serde(default, alias = "firstName")]
        pub first_name: Option<String>,
        #[serde(default, alias = "lastName")]
        pub last_name: Option<String>,
    }
}
