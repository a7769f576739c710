//! Internal helpers for input validation and conversion.
//!
//! These utilities are **not** part of the public API.

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::Validation(format!("invalid {label} id")))
}

/// Builds a participant set: `forced` first, then `others` in order, each
/// user id kept only at its first occurrence.
///
/// Ids are trimmed; a blank id is rejected.
pub(crate) fn participant_set(forced: &str, others: &[String]) -> ResultEngine<Vec<String>> {
    let mut set: Vec<String> = Vec::with_capacity(others.len() + 1);
    for raw in std::iter::once(forced).chain(others.iter().map(String::as_str)) {
        let id = raw.trim();
        if id.is_empty() {
            return Err(EngineError::Validation(
                "participant id must not be empty".to_string(),
            ));
        }
        if !set.iter().any(|known| known == id) {
            set.push(id.to_string());
        }
    }
    Ok(set)
}
