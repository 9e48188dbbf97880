use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const GENERIC_SERVER_ERROR: &str = "An error occurred.";

/// Validation errors reported by the server in a `success: false` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("server rejected request: {}", .errors.join("; "))]
pub struct ServerRejection {
    pub errors: Vec<String>,
}

impl ServerRejection {
    pub fn new(errors: Vec<String>) -> Self {
        Self { errors }
    }

    /// Messages to surface, one per error. A rejection without any message
    /// still yields a generic one so the failure is never silent.
    pub fn messages(&self) -> Vec<String> {
        let messages: Vec<String> = self
            .errors
            .iter()
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .collect();
        if messages.is_empty() {
            vec![GENERIC_SERVER_ERROR.to_string()]
        } else {
            messages
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rejection_falls_back_to_generic_message() {
        let rejection = ServerRejection::new(vec![" ".into()]);
        assert_eq!(rejection.messages(), vec![GENERIC_SERVER_ERROR.to_string()]);
    }

    #[test]
    fn rejection_keeps_messages_verbatim_and_in_order() {
        let rejection = ServerRejection::new(vec![
            "Name should only contain letters and spaces.".into(),
            "Marks should be between 0 and 100.".into(),
        ]);
        assert_eq!(
            rejection.messages(),
            vec![
                "Name should only contain letters and spaces.".to_string(),
                "Marks should be between 0 and 100.".to_string(),
            ]
        );
        assert!(rejection.to_string().contains("letters and spaces"));
    }
}
