use serde::{Deserialize, Serialize};

use crate::api::errors::TodoApiError;

/// Body of create and edit requests
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TodoTitleDTO {
    #[serde(default)]
    pub title: Option<String>,
}

impl TodoTitleDTO {
    /// Trimmed title, rejecting a missing or blank one
    pub fn into_title(self) -> Result<String, TodoApiError> {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => Ok(title.to_string()),
            _ => Err(TodoApiError::BadRequest(String::from(
                "Todo title must not be empty",
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListTodosQuery {
    pub filter: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearCompletedDTO {
    pub deleted_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(json: &str) -> TodoTitleDTO {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn title_is_trimmed() {
        assert_eq!(dto(r#"{"title":"  buy milk "}"#).into_title().unwrap(), "buy milk");
    }

    #[test]
    fn missing_title_is_rejected() {
        assert!(dto("{}").into_title().is_err());
        assert!(dto(r#"{"title":null}"#).into_title().is_err());
    }

    #[test]
    fn blank_title_is_rejected() {
        assert!(dto(r#"{"title":""}"#).into_title().is_err());
        assert!(dto(r#"{"title":" \t\n"}"#).into_title().is_err());
    }
}
