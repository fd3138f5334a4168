use serde::{Deserialize, Serialize};

/// Owner identity passed explicitly by the caller as a query parameter.
#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<i64>,
}

/// Request body for creating a task. Description defaults to empty.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "userId")]
    pub user_id: Option<i64>,
}

/// Request body for updating a task. All fields are replaced.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "userId")]
    pub user_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_defaults_description_to_empty() {
        let payload: CreateTaskRequest =
            serde_json::from_str(r#"{"title": "Buy milk", "userId": 1}"#).unwrap();
        assert_eq!(payload.title, "Buy milk");
        assert_eq!(payload.description, "");
        assert_eq!(payload.user_id, Some(1));
    }

    #[test]
    fn create_request_tolerates_missing_user_id() {
        let payload: CreateTaskRequest = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(payload.user_id, None);
    }

    #[test]
    fn owner_query_uses_camel_case_key() {
        let q: OwnerQuery = serde_json::from_str(r#"{"userId": 7}"#).unwrap();
        assert_eq!(q.user_id, Some(7));
    }
}
