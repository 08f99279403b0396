use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default, deserialize_with = "lenient_points")]
    pub current_local_points: u64,
    #[serde(default, deserialize_with = "lenient_points")]
    pub current_global_points: u64,
}

impl User {
    pub fn total(&self) -> u64 {
        self.current_local_points
            .saturating_add(self.current_global_points)
    }

    pub fn icon_filename(&self) -> String {
        format!("{}.png", self.username.to_lowercase())
    }
}

/// Coerces whatever the sheet returned for a point column into a
/// non-negative integer. Missing, null, negative and non-numeric values
/// all read as zero.
fn lenient_points<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(points_from_value).unwrap_or(0))
}

fn points_from_value(value: &serde_json::Value) -> u64 {
    match value {
        serde_json::Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                v
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f > 0.0 => f.trunc() as u64,
                    _ => 0,
                }
            }
        }
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<u64>()
                .ok()
                .or_else(|| {
                    trimmed
                        .parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && *f > 0.0)
                        .map(|f| f.trunc() as u64)
                })
                .unwrap_or(0)
        }
        _ => 0,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub password: String,
    pub logged_in_user: String,
    pub users_data: Vec<User>,
    pub timestamp: i64,
}

impl Session {
    pub fn find_user(&self, username: &str) -> Option<&User> {
        self.users_data.iter().find(|u| u.username == username)
    }

    pub fn find_user_mut(&mut self, username: &str) -> Option<&mut User> {
        self.users_data.iter_mut().find(|u| u.username == username)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Add,
    Redeem,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::Add => "Add",
            Direction::Redeem => "Redeem",
        }
    }
}

/// A checked adjustment, ready to be sent as absolute totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAdjustment {
    pub username: String,
    pub reason: String,
    pub delta_local: u64,
    pub delta_global: u64,
    pub direction: Direction,
    pub new_local: u64,
    pub new_global: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateRequest {
    pub password: String,
    pub updated_by: String,
    pub user_affected: String,
    pub reason: String,
    pub new_local: u64,
    pub new_global: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateResponse {
    pub status: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub status: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("error") || self.error.is_some()
    }

    pub fn text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .or(self.error.as_deref().filter(|e| !e.is_empty()))
    }

    pub fn is_invalid_password(&self) -> bool {
        [self.message.as_deref(), self.error.as_deref()]
            .into_iter()
            .flatten()
            .any(|text| text.to_lowercase().contains("invalid password"))
    }
}

/// Body of a balance fetch: either the user list or an error object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FetchResponse {
    Users(Vec<User>),
    Failure(ErrorBody),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdjustRequest {
    pub username: String,
    pub direction: Direction,
    pub local: String,
    pub global: String,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdjustForm {
    #[serde(default)]
    pub local: String,
    #[serde(default)]
    pub global: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserCard {
    pub username: String,
    pub local: u64,
    pub global: u64,
    pub total: u64,
    pub icon: String,
}

impl From<&User> for UserCard {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            local: user.current_local_points,
            global: user.current_global_points,
            total: user.total(),
            icon: format!("/icons/{}", urlencoding::encode(&user.icon_filename())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateResponse {
    pub view: String,
    pub message: Option<String>,
    pub notice: Option<String>,
    pub logged_in_user: Option<String>,
    pub users: Vec<UserCard>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_null_points_read_as_zero() {
        let users: Vec<User> = serde_json::from_str(
            r#"[{"username":"rose"},{"username":"lily","current_local_points":null,"current_global_points":4}]"#,
        )
        .unwrap();
        assert_eq!(users[0].current_local_points, 0);
        assert_eq!(users[0].current_global_points, 0);
        assert_eq!(users[1].current_local_points, 0);
        assert_eq!(users[1].current_global_points, 4);
    }

    #[test]
    fn odd_point_values_are_normalised() {
        let user: User = serde_json::from_str(
            r#"{"username":"rose","current_local_points":"12","current_global_points":-3}"#,
        )
        .unwrap();
        assert_eq!(user.current_local_points, 12);
        assert_eq!(user.current_global_points, 0);

        let user: User = serde_json::from_str(
            r#"{"username":"rose","current_local_points":7.9,"current_global_points":"abc"}"#,
        )
        .unwrap();
        assert_eq!(user.current_local_points, 7);
        assert_eq!(user.current_global_points, 0);
    }

    #[test]
    fn total_and_icon() {
        let user = User {
            username: "Rose".into(),
            current_local_points: 10,
            current_global_points: 5,
        };
        assert_eq!(user.total(), 15);
        assert_eq!(user.icon_filename(), "rose.png");
    }

    #[test]
    fn session_uses_stored_field_names() {
        let session = Session {
            password: "pw".into(),
            logged_in_user: "rose".into(),
            users_data: vec![],
            timestamp: 1_700_000_000_000,
        };
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["loggedInUser"], "rose");
        assert!(value["usersData"].is_array());
        assert_eq!(value["timestamp"], 1_700_000_000_000i64);
    }

    #[test]
    fn fetch_response_distinguishes_users_from_errors() {
        let ok: FetchResponse =
            serde_json::from_str(r#"[{"username":"rose","current_local_points":1}]"#).unwrap();
        assert!(matches!(ok, FetchResponse::Users(ref u) if u.len() == 1));

        let err: FetchResponse =
            serde_json::from_str(r#"{"status":"error","message":"Invalid Password"}"#).unwrap();
        match err {
            FetchResponse::Failure(body) => {
                assert!(body.is_error());
                assert!(body.is_invalid_password());
                assert_eq!(body.text(), Some("Invalid Password"));
            }
            FetchResponse::Users(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn error_field_alone_is_an_error() {
        let body: ErrorBody = serde_json::from_str(r#"{"error":"sheet locked"}"#).unwrap();
        assert!(body.is_error());
        assert!(!body.is_invalid_password());
        assert_eq!(body.text(), Some("sheet locked"));
    }
}
