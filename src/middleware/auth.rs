use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Error, Result};
use crate::models::application::Application;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Candidate,
    Employer,
    Admin,
}

impl Role {
    fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(str::to_ascii_lowercase).as_deref() {
            None | Some("candidate") => Some(Role::Candidate),
            Some("employer") | Some("hr") => Some(Role::Employer),
            Some("admin") => Some(Role::Admin),
            Some(_) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::Employer => "employer",
            Role::Admin => "admin",
        }
    }
}

/// Authenticated caller, placed in request extensions by [`require_auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub role: Role,
}

impl Actor {
    pub fn is_staff(&self) -> bool {
        matches!(self.role, Role::Employer | Role::Admin)
    }

    pub fn require_staff(&self) -> Result<()> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(Error::PermissionDenied("Employer access required".to_string()))
        }
    }

    pub fn require_admin(&self) -> Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(Error::PermissionDenied("Admin access required".to_string()))
        }
    }

    /// Staff see every application; candidates only their own.
    pub fn require_view(&self, app: &Application) -> Result<()> {
        if self.is_staff() || app.is_owner(self.id) {
            Ok(())
        } else {
            Err(Error::PermissionDenied(format!(
                "Application {} belongs to another user",
                app.id
            )))
        }
    }
}

pub fn issue_token(secret: &str, user_id: i64, role: Role, ttl: Duration) -> Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now() + ttl).timestamp().max(0) as usize,
        role: Some(role.as_str().to_string()),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Failed to sign token: {}", e)))
}

fn unauthorized(code: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"error": code, "kind": "unauthorized"}))).into_response()
}

pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return unauthorized("missing_authorization");
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return unauthorized("bad_authorization");
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return unauthorized("unsupported_scheme");
    };

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let claims = match decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => data.claims,
        Err(e) => {
            tracing::debug!(error = %e, "rejected bearer token");
            return unauthorized("invalid_token");
        }
    };

    let (Ok(id), Some(role)) = (claims.sub.parse::<i64>(), Role::parse(claims.role.as_deref())) else {
        return unauthorized("invalid_claims");
    };
    req.extensions_mut().insert(Actor { id, role });
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::ApplicationStatus;
    use rust_decimal::Decimal;

    #[test]
    fn roles_parse_case_insensitively_and_default_to_candidate() {
        assert_eq!(Role::parse(None), Some(Role::Candidate));
        assert_eq!(Role::parse(Some("ADMIN")), Some(Role::Admin));
        assert_eq!(Role::parse(Some("hr")), Some(Role::Employer));
        assert_eq!(Role::parse(Some("guest")), None);
    }

    #[test]
    fn candidates_only_view_their_own_applications() {
        let now = Utc::now();
        let app = Application {
            id: 1,
            job_id: 1,
            user_id: 42,
            company_id: None,
            status: ApplicationStatus::Applied,
            match_score: Decimal::ZERO,
            source: "direct".to_string(),
            viewed_by_employer: false,
            is_bookmarked: false,
            applied_at: now,
            created_at: now,
            updated_at: now,
        };
        let owner = Actor { id: 42, role: Role::Candidate };
        let stranger = Actor { id: 7, role: Role::Candidate };
        let employer = Actor { id: 7, role: Role::Employer };

        assert!(owner.require_view(&app).is_ok());
        assert!(matches!(stranger.require_view(&app), Err(Error::PermissionDenied(_))));
        assert!(employer.require_view(&app).is_ok());
        assert!(employer.require_admin().is_err());
    }

    #[test]
    fn issued_tokens_decode_with_the_same_secret() {
        let token = issue_token("secret", 9, Role::Employer, Duration::minutes(5)).unwrap();
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(data.claims.sub, "9");
        assert_eq!(data.claims.role.as_deref(), Some("employer"));
    }
}
