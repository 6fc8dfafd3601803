use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, Message, PublicUser, RegisterRequest},
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        repo::User,
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(get_me))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            avatar_url: user.avatar_url,
            bio: user.bio,
            created_at: user.created_at,
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Message>), (StatusCode, String)> {
    payload.email = payload.email.trim().to_lowercase();
    payload.username = payload.username.trim().to_string();

    if payload.username.is_empty() {
        warn!("empty username");
        return Err((StatusCode::BAD_REQUEST, "Username is required".into()));
    }

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    if payload.password.len() < 8 {
        warn!("password too short");
        return Err((StatusCode::BAD_REQUEST, "Password too short".into()));
    }

    // Ensure email is not taken
    if let Ok(Some(_)) = User::find_by_email(&state.db, &payload.email).await {
        warn!(email = %payload.email, "email already registered");
        return Err((StatusCode::CONFLICT, "Email already registered".into()));
    }

    if let Ok(Some(_)) = User::find_by_username(&state.db, &payload.username).await {
        warn!(username = %payload.username, "username already taken");
        return Err((StatusCode::CONFLICT, "Username already taken".into()));
    }

    let hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "hash_password failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Server error".into()));
        }
    };

    let user = match User::create(&state.db, &payload.username, &payload.email, &hash).await {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Server error".into()));
        }
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(Message {
            message: "User registered successfully",
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, String)> {
    payload.identity = payload.identity.trim().to_string();

    let user = match User::find_by_identity(&state.db, &payload.identity).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(identity = %payload.identity, "login unknown identity");
            return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_identity failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Server error".into()));
        }
    };

    let ok = match verify_password(&payload.password, &user.password_hash) {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "verify_password failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Server error".into()));
        }
    };

    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = match keys.sign(user.id, &user.username) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "jwt sign failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Server error".into()));
        }
    };

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state, auth))]
pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let user = match User::find_by_id(&state.db, auth.id).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(user_id = %auth.id, "token for missing user");
            return Err((StatusCode::UNAUTHORIZED, "User not found".into()));
        }
        Err(e) => {
            error!(error = %e, user_id = %auth.id, "find_by_id failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Server error".into()));
        }
    };

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.io"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[test]
    fn message_serializes() {
        let json = serde_json::to_string(&Message {
            message: "User registered successfully",
        })
        .unwrap();
        assert_eq!(json, r#"{"message":"User registered successfully"}"#);
    }

    fn register_body(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: "password123".into(),
        }
    }

    fn login_body(identity: &str, password: &str) -> LoginRequest {
        LoginRequest {
            identity: identity.into(),
            password: password.into(),
        }
    }

    #[sqlx::test]
    async fn register_twice_with_same_email_conflicts(pool: sqlx::PgPool) {
        let state = AppState::fake_with_pool(pool);

        register(State(state.clone()), Json(register_body("bob", "bob@example.com")))
            .await
            .expect("first registration");

        let (status, msg) = register(State(state), Json(register_body("robert", "bob@example.com")))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(msg, "Email already registered");
    }

    #[sqlx::test]
    async fn login_accepts_email_as_typed_at_registration(pool: sqlx::PgPool) {
        let state = AppState::fake_with_pool(pool);

        register(State(state.clone()), Json(register_body("bob", "Bob@Example.com")))
            .await
            .expect("registration");

        // Mixed-case email, exactly as the user typed it
        let res = login(
            State(state.clone()),
            Json(login_body("Bob@Example.com", "password123")),
        )
        .await
        .expect("login with email as typed");

        let keys = JwtKeys::from_ref(&state);
        let claims = keys.verify(&res.0.token).expect("usable token");
        assert_eq!(claims.username, "bob");

        // Stored (lowercased) form and username both work too
        login(
            State(state.clone()),
            Json(login_body("bob@example.com", "password123")),
        )
        .await
        .expect("login with stored email");
        login(State(state.clone()), Json(login_body("bob", "password123")))
            .await
            .expect("login with username");

        let (status, _) = login(State(state), Json(login_body("bob", "wrong-password")))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
