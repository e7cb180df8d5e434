use axum::extract::State;
use tracing::info;
use uuid::Uuid;

use mygram_db::Database;
use mygram_db::models::{NewUser, UserRow};
use mygram_types::api::{LoginRequest, LoginResponse, RegisterRequest};
use mygram_types::models::User;

use crate::credentials::{self, TokenService};
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::{AppState, run_blocking};
use crate::validation::ValidJson;

pub struct UserService<'a> {
    db: &'a Database,
    tokens: &'a TokenService,
}

impl<'a> UserService<'a> {
    pub fn new(db: &'a Database, tokens: &'a TokenService) -> Self {
        Self { db, tokens }
    }

    pub fn register(&self, req: RegisterRequest) -> Result<User, ApiError> {
        // Fast path only; the unique indexes settle concurrent registrations.
        if self.db.get_user_by_email(&req.email)?.is_some() {
            return Err(ApiError::Conflict("email already registered".into()));
        }
        if self.db.get_user_by_username(&req.username)?.is_some() {
            return Err(ApiError::Conflict("username already taken".into()));
        }

        let age = req
            .age
            .ok_or_else(|| ApiError::Validation(vec!["age is required".into()]))?;
        let password_hash = credentials::hash_password(&req.password)?;
        let id = Uuid::new_v4().to_string();

        let row = self.db.create_user(&NewUser {
            id: &id,
            username: &req.username,
            email: &req.email,
            password_hash: &password_hash,
            age,
        })?;

        info!("Registered user {} ({})", row.username, row.id);
        Ok(user_view(row))
    }

    /// Unknown email and wrong password fail the same way.
    pub fn login(&self, req: LoginRequest) -> Result<LoginResponse, ApiError> {
        let Some(user) = self.db.get_user_by_email(&req.email)? else {
            credentials::verify_decoy(&req.password);
            return Err(ApiError::InvalidEmailOrPassword);
        };

        if !credentials::verify_password(&user.password, &req.password) {
            return Err(ApiError::InvalidEmailOrPassword);
        }

        let token = self.tokens.issue(&user.id, &user.email)?;
        Ok(LoginResponse { token })
    }
}

fn user_view(row: UserRow) -> User {
    User {
        id: row.id,
        username: row.username,
        email: row.email,
        age: row.age,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> Result<ApiResponse<User>, ApiError> {
    let user = run_blocking(&state, move |s| UserService::new(&s.db, &s.tokens).register(req)).await?;
    Ok(ApiResponse(user))
}

pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, ApiError> {
    let response = run_blocking(&state, move |s| UserService::new(&s.db, &s.tokens).login(req)).await?;
    Ok(ApiResponse(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_req(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: "secret1".into(),
            age: Some(20),
        }
    }

    fn login_req(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn stored_password_is_hashed() {
        let db = Database::open_in_memory().unwrap();
        let tokens = TokenService::new("test-secret");
        let users = UserService::new(&db, &tokens);

        let user = users.register(register_req("a", "a@x.com")).unwrap();
        assert_eq!(user.username, "a");
        assert_eq!(user.age, 20);

        let row = db.get_user_by_id(&user.id).unwrap().unwrap();
        assert_ne!(row.password, "secret1");
        assert!(credentials::verify_password(&row.password, "secret1"));
    }

    #[test]
    fn duplicate_email_leaves_one_user() {
        let db = Database::open_in_memory().unwrap();
        let tokens = TokenService::new("test-secret");
        let users = UserService::new(&db, &tokens);

        users.register(register_req("a", "a@x.com")).unwrap();
        let err = users.register(register_req("b", "a@x.com")).unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err = users.register(register_req("a", "other@x.com")).unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        let all = db.list_users().unwrap();
        assert_eq!(all.iter().filter(|u| u.email == "a@x.com").count(), 1);
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn login_issues_token_for_the_user() {
        let db = Database::open_in_memory().unwrap();
        let tokens = TokenService::new("test-secret");
        let users = UserService::new(&db, &tokens);
        let user = users.register(register_req("a", "a@x.com")).unwrap();

        let response = users.login(login_req("a@x.com", "secret1")).unwrap();
        let claims = tokens.verify(&response.token).unwrap();
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.email, "a@x.com");
    }

    #[test]
    fn bad_credentials_are_indistinguishable() {
        let db = Database::open_in_memory().unwrap();
        let tokens = TokenService::new("test-secret");
        let users = UserService::new(&db, &tokens);
        users.register(register_req("a", "a@x.com")).unwrap();

        assert!(matches!(
            users.login(login_req("a@x.com", "wrong-password")),
            Err(ApiError::InvalidEmailOrPassword)
        ));
        assert!(matches!(
            users.login(login_req("nobody@x.com", "secret1")),
            Err(ApiError::InvalidEmailOrPassword)
        ));
    }
}
