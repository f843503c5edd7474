//! Authentication service
//!
//! Registration and login. Both answer with a freshly issued bearer token.

use parley_common::{AppError, AppResult};
use parley_core::User;
use tracing::{info, instrument, warn};

use crate::dto::{AuthResponse, CurrentUserResponse, LoginRequest, RegisterRequest};
use crate::state::AppState;

pub struct AuthService<'a> {
    state: &'a AppState,
}

impl<'a> AuthService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let users = self.state.users();

        if users.email_exists(&request.email).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.state.passwords().hash(&request.password)?;

        let user = User::new(
            self.state.ids().generate(),
            request.name.trim().to_string(),
            request.email,
        );

        // A concurrent registration can still win the race; the store reports it
        users.create(&user, &password_hash).await?;

        info!(user_id = %user.id, "User registered");
        self.respond(user)
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let users = self.state.users();

        let user = users.find_by_email(&request.email).await?.ok_or_else(|| {
            warn!("Login failed: unknown email");
            AppError::InvalidCredentials
        })?;

        let password_hash = users.get_password_hash(user.id).await?.ok_or_else(|| {
            warn!(user_id = %user.id, "Login failed: no password hash");
            AppError::InvalidCredentials
        })?;

        self.state
            .passwords()
            .verify_or_error(&request.password, &password_hash)
            .inspect_err(|_| warn!(user_id = %user.id, "Login failed: wrong password"))?;

        info!(user_id = %user.id, "User logged in");
        self.respond(user)
    }

    fn respond(&self, user: User) -> AppResult<AuthResponse> {
        let issued = self.state.jwt_service().issue(user.id)?;
        let online = self.state.router().is_online(user.id);
        Ok(AuthResponse::new(
            issued.token,
            issued.expires_in,
            CurrentUserResponse::new(user, online),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::test_state;
    use parley_common::CredentialVerifier;
    use parley_core::DomainError;

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "  Ada ".into(),
            email: email.into(),
            password: "correct horse battery".into(),
        }
    }

    #[tokio::test]
    async fn test_register_issues_verifiable_token() {
        let state = test_state().await;
        let service = AuthService::new(&state);

        let response = service.register(register_request("ada@example.com")).await.unwrap();
        assert_eq!(response.user.name, "Ada");
        assert!(!response.user.online);

        let user_id = state.jwt_service().verify(&response.token).unwrap();
        assert_eq!(user_id, response.user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let state = test_state().await;
        let service = AuthService::new(&state);

        service.register(register_request("ada@example.com")).await.unwrap();
        let err = service
            .register(register_request("ADA@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Conflict(_) | AppError::Domain(DomainError::EmailAlreadyExists)
        ));
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_login_checks_password() {
        let state = test_state().await;
        let service = AuthService::new(&state);
        let registered = service.register(register_request("ada@example.com")).await.unwrap();

        let ok = service
            .login(LoginRequest {
                email: "ada@example.com".into(),
                password: "correct horse battery".into(),
            })
            .await
            .unwrap();
        assert_eq!(ok.user.id, registered.user.id);

        let wrong = service
            .login(LoginRequest {
                email: "ada@example.com".into(),
                password: "wrong password".into(),
            })
            .await;
        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));

        let unknown = service
            .login(LoginRequest {
                email: "nobody@example.com".into(),
                password: "whatever1".into(),
            })
            .await;
        assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
    }
}
