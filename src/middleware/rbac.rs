// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    models::auth::UserRole,
};

/// Papel exigido por uma rota.
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> UserRole;
    fn denied_message() -> &'static str;
}

/// Guardião: rejeita com 403 quem não tem o papel `T`.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::InvalidToken)?;

        if user.0.role != T::role() {
            return Err(AppError::Forbidden(T::denied_message().to_string()));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// PAPÉIS
// ---

pub struct Admin;
impl RoleDef for Admin {
    fn role() -> UserRole {
        UserRole::Admin
    }
    fn denied_message() -> &'static str {
        "Acces reserve aux administrateurs"
    }
}

pub type RequireAdmin = RequireRole<Admin>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_user;
    use axum::http::{Request, StatusCode};

    async fn check(user: Option<AuthenticatedUser>) -> Result<RequireAdmin, AppError> {
        let (mut parts, _) = Request::new(()).into_parts();
        if let Some(user) = user {
            parts.extensions.insert(user);
        }
        RequireAdmin::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn admins_pass() {
        assert!(check(Some(AuthenticatedUser(sample_user(UserRole::Admin)))).await.is_ok());
    }

    #[tokio::test]
    async fn sellers_are_forbidden() {
        let err = check(Some(AuthenticatedUser(sample_user(UserRole::Seller)))).await.err().unwrap();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.to_string(), "Acces reserve aux administrateurs");
    }

    #[tokio::test]
    async fn anonymous_is_unauthorized() {
        let err = check(None).await.err().unwrap();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
