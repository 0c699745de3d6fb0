// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{common::error::AppError, config::AppState, models::auth::{AppRole, User}};

/// 1. O Trait que define quais papéis liberam a rota
pub trait RoleDef: Send + Sync + 'static {
    fn allowed() -> &'static [AppRole];
    fn denied_message() -> &'static str;
}

/// 2. O Extractor (Guardião). Exige `auth_guard` antes dele.
pub struct RequireRole<R>(pub PhantomData<R>);

impl<R> FromRequestParts<AppState> for RequireRole<R>
where
    R: RoleDef,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<User>().ok_or(AppError::InvalidToken)?;

        for role in R::allowed() {
            if state.auth_service.has_role(user.id, *role).await? {
                return Ok(RequireRole(PhantomData));
            }
        }

        Err(AppError::Forbidden(R::denied_message().to_string()))
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS (TIPOS)
// ---

pub struct Admin;
impl RoleDef for Admin {
    fn allowed() -> &'static [AppRole] {
        &[AppRole::Admin]
    }
    fn denied_message() -> &'static str {
        "Apenas administradores podem realizar esta ação."
    }
}

// Anunciante (admin também pode anunciar)
pub struct Host;
impl RoleDef for Host {
    fn allowed() -> &'static [AppRole] {
        &[AppRole::Host, AppRole::Admin]
    }
    fn denied_message() -> &'static str {
        "Apenas anunciantes podem realizar esta ação."
    }
}
