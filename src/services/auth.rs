// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{RoleStore, UserRepository},
    models::auth::{AppRole, Claims, MeResponse, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, pool: PgPool) -> Self {
        Self { user_repo, jwt_secret, pool }
    }

    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
        role: Option<AppRole>,
    ) -> Result<String, AppError> {
        // Admin nunca é auto-atribuído
        let role = match role.unwrap_or(AppRole::Tenant) {
            AppRole::Admin => {
                return Err(AppError::Forbidden("O papel 'admin' não pode ser escolhido no cadastro.".into()))
            }
            other => other,
        };

        // 1. Hashing fora da transação (não toca no banco)
        let password_clone = password.to_owned();
        let hashed_password = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        // 2. Usuário e papel na mesma transação
        let mut tx = self.pool.begin().await?;

        let new_user = self
            .user_repo
            .create_user(&mut *tx, email, &hashed_password, full_name)
            .await?;

        self.user_repo.assign_role(&mut *tx, new_user.id, role).await?;

        tx.commit().await?;

        tracing::info!("✅ Usuário registrado: {} ({:?})", new_user.id, role);
        self.create_token(new_user.id)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    /// Decodifica o JWT e carrega o usuário correspondente.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let user_id = self.decode_subject(token)?;

        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::InvalidToken) // Usuário removido após a emissão do token
    }

    pub async fn profile(&self, user: User) -> Result<MeResponse, AppError> {
        let roles = self.user_repo.roles_for(user.id).await?;
        Ok(MeResponse { user, roles })
    }

    pub async fn has_role(&self, user_id: Uuid, role: AppRole) -> Result<bool, AppError> {
        self.user_repo.has_role(user_id, role).await
    }

    pub(crate) fn decode_subject(&self, token: &str) -> Result<Uuid, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims.sub)
    }

    pub(crate) fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn service(secret: &str) -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/roadbed_test")
            .unwrap();
        AuthService::new(UserRepository::new(pool.clone()), secret.to_string(), pool)
    }

    #[tokio::test]
    async fn issued_token_decodes_to_same_subject() {
        let auth = service("segredo");
        let user_id = Uuid::new_v4();

        let token = auth.create_token(user_id).unwrap();

        assert_eq!(auth.decode_subject(&token).unwrap(), user_id);
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let token = service("segredo-a").create_token(Uuid::new_v4()).unwrap();

        let err = service("segredo-b").decode_subject(&token).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[tokio::test]
    async fn admin_role_cannot_be_self_assigned() {
        let err = service("segredo")
            .register_user("a@b.com", "123456", None, Some(AppRole::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
