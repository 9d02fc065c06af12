//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    account::Account,
    ephemeral_token::{EphemeralToken, TokenKind},
    guest_session::GuestSession,
    refresh_token::RefreshTokenRecord,
};
use crate::domain::repository::{
    AccountRepository, EphemeralTokenRepository, GuestSessionRepository, RefreshTokenRepository,
};
use crate::domain::value_object::{
    account_id::AccountId, account_kind::AccountKind, email::Email, token_id::EphemeralTokenId,
    token_id::RefreshTokenId,
};
use crate::error::{AuthError, AuthResult};
use platform::password::HashedPassword;

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Startup housekeeping: drop expired guest sessions and expired
    /// never-used ephemeral tokens. Refresh token records are kept
    /// forever - replay detection depends on them.
    pub async fn cleanup_expired(&self) -> AuthResult<(u64, u64)> {
        let guests_deleted = self.delete_expired().await?;

        let ephemeral_deleted =
            sqlx::query("DELETE FROM ephemeral_tokens WHERE expires_at < $1 AND used_at IS NULL")
                .bind(Utc::now())
                .execute(&self.pool)
                .await?
                .rows_affected();

        tracing::info!(
            guest_sessions = guests_deleted,
            ephemeral_tokens = ephemeral_deleted,
            "Cleaned up expired auth data"
        );

        Ok((guests_deleted, ephemeral_deleted))
    }
}

// ============================================================================
// Account Repository Implementation
// ============================================================================

impl AccountRepository for PgAuthRepository {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                account_id,
                email,
                password_hash,
                kind,
                is_active,
                is_email_verified,
                full_name,
                phone,
                last_login_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.email.as_str())
        .bind(account.password_hash.as_ref().map(|h| h.as_str()))
        .bind(account.kind.code())
        .bind(account.is_active)
        .bind(account.is_email_verified)
        .bind(account.full_name.as_deref())
        .bind(account.phone.as_deref())
        .bind(account.last_login_at)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                account_id,
                email,
                password_hash,
                kind,
                is_active,
                is_email_verified,
                full_name,
                phone,
                last_login_at,
                created_at,
                updated_at
            FROM accounts
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT
                account_id,
                email,
                password_hash,
                kind,
                is_active,
                is_email_verified,
                full_name,
                phone,
                last_login_at,
                created_at,
                updated_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn email_exists(&self, email: &Email) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)",
        )
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn record_login(&self, account_id: &AccountId, at: DateTime<Utc>) -> AuthResult<()> {
        sqlx::query(
            "UPDATE accounts SET last_login_at = $2, updated_at = $2 WHERE account_id = $1",
        )
        .bind(account_id.as_uuid())
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Refresh Token Repository Implementation
// ============================================================================

impl RefreshTokenRepository for PgAuthRepository {
    async fn insert(&self, record: &RefreshTokenRecord) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (
                refresh_token_id,
                account_id,
                token_hash,
                family,
                revoked,
                expires_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.refresh_token_id.as_uuid())
        .bind(record.account_id.as_uuid())
        .bind(&record.token_hash)
        .bind(record.family)
        .bind(record.revoked)
        .bind(record.expires_at)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshTokenRecord>> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT
                refresh_token_id,
                account_id,
                token_hash,
                family,
                revoked,
                expires_at,
                created_at
            FROM refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RefreshTokenRow::into_record))
    }

    async fn revoke(&self, refresh_token_id: &RefreshTokenId) -> AuthResult<bool> {
        let updated = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE refresh_token_id = $1 AND revoked = FALSE",
        )
        .bind(refresh_token_id.as_uuid())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated == 1)
    }

    async fn rotate(
        &self,
        old_id: &RefreshTokenId,
        replacement: &RefreshTokenRecord,
    ) -> AuthResult<bool> {
        let mut tx = self.pool.begin().await?;

        // Conditional write: only one concurrent rotation can flip the
        // flag. The loser sees zero rows and must not insert.
        let updated = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE refresh_token_id = $1 AND revoked = FALSE",
        )
        .bind(old_id.as_uuid())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (
                refresh_token_id,
                account_id,
                token_hash,
                family,
                revoked,
                expires_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(replacement.refresh_token_id.as_uuid())
        .bind(replacement.account_id.as_uuid())
        .bind(&replacement.token_hash)
        .bind(replacement.family)
        .bind(replacement.revoked)
        .bind(replacement.expires_at)
        .bind(replacement.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }

    async fn revoke_family(&self, family: Uuid) -> AuthResult<u64> {
        let revoked = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE family = $1 AND revoked = FALSE",
        )
        .bind(family)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(revoked)
    }

    async fn revoke_all_for_account(&self, account_id: &AccountId) -> AuthResult<u64> {
        let revoked = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE account_id = $1 AND revoked = FALSE",
        )
        .bind(account_id.as_uuid())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(revoked)
    }
}

// ============================================================================
// Ephemeral Token Repository Implementation
// ============================================================================

impl EphemeralTokenRepository for PgAuthRepository {
    async fn insert(&self, token: &EphemeralToken) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO ephemeral_tokens (
                ephemeral_token_id,
                account_id,
                kind,
                token,
                expires_at,
                used_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(token.ephemeral_token_id.as_uuid())
        .bind(token.account_id.as_uuid())
        .bind(token.kind.code())
        .bind(&token.token)
        .bind(token.expires_at)
        .bind(token.used_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_token(
        &self,
        token: &str,
        kind: TokenKind,
    ) -> AuthResult<Option<EphemeralToken>> {
        let row = sqlx::query_as::<_, EphemeralTokenRow>(
            r#"
            SELECT
                ephemeral_token_id,
                account_id,
                kind,
                token,
                expires_at,
                used_at,
                created_at
            FROM ephemeral_tokens
            WHERE token = $1 AND kind = $2
            "#,
        )
        .bind(token)
        .bind(kind.code())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_token()).transpose()
    }

    async fn redeem_email_verification(
        &self,
        token_id: &EphemeralTokenId,
        account_id: &AccountId,
    ) -> AuthResult<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // used_at is set at most once; a concurrent duplicate redemption
        // leaves it untouched and converges on the same account state.
        sqlx::query(
            "UPDATE ephemeral_tokens SET used_at = $2 WHERE ephemeral_token_id = $1 AND used_at IS NULL",
        )
        .bind(token_id.as_uuid())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE accounts SET is_email_verified = TRUE, updated_at = $2 WHERE account_id = $1",
        )
        .bind(account_id.as_uuid())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn redeem_password_reset(
        &self,
        token_id: &EphemeralTokenId,
        account_id: &AccountId,
        new_hash: &HashedPassword,
    ) -> AuthResult<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let redeemed = sqlx::query(
            "UPDATE ephemeral_tokens SET used_at = $2 WHERE ephemeral_token_id = $1 AND used_at IS NULL",
        )
        .bind(token_id.as_uuid())
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if redeemed == 0 {
            tx.rollback().await?;
            return Err(AuthError::TokenAlreadyUsed);
        }

        sqlx::query(
            "UPDATE accounts SET password_hash = $2, updated_at = $3 WHERE account_id = $1",
        )
        .bind(account_id.as_uuid())
        .bind(new_hash.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE account_id = $1 AND revoked = FALSE",
        )
        .bind(account_id.as_uuid())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }
}

// ============================================================================
// Guest Session Repository Implementation
// ============================================================================

impl GuestSessionRepository for PgAuthRepository {
    async fn insert(&self, session: &GuestSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO guest_sessions (
                session_token,
                email,
                full_name,
                expires_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&session.session_token)
        .bind(session.email.as_deref())
        .bind(session.full_name.as_deref())
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_token(&self, session_token: &str) -> AuthResult<Option<GuestSession>> {
        let row = sqlx::query_as::<_, GuestSessionRow>(
            r#"
            SELECT
                session_token,
                email,
                full_name,
                expires_at,
                created_at
            FROM guest_sessions
            WHERE session_token = $1
            "#,
        )
        .bind(session_token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(GuestSessionRow::into_session))
    }

    async fn delete_expired(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM guest_sessions WHERE expires_at < $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: Uuid,
    email: String,
    password_hash: Option<String>,
    kind: String,
    is_active: bool,
    is_email_verified: bool,
    full_name: Option<String>,
    phone: Option<String>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> AuthResult<Account> {
        let kind = AccountKind::from_code(&self.kind)
            .ok_or_else(|| AuthError::Internal(format!("unknown account kind: {}", self.kind)))?;

        let password_hash = self
            .password_hash
            .map(HashedPassword::from_stored)
            .transpose()
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(Account {
            account_id: AccountId::from_uuid(self.account_id),
            email: Email::from_db(self.email),
            password_hash,
            kind,
            is_active: self.is_active,
            is_email_verified: self.is_email_verified,
            full_name: self.full_name,
            phone: self.phone,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    refresh_token_id: Uuid,
    account_id: Uuid,
    token_hash: String,
    family: Uuid,
    revoked: bool,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl RefreshTokenRow {
    fn into_record(self) -> RefreshTokenRecord {
        RefreshTokenRecord {
            refresh_token_id: RefreshTokenId::from_uuid(self.refresh_token_id),
            account_id: AccountId::from_uuid(self.account_id),
            token_hash: self.token_hash,
            family: self.family,
            revoked: self.revoked,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EphemeralTokenRow {
    ephemeral_token_id: Uuid,
    account_id: Uuid,
    kind: String,
    token: String,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl EphemeralTokenRow {
    fn into_token(self) -> AuthResult<EphemeralToken> {
        let kind = TokenKind::from_code(&self.kind)
            .ok_or_else(|| AuthError::Internal(format!("unknown token kind: {}", self.kind)))?;

        Ok(EphemeralToken {
            ephemeral_token_id: EphemeralTokenId::from_uuid(self.ephemeral_token_id),
            account_id: AccountId::from_uuid(self.account_id),
            kind,
            token: self.token,
            expires_at: self.expires_at,
            used_at: self.used_at,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct GuestSessionRow {
    session_token: String,
    email: Option<String>,
    full_name: Option<String>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl GuestSessionRow {
    fn into_session(self) -> GuestSession {
        GuestSession {
            session_token: self.session_token,
            email: self.email,
            full_name: self.full_name,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}
