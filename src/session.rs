//! Server-side session storage.
//!
//! A session is created at login and referenced by the `sid` claim of the
//! bearer token. It carries an insertion-ordered key/value map (the cart lives
//! here) and a fixed expiry shared with the token.

use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
    sea_query::{Expr, LockType},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    entity::sessions::{ActiveModel as SessionActive, Column as SessionCol, Entity as Sessions},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expiry_date: DateTime<Utc>,
    data: Map<String, Value>,
}

impl Session {
    pub fn new(id: Uuid, user_id: Uuid, expiry_date: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            expiry_date,
            data: Map::new(),
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        match self.data.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    pub fn insert<T: Serialize>(&mut self, key: &str, value: &T) -> AppResult<()> {
        self.data.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date <= now
    }

    pub fn encode(&self) -> AppResult<Vec<u8>> {
        Ok(serde_json::to_vec(&self.data)?)
    }

    pub fn decode(
        id: Uuid,
        user_id: Uuid,
        expiry_date: DateTime<Utc>,
        bytes: &[u8],
    ) -> AppResult<Self> {
        let data = if bytes.is_empty() {
            Map::new()
        } else {
            serde_json::from_slice(bytes)?
        };
        Ok(Self {
            id,
            user_id,
            expiry_date,
            data,
        })
    }
}

/// Loads and saves [`Session`]s through any SeaORM connection, so callers can
/// run session updates inside their own transaction.
#[derive(Debug, Clone)]
pub struct SessionStore {
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub async fn create<C: ConnectionTrait>(&self, db: &C, user_id: Uuid) -> AppResult<Session> {
        let session = Session::new(Uuid::new_v4(), user_id, Utc::now() + self.ttl);
        SessionActive {
            id: Set(session.id),
            user_id: Set(session.user_id),
            data: Set(session.encode()?),
            expiry_date: Set(session.expiry_date.into()),
        }
        .insert(db)
        .await?;
        Ok(session)
    }

    pub async fn load<C: ConnectionTrait>(&self, db: &C, user: &AuthUser) -> AppResult<Session> {
        self.fetch(db, user, false).await
    }

    /// Load and lock the session row until the surrounding transaction ends.
    pub async fn load_for_update<C: ConnectionTrait>(
        &self,
        db: &C,
        user: &AuthUser,
    ) -> AppResult<Session> {
        self.fetch(db, user, true).await
    }

    async fn fetch<C: ConnectionTrait>(
        &self,
        db: &C,
        user: &AuthUser,
        lock: bool,
    ) -> AppResult<Session> {
        let mut finder = Sessions::find_by_id(user.session_id);
        if lock {
            finder = finder.lock(LockType::Update);
        }
        let model = finder
            .one(db)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Session not found".into()))?;

        if model.user_id != user.user_id {
            return Err(AppError::Unauthorized("Session does not belong to user".into()));
        }

        let session = Session::decode(
            model.id,
            model.user_id,
            model.expiry_date.with_timezone(&Utc),
            &model.data,
        )?;
        if session.is_expired_at(Utc::now()) {
            return Err(AppError::Unauthorized("Session expired".into()));
        }
        Ok(session)
    }

    pub async fn save<C: ConnectionTrait>(&self, db: &C, session: &Session) -> AppResult<()> {
        let result = Sessions::update_many()
            .col_expr(SessionCol::Data, Expr::value(session.encode()?))
            .filter(SessionCol::Id.eq(session.id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::Unauthorized("Session not found".into()));
        }
        Ok(())
    }

    pub async fn delete<C: ConnectionTrait>(&self, db: &C, id: Uuid) -> AppResult<()> {
        Sessions::delete_by_id(id).exec(db).await?;
        Ok(())
    }

    pub async fn delete_expired<C: ConnectionTrait>(&self, db: &C) -> AppResult<u64> {
        let result = Sessions::delete_many()
            .filter(SessionCol::ExpiryDate.lte(Utc::now()))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
