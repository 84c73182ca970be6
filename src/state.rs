use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use diesel::{
    SqliteConnection,
    connection::TransactionManager,
    r2d2::{ConnectionManager, Pool, PooledConnection},
};

use crate::{config::BracketSettings, util_resp::FailureResponse};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

type PooledConn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Shared router state.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub brackets: BracketSettings,
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for BracketSettings {
    fn from_ref(state: &AppState) -> Self {
        state.brackets.clone()
    }
}

/// Holds the transactional connection of a single request (if a handler
/// asked for one). Inserted by [`tx_commit`].
#[derive(Clone, Default)]
struct TxSlot(Arc<tokio::sync::Mutex<Option<PooledConn>>>);

/// This middleware commits the transaction opened for a request (by a
/// `Conn<true>` extractor) once the request has been handled. Anything other
/// than an informational, success or redirection status rolls back.
pub async fn tx_commit(mut req: Request, next: Next) -> Response {
    let slot = TxSlot::default();
    req.extensions_mut().insert(slot.clone());

    let res = next.run(req).await;

    let conn = slot.0.lock().await.take();
    if let Some(mut conn) = conn {
        let status = res.status();
        let outcome = if status.is_success()
            || status.is_redirection()
            || status.is_informational()
        {
            <PooledConn as diesel::Connection>::TransactionManager::commit_transaction(&mut conn)
        } else {
            tracing::debug!("rolling back transaction (status = {status})");
            <PooledConn as diesel::Connection>::TransactionManager::rollback_transaction(&mut conn)
        };

        if let Err(e) = outcome {
            tracing::error!("failed to finish transaction: {e}");
            return FailureResponse::ServerError(()).into_response();
        }
    }

    res
}

#[derive(Clone)]
pub struct ThreadSafeConn<const TX: bool> {
    pub inner: Arc<tokio::sync::Mutex<Option<PooledConn>>>,
}

async fn checkout(pool: DbPool) -> Result<PooledConn, FailureResponse> {
    tokio::task::spawn_blocking(move || pool.get())
        .await
        .map_err(|_| FailureResponse::ServerError(()))?
        .map_err(|e| {
            tracing::error!("could not check out a connection: {e}");
            FailureResponse::ServerError(())
        })
}

#[async_trait]
impl<const TX: bool, S> FromRequestParts<S> for ThreadSafeConn<TX>
where
    S: Send + Sync,
    DbPool: FromRef<S>,
{
    type Rejection = FailureResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        if let Some(conn) = parts.extensions.get::<ThreadSafeConn<TX>>() {
            return Ok(conn.clone());
        }

        let pool = DbPool::from_ref(state);

        let conn = if TX {
            let slot = parts
                .extensions
                .get::<TxSlot>()
                .cloned()
                .ok_or_else(|| {
                    tracing::error!("`tx_commit` middleware is not installed");
                    FailureResponse::ServerError(())
                })?;

            {
                let mut guard = slot.0.lock().await;
                if guard.is_none() {
                    let mut conn = checkout(pool).await?;
                    <PooledConn as diesel::Connection>::TransactionManager::begin_transaction(&mut conn)
                        .map_err(FailureResponse::from)?;
                    *guard = Some(conn);
                }
            }

            ThreadSafeConn { inner: slot.0 }
        } else {
            ThreadSafeConn {
                inner: Arc::new(tokio::sync::Mutex::new(Some(
                    checkout(pool).await?,
                ))),
            }
        };

        parts.extensions.insert(conn.clone());
        Ok(conn)
    }
}

/// A database connection. When `TX` is set, every query made through it
/// belongs to one transaction which [`tx_commit`] finishes.
pub struct Conn<const TX: bool> {
    inner: tokio::sync::OwnedMutexGuard<Option<PooledConn>>,
}

impl<const TX: bool> Deref for Conn<TX> {
    type Target = PooledConn;

    fn deref(&self) -> &Self::Target {
        self.inner
            .as_ref()
            .expect("connection is populated by the extractor")
    }
}

impl<const TX: bool> DerefMut for Conn<TX> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner
            .as_mut()
            .expect("connection is populated by the extractor")
    }
}

#[async_trait]
impl<const TX: bool, S> FromRequestParts<S> for Conn<TX>
where
    S: Send + Sync,
    DbPool: FromRef<S>,
{
    type Rejection = FailureResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let conn = ThreadSafeConn::<TX>::from_request_parts(parts, state).await?;
        let guard = conn
            .inner
            .try_lock_owned()
            .map_err(|_| FailureResponse::ServerError(()))?;
        Ok(Conn { inner: guard })
    }
}
