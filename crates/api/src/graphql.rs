// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::net::IpAddr;
use std::time::Duration;

use juniper::EmptySubscription;
pub use mutation::Mutation;
pub use query::Query;

use crate::db::models::{Game, UserRole};

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

pub mod auth;
mod handlers;
mod mutation;
mod query;

#[derive(Clone)]
pub struct BaseContext {
    pub db_pool: diesel_async::pooled_connection::bb8::Pool<diesel_async::AsyncPgConnection>,
    pub keypair: ed25519_dalek::SigningKey,
    pub games_cache: moka::future::Cache<String, Vec<Game>>,
}

impl BaseContext {
    pub fn new(
        db_pool: diesel_async::pooled_connection::bb8::Pool<diesel_async::AsyncPgConnection>,
        keypair: ed25519_dalek::SigningKey,
    ) -> Self {
        Self {
            db_pool,
            keypair,
            // The catalog only changes when an organizer edits it, so a
            // short TTL is enough to keep the vote and registration pages
            // from hammering the games table.
            games_cache: moka::future::Cache::builder()
                .time_to_live(Duration::from_secs(30))
                .build(),
        }
    }
}

pub struct Context {
    base: BaseContext,
    ip: IpAddr,
    user_agent: String,
    pub user: Option<AuthenticatedUser>,
}

impl juniper::Context for Context {}

/// Role claim resolved once at login and carried in the access token.
/// Mutations consume this as an opaque capability instead of re-deriving
/// permissions from the email address.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: uuid::Uuid,
    pub role: UserRole,
    pub email: String,
    pub display_name: String,
}

impl Context {
    pub fn new(
        base: BaseContext,
        ip: IpAddr,
        user_agent: String,
        user_details: Option<AuthenticatedUser>,
    ) -> Self {
        Self {
            base,
            ip,
            user_agent,
            user: user_details,
        }
    }

    pub(crate) async fn get_db_conn(
        &self,
    ) -> diesel_async::pooled_connection::bb8::PooledConnection<'_, diesel_async::AsyncPgConnection>
    {
        self.base
            .db_pool
            .get()
            .await
            .expect("Failed to get DB connection")
    }

    /// Active games, cached across requests.
    pub async fn active_games(&self) -> juniper::FieldResult<Vec<Game>> {
        if let Some(games) = self.base.games_cache.get("active").await {
            return Ok(games);
        }
        let records = {
            use crate::db::schema::games::dsl::*;
            games
                .filter(is_active.eq(true))
                .order((category.asc(), name.asc()))
                .select(Game::as_select())
                .load::<Game>(&mut self.get_db_conn().await)
                .await?
        };
        self.base
            .games_cache
            .insert("active".to_string(), records.clone())
            .await;
        Ok(records)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn role(&self) -> Option<UserRole> {
        self.user.as_ref().map(|u| u.role)
    }

    pub fn require_role_min(&self, required_role: UserRole) -> juniper::FieldResult<()> {
        match &self.role() {
            Some(user_role) if user_role >= &required_role => Ok(()),
            _ => Err(juniper::FieldError::new(
                "Insufficient permissions",
                juniper::Value::null(),
            )),
        }
    }

    pub fn require_authentication(&self) -> juniper::FieldResult<AuthenticatedUser> {
        if let Some(user) = &self.user {
            Ok(user.clone())
        } else {
            Err(juniper::FieldError::new(
                "Authentication required",
                juniper::Value::null(),
            ))
        }
    }

    pub fn get_ip(&self) -> &IpAddr {
        &self.ip
    }

    pub fn get_user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn get_signing_key(&self) -> &ed25519_dalek::SigningKey {
        &self.base.keypair
    }
}

pub type Schema = juniper::RootNode<Query, Mutation, EmptySubscription<Context>>;
