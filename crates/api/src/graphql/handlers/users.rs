// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::{
    db::{
        models::{NewUser, User, UserRole},
        schema::users,
    },
    graphql::{Context, handlers::sessions::SessionCredentials},
};
use argon2::{
    Argon2, PasswordVerifier,
    password_hash::{PasswordHasher, SaltString},
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use juniper::{FieldResult, graphql_object};
use rand_core::OsRng;

#[graphql_object]
#[graphql(context = Context)]
impl User {
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn email(&self, ctx: &Context) -> FieldResult<String> {
        let is_self = ctx.user.as_ref().is_some_and(|u| u.user_id == self.id);
        if crate::rules::may_view_email(is_self, ctx.role()) {
            Ok(self.email.clone())
        } else {
            Err(juniper::FieldError::new(
                "Permission denied to view email",
                juniper::Value::null(),
            ))
        }
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

pub async fn create_user(
    email: String,
    display_name: String,
    password: String,
    context: &Context,
) -> FieldResult<bool> {
    let mut role = UserRole::Participant;
    let user_count = users::table
        .count()
        .get_result::<i64>(&mut context.get_db_conn().await)
        .await?;
    // Bootstrap: the very first account administers the event.
    if user_count == 0 {
        role = UserRole::Admin;
    }

    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    let new_user = NewUser {
        email,
        display_name,
        password_hash: argon2
            .hash_password(password.as_bytes(), &salt)?
            .to_string(),
        role,
        is_active: true,
    };

    diesel::insert_into(users::table)
        .values(&new_user)
        .execute(&mut context.get_db_conn().await)
        .await?;

    Ok(true)
}

pub async fn login_user(
    email: String,
    password: String,
    context: &Context,
) -> FieldResult<SessionCredentials> {
    let user = users::table
        .filter(users::email.eq(&email))
        .filter(users::is_active.eq(true))
        .select(User::as_select())
        .first(&mut context.get_db_conn().await)
        .await
        .optional()?;
    match user {
        Some(user) => {
            let parsed_hash = argon2::PasswordHash::new(&user.password_hash)?;
            if Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok()
            {
                let signing_key = context.get_signing_key().clone();
                let session_credentials = super::sessions::create_session(
                    context,
                    user.id,
                    user.role,
                    user.email,
                    user.display_name,
                    &signing_key,
                )
                .await?;
                Ok(session_credentials)
            } else {
                Err(juniper::FieldError::new(
                    "Invalid email or password",
                    juniper::Value::null(),
                ))
            }
        }
        None => Err(juniper::FieldError::new(
            "Invalid email or password",
            juniper::Value::null(),
        )),
    }
}

pub async fn get_current_user(ctx: &Context) -> FieldResult<Option<User>> {
    let Some(current_user) = &ctx.user else {
        return Ok(None);
    };

    let record = users::table
        .filter(users::id.eq(current_user.user_id))
        .select(User::as_select())
        .first::<User>(&mut ctx.get_db_conn().await)
        .await
        .optional()?;

    Ok(record)
}

pub async fn get_all_users(ctx: &Context) -> FieldResult<Vec<User>> {
    ctx.require_role_min(UserRole::Admin)?;

    let records = users::table
        .order(users::created_at.asc())
        .select(User::as_select())
        .load::<User>(&mut ctx.get_db_conn().await)
        .await?;

    Ok(records)
}
