// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use juniper::{FieldResult, GraphQLInputObject, graphql_object};

use crate::db::models::{NewStudent, Student};
use crate::graphql::{AuthenticatedUser, Context};

#[graphql_object]
#[graphql(context = Context)]
impl Student {
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub fn email(&self, ctx: &Context) -> FieldResult<String> {
        let is_self = ctx.user.as_ref().is_some_and(|u| u.email == self.email);
        if crate::rules::may_view_email(is_self, ctx.role()) {
            Ok(self.email.clone())
        } else {
            Err(juniper::FieldError::new(
                "Permission denied to view email",
                juniper::Value::null(),
            ))
        }
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn career(&self) -> &str {
        &self.career
    }

    pub fn preferred_games(&self) -> &[String] {
        &self.preferred_games
    }

    pub fn favorite_console(&self) -> Option<&str> {
        self.favorite_console.as_deref()
    }

    pub fn game_rank(&self) -> Option<&str> {
        self.game_rank.as_deref()
    }

    pub fn discord_username(&self) -> Option<&str> {
        self.discord_username.as_deref()
    }

    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }
}

/// Get or create the student record backing the authenticated account.
///
/// Every workflow entry point (voting, registration, team formation)
/// goes through here, so a first-time visitor gets one record with one
/// set of placeholder defaults no matter which page they hit first.
pub async fn ensure_student_record(
    ctx: &Context,
    current_user: &AuthenticatedUser,
) -> FieldResult<Student> {
    use crate::db::schema::students::dsl::*;

    let mut conn = ctx.get_db_conn().await;

    if let Some(existing) = students
        .filter(email.eq(&current_user.email))
        .select(Student::as_select())
        .first::<Student>(&mut conn)
        .await
        .optional()?
    {
        return Ok(existing);
    }

    let new_student = NewStudent {
        email: current_user.email.clone(),
        full_name: current_user.display_name.clone(),
        career: "Not specified".to_string(),
    };

    let inserted = diesel::insert_into(students)
        .values(&new_student)
        .on_conflict(email)
        .do_nothing()
        .returning(Student::as_returning())
        .get_result::<Student>(&mut conn)
        .await
        .optional()?;

    match inserted {
        Some(record) => Ok(record),
        // Lost a race against another session for the same account; the
        // record exists now.
        None => Ok(students
            .filter(email.eq(&current_user.email))
            .select(Student::as_select())
            .first::<Student>(&mut conn)
            .await?),
    }
}

#[derive(GraphQLInputObject, Debug)]
pub struct ProfileInput {
    pub full_name: Option<String>,
    pub career: Option<String>,
    pub preferred_games: Option<Vec<String>>,
    pub favorite_console: Option<String>,
    pub game_rank: Option<String>,
    pub discord_username: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::db::schema::students)]
struct ProfileChanges {
    full_name: Option<String>,
    career: Option<String>,
    preferred_games: Option<Vec<String>>,
    favorite_console: Option<String>,
    game_rank: Option<String>,
    discord_username: Option<String>,
    bio: Option<String>,
    avatar_url: Option<String>,
}

pub async fn update_profile(ctx: &Context, input: ProfileInput) -> FieldResult<Student> {
    let current_user = ctx.require_authentication()?;
    let record = ensure_student_record(ctx, &current_user).await?;

    let changes = ProfileChanges {
        full_name: input.full_name,
        career: input.career,
        preferred_games: input.preferred_games,
        favorite_console: input.favorite_console,
        game_rank: input.game_rank,
        discord_username: input.discord_username,
        bio: input.bio,
        avatar_url: input.avatar_url,
    };

    // diesel rejects an update with no changed columns.
    if let ProfileChanges {
        full_name: None,
        career: None,
        preferred_games: None,
        favorite_console: None,
        game_rank: None,
        discord_username: None,
        bio: None,
        avatar_url: None,
    } = &changes
    {
        return Ok(record);
    }

    use crate::db::schema::students::dsl::*;

    let updated = diesel::update(students.filter(id.eq(record.id)))
        .set(&changes)
        .returning(Student::as_returning())
        .get_result::<Student>(&mut ctx.get_db_conn().await)
        .await?;

    Ok(updated)
}

pub async fn get_my_profile(ctx: &Context) -> FieldResult<Option<Student>> {
    let Some(current_user) = &ctx.user else {
        return Ok(None);
    };

    use crate::db::schema::students::dsl::*;

    let record = students
        .filter(email.eq(&current_user.email))
        .select(Student::as_select())
        .first::<Student>(&mut ctx.get_db_conn().await)
        .await
        .optional()?;

    Ok(record)
}

pub async fn get_participants(ctx: &Context) -> FieldResult<Vec<Student>> {
    use crate::db::schema::students::dsl::*;

    let records = students
        .order(full_name.asc())
        .select(Student::as_select())
        .load::<Student>(&mut ctx.get_db_conn().await)
        .await?;

    Ok(records)
}
