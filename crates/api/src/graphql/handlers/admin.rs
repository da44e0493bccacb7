// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::time::Duration;

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use juniper::{FieldResult, GraphQLObject};

use crate::db::models::{GameCategory, RegistrationStatus, UserRole};
use crate::graphql::Context;
use crate::rules;

pub const VOTING_ENABLED_KEY: &str = "voting_enabled";

/// Read the voting toggle. Absent row means voting is open; see
/// `rules::voting_open` for the fail-open rationale.
pub(super) async fn voting_enabled_on(
    conn: &mut AsyncPgConnection,
) -> Result<bool, diesel::result::Error> {
    use crate::db::schema::app_settings::dsl::*;

    let setting: Option<String> = app_settings
        .filter(key.eq(VOTING_ENABLED_KEY))
        .select(value)
        .first::<String>(conn)
        .await
        .optional()?;

    Ok(rules::voting_open(setting.as_deref()))
}

pub async fn is_voting_enabled(ctx: &Context) -> FieldResult<bool> {
    Ok(voting_enabled_on(&mut *ctx.get_db_conn().await).await?)
}

pub async fn set_voting_enabled(ctx: &Context, enabled: bool) -> FieldResult<bool> {
    ctx.require_role_min(UserRole::Admin)?;
    let admin = ctx.require_authentication()?;

    use crate::db::schema::app_settings::dsl::*;

    let now = chrono::Utc::now();
    let new_value = if enabled { "true" } else { "false" };

    diesel::insert_into(app_settings)
        .values((
            key.eq(VOTING_ENABLED_KEY),
            value.eq(new_value),
            updated_at.eq(now),
            updated_by.eq(Some(admin.email.clone())),
        ))
        .on_conflict(key)
        .do_update()
        .set((
            value.eq(new_value),
            updated_at.eq(now),
            updated_by.eq(Some(admin.email)),
        ))
        .execute(&mut ctx.get_db_conn().await)
        .await?;

    tracing::info!(enabled, "voting toggle updated");

    Ok(enabled)
}

#[derive(GraphQLObject, Debug, Clone)]
pub struct GameVoteTally {
    pub name: String,
    pub category: GameCategory,
    pub votes: i32,
}

#[cached::proc_macro::cached(time = 60, key = "()", convert = "{ }", result = true)]
async fn get_top_games(context: &Context) -> FieldResult<Vec<GameVoteTally>> {
    use crate::db::schema::games::dsl::*;

    let rows = games
        .order(votes_count.desc())
        .limit(5)
        .select((name, category, votes_count))
        .load::<(String, GameCategory, i32)>(&mut context.get_db_conn().await)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(game_name, game_category, tally)| GameVoteTally {
            name: game_name,
            category: game_category,
            votes: tally,
        })
        .collect())
}

/// Public vote standings, shared with the admin overview. Slightly
/// stale is fine here.
pub async fn get_results(ctx: &Context) -> FieldResult<Vec<GameVoteTally>> {
    get_top_games(ctx).await
}

#[derive(GraphQLObject, Debug)]
pub struct AdminStats {
    pub total_students: i32,
    pub total_registrations: i32,
    pub total_votes: i32,
    pub top_games: Vec<GameVoteTally>,
}

pub async fn get_admin_stats(ctx: &Context) -> FieldResult<AdminStats> {
    ctx.require_role_min(UserRole::Moderator)?;

    let mut conn = ctx.get_db_conn().await;

    let total_students: i64 = {
        use crate::db::schema::students::dsl::*;
        students.count().get_result(&mut conn).await?
    };

    let total_registrations: i64 = {
        use crate::db::schema::registrations::dsl::*;
        registrations
            .filter(status.ne(RegistrationStatus::Cancelled))
            .count()
            .get_result(&mut conn)
            .await?
    };

    let total_votes: i64 = {
        use crate::db::schema::votes::dsl::*;
        votes.count().get_result(&mut conn).await?
    };

    drop(conn);

    Ok(AdminStats {
        total_students: total_students as i32,
        total_registrations: total_registrations as i32,
        total_votes: total_votes as i32,
        top_games: get_top_games(ctx).await?,
    })
}
