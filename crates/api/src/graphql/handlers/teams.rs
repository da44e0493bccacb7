// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use diesel::prelude::*;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl, scoped_futures::ScopedFutureExt};
use juniper::{FieldResult, graphql_object};

use crate::db::models::{Game, GameCategory, NewTeam, NewTeamMember, Student, Team};
use crate::graphql::Context;
use crate::rules::{self, RuleViolation};

use super::TxError;

#[graphql_object]
#[graphql(context = Context)]
impl Team {
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> GameCategory {
        self.category
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub async fn game(&self, ctx: &Context) -> FieldResult<Option<Game>> {
        use crate::db::schema::games::dsl::*;

        let record = games
            .filter(id.eq(self.game_id))
            .select(Game::as_select())
            .first::<Game>(&mut ctx.get_db_conn().await)
            .await
            .optional()?;

        Ok(record)
    }

    pub async fn captain(&self, ctx: &Context) -> FieldResult<Student> {
        use crate::db::schema::students::dsl::*;

        let record = students
            .filter(id.eq(self.captain_id))
            .select(Student::as_select())
            .first::<Student>(&mut ctx.get_db_conn().await)
            .await?;

        Ok(record)
    }

    pub async fn members(&self, ctx: &Context) -> FieldResult<Vec<Student>> {
        use crate::db::schema::{students, team_members};

        let records = team_members::table
            .inner_join(students::table)
            .filter(team_members::team_id.eq(self.id))
            .select(Student::as_select())
            .load::<Student>(&mut ctx.get_db_conn().await)
            .await?;

        Ok(records)
    }

    pub async fn member_count(&self, ctx: &Context) -> FieldResult<i32> {
        use crate::db::schema::team_members::dsl::*;

        let count: i64 = team_members
            .filter(team_id.eq(self.id))
            .count()
            .get_result(&mut ctx.get_db_conn().await)
            .await?;

        Ok(count as i32)
    }
}

/// Insert a team and auto-enroll the captain as its first member.
/// Callers are responsible for running this inside a transaction.
pub(super) async fn insert_team_with_captain(
    conn: &mut AsyncPgConnection,
    game: &Game,
    captain: uuid::Uuid,
    team_name: String,
) -> Result<Team, TxError> {
    let already_captain: i64 = {
        use crate::db::schema::teams::dsl::*;
        teams
            .filter(captain_id.eq(captain))
            .filter(game_id.eq(game.id))
            .count()
            .get_result(conn)
            .await?
    };
    if already_captain > 0 {
        return Err(RuleViolation::AlreadyCaptain.into());
    }

    let inserted = {
        use crate::db::schema::teams::dsl::*;
        diesel::insert_into(teams)
            .values(NewTeam {
                name: team_name,
                captain_id: captain,
                game_id: game.id,
                category: game.category,
                // A solo game's "team" is complete the moment it exists.
                is_complete: rules::team_is_complete(1, game.max_team_size),
            })
            .returning(Team::as_returning())
            .get_result::<Team>(conn)
            .await?
    };

    {
        use crate::db::schema::team_members::dsl::*;
        diesel::insert_into(team_members)
            .values(NewTeamMember {
                team_id: inserted.id,
                student_id: captain,
            })
            .execute(conn)
            .await?;
    }

    Ok(inserted)
}

pub async fn create_team(ctx: &Context, game_id_input: i32, name: String) -> FieldResult<Team> {
    let current_user = ctx.require_authentication()?;
    let student = super::students::ensure_student_record(ctx, &current_user).await?;
    let captain = student.id;

    if name.trim().is_empty() {
        return Err(juniper::FieldError::new(
            "Team name must not be empty",
            juniper::Value::null(),
        ));
    }

    let mut conn = ctx.get_db_conn().await;
    let team = conn
        .transaction::<_, TxError, _>(|conn| {
            async move {
                let game = {
                    use crate::db::schema::games::dsl::*;
                    games
                        .filter(id.eq(game_id_input))
                        .filter(is_active.eq(true))
                        .select(Game::as_select())
                        .first::<Game>(conn)
                        .await
                        .optional()?
                        .ok_or(RuleViolation::GameInactive)?
                };

                insert_team_with_captain(conn, &game, captain, name).await
            }
            .scope_boxed()
        })
        .await?;

    Ok(team)
}

pub async fn get_teams(ctx: &Context, category: Option<GameCategory>) -> FieldResult<Vec<Team>> {
    use crate::db::schema::teams::dsl::{created_at, teams};

    let query = teams
        .order(created_at.desc())
        .select(Team::as_select())
        .into_boxed();

    let query = match category {
        Some(wanted) => query.filter(crate::db::schema::teams::category.eq(wanted)),
        None => query,
    };

    let records = query
        .load::<Team>(&mut ctx.get_db_conn().await)
        .await?;

    Ok(records)
}

pub async fn get_team(ctx: &Context, team_id: uuid::Uuid) -> FieldResult<Option<Team>> {
    use crate::db::schema::teams::dsl::*;

    let record = teams
        .filter(id.eq(team_id))
        .select(Team::as_select())
        .first::<Team>(&mut ctx.get_db_conn().await)
        .await
        .optional()?;

    Ok(record)
}
