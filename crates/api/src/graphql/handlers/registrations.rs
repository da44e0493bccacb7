// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl, scoped_futures::ScopedFutureExt};
use juniper::{FieldResult, graphql_object};

use crate::db::models::{
    Game, GameCategory, NewRegistration, Registration, RegistrationStatus, RegistrationType,
    Student, Team, UserRole,
};
use crate::graphql::Context;
use crate::rules::RuleViolation;

use super::TxError;

#[graphql_object]
#[graphql(context = Context)]
impl Registration {
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub fn category(&self) -> GameCategory {
        self.category
    }

    pub fn registration_type(&self) -> RegistrationType {
        self.registration_type
    }

    pub fn status(&self) -> RegistrationStatus {
        self.status
    }

    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at
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

    pub async fn student(&self, ctx: &Context) -> FieldResult<Student> {
        use crate::db::schema::students::dsl::*;

        let record = students
            .filter(id.eq(self.student_id))
            .select(Student::as_select())
            .first::<Student>(&mut ctx.get_db_conn().await)
            .await?;

        Ok(record)
    }

    pub async fn team(&self, ctx: &Context) -> FieldResult<Option<Team>> {
        let Some(team_id_val) = self.team_id else {
            return Ok(None);
        };

        use crate::db::schema::teams::dsl::*;

        let record = teams
            .filter(id.eq(team_id_val))
            .select(Team::as_select())
            .first::<Team>(&mut ctx.get_db_conn().await)
            .await
            .optional()?;

        Ok(record)
    }
}

/// Sign the participant up for a game's tournament. Team registrations
/// create the team (captain auto-enrolled) in the same transaction as
/// the registration row.
pub async fn register(
    ctx: &Context,
    game_id_input: i32,
    registration_type: RegistrationType,
    team_name: Option<String>,
) -> FieldResult<Registration> {
    let current_user = ctx.require_authentication()?;
    let student = super::students::ensure_student_record(ctx, &current_user).await?;
    let registrant = student.id;

    let mut conn = ctx.get_db_conn().await;
    let registration = conn
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

                let active_registrations: i64 = {
                    use crate::db::schema::registrations::dsl::*;
                    registrations
                        .filter(student_id.eq(registrant))
                        .filter(game_id.eq(game.id))
                        .filter(status.ne(RegistrationStatus::Cancelled))
                        .count()
                        .get_result(conn)
                        .await?
                };
                if active_registrations > 0 {
                    return Err(RuleViolation::AlreadyRegistered.into());
                }

                let team_id_val =
                    if registration_type == RegistrationType::Team && game.max_team_size > 1 {
                        let name = match team_name
                            .as_deref()
                            .map(str::trim)
                            .filter(|n| !n.is_empty())
                        {
                            Some(n) => n.to_string(),
                            None => return Err(RuleViolation::TeamNameRequired.into()),
                        };
                        let team =
                            super::teams::insert_team_with_captain(conn, &game, registrant, name)
                                .await?;
                        Some(team.id)
                    } else {
                        None
                    };

                let inserted = {
                    use crate::db::schema::registrations::dsl::registrations;
                    diesel::insert_into(registrations)
                        .values(NewRegistration {
                            student_id: registrant,
                            game_id: game.id,
                            team_id: team_id_val,
                            category: game.category,
                            registration_type,
                            status: RegistrationStatus::Pending,
                        })
                        .returning(Registration::as_returning())
                        .get_result::<Registration>(conn)
                        .await?
                };

                Ok(inserted)
            }
            .scope_boxed()
        })
        .await?;

    Ok(registration)
}

/// Participants may cancel their own registration; any other status
/// change is an administrative action.
pub async fn cancel_registration(ctx: &Context, registration_id: uuid::Uuid) -> FieldResult<bool> {
    let current_user = ctx.require_authentication()?;
    let student = super::students::ensure_student_record(ctx, &current_user).await?;

    use crate::db::schema::registrations::dsl::*;

    let changed = diesel::update(
        registrations
            .filter(id.eq(registration_id))
            .filter(student_id.eq(student.id)),
    )
    .set(status.eq(RegistrationStatus::Cancelled))
    .execute(&mut ctx.get_db_conn().await)
    .await?;

    if changed == 0 {
        return Err(RuleViolation::NotFound.into());
    }

    Ok(true)
}

pub async fn get_my_registrations(ctx: &Context) -> FieldResult<Vec<Registration>> {
    let Some(current_user) = &ctx.user else {
        return Ok(Vec::new());
    };

    use crate::db::schema::{registrations, students};

    let records = registrations::table
        .inner_join(students::table)
        .filter(students::email.eq(&current_user.email))
        .order(registrations::created_at.desc())
        .select(Registration::as_select())
        .load::<Registration>(&mut ctx.get_db_conn().await)
        .await?;

    Ok(records)
}

pub async fn get_all_registrations(ctx: &Context) -> FieldResult<Vec<Registration>> {
    ctx.require_role_min(UserRole::Moderator)?;

    use crate::db::schema::registrations::dsl::*;

    let records = registrations
        .order(created_at.desc())
        .select(Registration::as_select())
        .load::<Registration>(&mut ctx.get_db_conn().await)
        .await?;

    Ok(records)
}

pub async fn set_registration_status(
    ctx: &Context,
    registration_id: uuid::Uuid,
    new_status: RegistrationStatus,
) -> FieldResult<Registration> {
    ctx.require_role_min(UserRole::Moderator)?;

    use crate::db::schema::registrations::dsl::*;

    let updated = diesel::update(registrations.filter(id.eq(registration_id)))
        .set(status.eq(new_status))
        .returning(Registration::as_returning())
        .get_result::<Registration>(&mut ctx.get_db_conn().await)
        .await
        .optional()?
        .ok_or(RuleViolation::NotFound)?;

    Ok(updated)
}
