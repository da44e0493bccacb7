// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use diesel::prelude::*;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl, scoped_futures::ScopedFutureExt};
use juniper::{FieldResult, graphql_object};

use crate::db::models::{
    Game, JoinRequestStatus, NewTeamJoinRequest, NewTeamMember, Student, Team, TeamJoinRequest,
};
use crate::graphql::Context;
use crate::rules::{self, RuleViolation};

use super::TxError;

#[graphql_object]
#[graphql(context = Context)]
impl TeamJoinRequest {
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub fn status(&self) -> JoinRequestStatus {
        self.status
    }

    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at
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

    pub async fn team(&self, ctx: &Context) -> FieldResult<Team> {
        use crate::db::schema::teams::dsl::*;

        let record = teams
            .filter(id.eq(self.team_id))
            .select(Team::as_select())
            .first::<Team>(&mut ctx.get_db_conn().await)
            .await?;

        Ok(record)
    }
}

async fn load_request_for_update(
    conn: &mut AsyncPgConnection,
    request_id: uuid::Uuid,
) -> Result<(TeamJoinRequest, Team, Game, i64), TxError> {
    // Lock the request row so two captains (or a double click) cannot
    // decide the same request twice.
    let request = {
        use crate::db::schema::team_join_requests::dsl::*;
        team_join_requests
            .filter(id.eq(request_id))
            .select(TeamJoinRequest::as_select())
            .for_update()
            .first::<TeamJoinRequest>(conn)
            .await
            .optional()?
            .ok_or(RuleViolation::NotFound)?
    };

    // The team row is the serialization point for capacity: two
    // approvals of different requests for the same team must not both
    // read the pre-insert member count.
    let team = {
        use crate::db::schema::teams::dsl::*;
        teams
            .filter(id.eq(request.team_id))
            .select(Team::as_select())
            .for_update()
            .first::<Team>(conn)
            .await?
    };

    let game = {
        use crate::db::schema::games::dsl::*;
        games
            .filter(id.eq(team.game_id))
            .select(Game::as_select())
            .first::<Game>(conn)
            .await?
    };

    let member_count: i64 = {
        use crate::db::schema::team_members::dsl::*;
        team_members
            .filter(team_id.eq(team.id))
            .count()
            .get_result(conn)
            .await?
    };

    Ok((request, team, game, member_count))
}

pub async fn request_to_join(ctx: &Context, team_id_input: uuid::Uuid) -> FieldResult<TeamJoinRequest> {
    let current_user = ctx.require_authentication()?;
    let student = super::students::ensure_student_record(ctx, &current_user).await?;
    let requester = student.id;

    let mut conn = ctx.get_db_conn().await;
    let request = conn
        .transaction::<_, TxError, _>(|conn| {
            async move {
                // Same team-row lock as the approval path, so the
                // capacity check here cannot race a membership insert.
                let team = {
                    use crate::db::schema::teams::dsl::*;
                    teams
                        .filter(id.eq(team_id_input))
                        .select(Team::as_select())
                        .for_update()
                        .first::<Team>(conn)
                        .await
                        .optional()?
                        .ok_or(RuleViolation::NotFound)?
                };

                let game = {
                    use crate::db::schema::games::dsl::*;
                    games
                        .filter(id.eq(team.game_id))
                        .select(Game::as_select())
                        .first::<Game>(conn)
                        .await?
                };

                let member_count: i64 = {
                    use crate::db::schema::team_members::dsl::*;
                    team_members
                        .filter(team_id.eq(team.id))
                        .count()
                        .get_result(conn)
                        .await?
                };

                let is_member: i64 = {
                    use crate::db::schema::team_members::dsl::*;
                    team_members
                        .filter(team_id.eq(team.id))
                        .filter(student_id.eq(requester))
                        .count()
                        .get_result(conn)
                        .await?
                };

                // Only still-pending requests block a new one; a
                // rejected row never does.
                let has_pending: i64 = {
                    use crate::db::schema::team_join_requests::dsl::*;
                    team_join_requests
                        .filter(team_id.eq(team.id))
                        .filter(student_id.eq(requester))
                        .filter(status.eq(JoinRequestStatus::Pending))
                        .count()
                        .get_result(conn)
                        .await?
                };

                rules::check_join_request(
                    member_count,
                    game.max_team_size,
                    is_member > 0,
                    has_pending > 0,
                )?;

                let inserted = {
                    use crate::db::schema::team_join_requests::dsl::*;
                    diesel::insert_into(team_join_requests)
                        .values(NewTeamJoinRequest {
                            team_id: team.id,
                            student_id: requester,
                            status: JoinRequestStatus::Pending,
                        })
                        .returning(TeamJoinRequest::as_returning())
                        .get_result::<TeamJoinRequest>(conn)
                        .await?
                };

                Ok(inserted)
            }
            .scope_boxed()
        })
        .await?;

    Ok(request)
}

/// Approve a pending request: mark it approved, enroll the requester,
/// and refresh the team's completeness flag, all in one transaction.
pub async fn approve_request(ctx: &Context, request_id: uuid::Uuid) -> FieldResult<TeamJoinRequest> {
    let current_user = ctx.require_authentication()?;
    let actor = super::students::ensure_student_record(ctx, &current_user).await?;
    let actor_id = actor.id;

    let mut conn = ctx.get_db_conn().await;
    let approved = conn
        .transaction::<_, TxError, _>(|conn| {
            async move {
                let (request, team, game, member_count) =
                    load_request_for_update(conn, request_id).await?;

                rules::check_approval(
                    team.captain_id,
                    actor_id,
                    request.status,
                    member_count,
                    game.max_team_size,
                )?;

                let updated = {
                    use crate::db::schema::team_join_requests::dsl::*;
                    diesel::update(team_join_requests.filter(id.eq(request.id)))
                        .set((
                            status.eq(JoinRequestStatus::Approved),
                            decided_at.eq(chrono::Utc::now()),
                            decided_by.eq(Some(actor_id)),
                        ))
                        .returning(TeamJoinRequest::as_returning())
                        .get_result::<TeamJoinRequest>(conn)
                        .await?
                };

                {
                    use crate::db::schema::team_members::dsl::*;
                    diesel::insert_into(team_members)
                        .values(NewTeamMember {
                            team_id: team.id,
                            student_id: request.student_id,
                        })
                        .execute(conn)
                        .await?;
                }

                {
                    use crate::db::schema::teams::dsl::*;
                    diesel::update(teams.filter(id.eq(team.id)))
                        .set(is_complete.eq(rules::team_is_complete(
                            member_count + 1,
                            game.max_team_size,
                        )))
                        .execute(conn)
                        .await?;
                }

                Ok(updated)
            }
            .scope_boxed()
        })
        .await?;

    Ok(approved)
}

/// Reject a pending request. The row is kept with status `Rejected` so
/// captains keep a record; the requester may ask again.
pub async fn reject_request(ctx: &Context, request_id: uuid::Uuid) -> FieldResult<TeamJoinRequest> {
    let current_user = ctx.require_authentication()?;
    let actor = super::students::ensure_student_record(ctx, &current_user).await?;
    let actor_id = actor.id;

    let mut conn = ctx.get_db_conn().await;
    let rejected = conn
        .transaction::<_, TxError, _>(|conn| {
            async move {
                let (request, team, _game, _member_count) =
                    load_request_for_update(conn, request_id).await?;

                rules::check_rejection(team.captain_id, actor_id, request.status)?;

                let updated = {
                    use crate::db::schema::team_join_requests::dsl::*;
                    diesel::update(team_join_requests.filter(id.eq(request.id)))
                        .set((
                            status.eq(JoinRequestStatus::Rejected),
                            decided_at.eq(chrono::Utc::now()),
                            decided_by.eq(Some(actor_id)),
                        ))
                        .returning(TeamJoinRequest::as_returning())
                        .get_result::<TeamJoinRequest>(conn)
                        .await?
                };

                Ok(updated)
            }
            .scope_boxed()
        })
        .await?;

    Ok(rejected)
}

/// Requests the current participant has sent and which are still open.
pub async fn get_my_requests(ctx: &Context) -> FieldResult<Vec<TeamJoinRequest>> {
    let Some(current_user) = &ctx.user else {
        return Ok(Vec::new());
    };

    use crate::db::schema::{students, team_join_requests};

    let records = team_join_requests::table
        .inner_join(students::table)
        .filter(students::email.eq(&current_user.email))
        .filter(team_join_requests::status.eq(JoinRequestStatus::Pending))
        .select(TeamJoinRequest::as_select())
        .load::<TeamJoinRequest>(&mut ctx.get_db_conn().await)
        .await?;

    Ok(records)
}

/// Open requests against teams the current participant captains.
pub async fn get_incoming_requests(ctx: &Context) -> FieldResult<Vec<TeamJoinRequest>> {
    let current_user = ctx.require_authentication()?;
    let student = super::students::ensure_student_record(ctx, &current_user).await?;

    use crate::db::schema::{team_join_requests, teams};

    let records = team_join_requests::table
        .inner_join(teams::table)
        .filter(teams::captain_id.eq(student.id))
        .filter(team_join_requests::status.eq(JoinRequestStatus::Pending))
        .order(team_join_requests::created_at.asc())
        .select(TeamJoinRequest::as_select())
        .load::<TeamJoinRequest>(&mut ctx.get_db_conn().await)
        .await?;

    Ok(records)
}
