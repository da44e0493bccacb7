// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl, scoped_futures::ScopedFutureExt};
use juniper::{FieldResult, GraphQLObject, graphql_object};

use crate::db::models::{Game, GameCategory, NewVote, Vote};
use crate::graphql::Context;
use crate::rules::{self, RuleViolation, VoteOutcome};

use super::TxError;

#[graphql_object]
#[graphql(context = Context)]
impl Vote {
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub fn game_id(&self) -> i32 {
        self.game_id
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
}

#[derive(GraphQLObject)]
pub struct ToggleVoteResult {
    pub outcome: VoteOutcome,
    pub votes_count: i32,
}

/// Cast or retract a vote for a game.
///
/// The vote row and the denormalized counter on the game move in one
/// transaction, so two sessions toggling the same game concurrently
/// cannot leave the counter out of sync with the rows.
pub async fn toggle_vote(ctx: &Context, game_id_input: i32) -> FieldResult<ToggleVoteResult> {
    let current_user = ctx.require_authentication()?;
    let student = super::students::ensure_student_record(ctx, &current_user).await?;
    let voter_id = student.id;

    let mut conn = ctx.get_db_conn().await;
    let (outcome, new_count) = conn
        .transaction::<_, TxError, _>(|conn| {
            async move {
                // Serialize this participant's toggles: two concurrent
                // casts must not both count the same quota snapshot.
                {
                    use crate::db::schema::students::dsl::*;
                    students
                        .filter(id.eq(voter_id))
                        .select(id)
                        .for_update()
                        .first::<uuid::Uuid>(conn)
                        .await?;
                }

                let voting_enabled = super::admin::voting_enabled_on(conn).await?;

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

                let already_voted = {
                    use crate::db::schema::votes::dsl::*;
                    let count: i64 = votes
                        .filter(student_id.eq(voter_id))
                        .filter(game_id.eq(game.id))
                        .count()
                        .get_result(conn)
                        .await?;
                    count > 0
                };

                let pc_votes: i64 = {
                    use crate::db::schema::{games, votes};
                    votes::table
                        .inner_join(games::table)
                        .filter(votes::student_id.eq(voter_id))
                        .filter(games::category.eq(GameCategory::Pc))
                        .count()
                        .get_result(conn)
                        .await?
                };

                let outcome =
                    rules::decide_vote(voting_enabled, already_voted, game.category, pc_votes)?;

                let new_count = match outcome {
                    VoteOutcome::Retracted => {
                        {
                            use crate::db::schema::votes::dsl::*;
                            diesel::delete(
                                votes
                                    .filter(student_id.eq(voter_id))
                                    .filter(game_id.eq(game.id)),
                            )
                            .execute(conn)
                            .await?;
                        }
                        use crate::db::schema::games::dsl::*;
                        diesel::update(games.filter(id.eq(game.id)))
                            .set(votes_count.eq(votes_count - 1))
                            .returning(votes_count)
                            .get_result::<i32>(conn)
                            .await?
                    }
                    VoteOutcome::Cast => {
                        {
                            use crate::db::schema::votes::dsl::*;
                            diesel::insert_into(votes)
                                .values(NewVote {
                                    student_id: voter_id,
                                    game_id: game.id,
                                })
                                .execute(conn)
                                .await?;
                        }
                        use crate::db::schema::games::dsl::*;
                        diesel::update(games.filter(id.eq(game.id)))
                            .set(votes_count.eq(votes_count + 1))
                            .returning(votes_count)
                            .get_result::<i32>(conn)
                            .await?
                    }
                };

                Ok((outcome, new_count))
            }
            .scope_boxed()
        })
        .await?;

    Ok(ToggleVoteResult {
        outcome,
        votes_count: new_count,
    })
}

pub async fn get_my_votes(ctx: &Context) -> FieldResult<Vec<Vote>> {
    let Some(current_user) = &ctx.user else {
        return Ok(Vec::new());
    };

    use crate::db::schema::{students, votes};

    let records = votes::table
        .inner_join(students::table)
        .filter(students::email.eq(&current_user.email))
        .select(Vote::as_select())
        .load::<Vote>(&mut ctx.get_db_conn().await)
        .await?;

    Ok(records)
}
