// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use juniper::graphql_object;

use crate::db::models::{
    Game, GameCategory, Registration, Student, Team, TeamJoinRequest, User, Vote,
};
use crate::graphql::handlers;

use super::Context;

pub struct Query;

#[graphql_object]
#[graphql(context = Context)]
impl Query {
    fn is_authenticated(context: &Context) -> bool {
        context.is_authenticated()
    }

    async fn me(context: &Context) -> juniper::FieldResult<Option<User>> {
        handlers::users::get_current_user(context).await
    }

    async fn users(context: &Context) -> juniper::FieldResult<Vec<User>> {
        handlers::users::get_all_users(context).await
    }

    async fn my_profile(context: &Context) -> juniper::FieldResult<Option<Student>> {
        handlers::students::get_my_profile(context).await
    }

    async fn participants(context: &Context) -> juniper::FieldResult<Vec<Student>> {
        handlers::students::get_participants(context).await
    }

    async fn games(
        context: &Context,
        category: Option<GameCategory>,
    ) -> juniper::FieldResult<Vec<Game>> {
        handlers::games::get_games(context, category).await
    }

    async fn my_votes(context: &Context) -> juniper::FieldResult<Vec<Vote>> {
        handlers::votes::get_my_votes(context).await
    }

    async fn teams(
        context: &Context,
        category: Option<GameCategory>,
    ) -> juniper::FieldResult<Vec<Team>> {
        handlers::teams::get_teams(context, category).await
    }

    async fn team(context: &Context, team_id: String) -> juniper::FieldResult<Option<Team>> {
        let team_id = uuid::Uuid::parse_str(&team_id)?;
        handlers::teams::get_team(context, team_id).await
    }

    async fn my_join_requests(context: &Context) -> juniper::FieldResult<Vec<TeamJoinRequest>> {
        handlers::join_requests::get_my_requests(context).await
    }

    async fn incoming_join_requests(
        context: &Context,
    ) -> juniper::FieldResult<Vec<TeamJoinRequest>> {
        handlers::join_requests::get_incoming_requests(context).await
    }

    async fn my_registrations(context: &Context) -> juniper::FieldResult<Vec<Registration>> {
        handlers::registrations::get_my_registrations(context).await
    }

    async fn all_registrations(context: &Context) -> juniper::FieldResult<Vec<Registration>> {
        handlers::registrations::get_all_registrations(context).await
    }

    async fn voting_enabled(context: &Context) -> juniper::FieldResult<bool> {
        handlers::admin::is_voting_enabled(context).await
    }

    async fn results(
        context: &Context,
    ) -> juniper::FieldResult<Vec<handlers::admin::GameVoteTally>> {
        handlers::admin::get_results(context).await
    }

    async fn admin_stats(context: &Context) -> juniper::FieldResult<handlers::admin::AdminStats> {
        handlers::admin::get_admin_stats(context).await
    }
}
