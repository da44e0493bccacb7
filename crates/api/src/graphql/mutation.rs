// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use juniper::{FieldResult, graphql_object};

use crate::db::models::{Registration, RegistrationStatus, RegistrationType, Team, TeamJoinRequest};
use crate::graphql::handlers::{self, sessions::SessionCredentials};

use super::Context;

pub struct Mutation;

#[graphql_object]
#[graphql(
    context = Context,
)]
impl Mutation {
    async fn login(
        context: &Context,
        email: String,
        password: String,
    ) -> FieldResult<SessionCredentials> {
        handlers::users::login_user(email, password, context).await
    }

    async fn create_user(
        context: &Context,
        email: String,
        display_name: String,
        password: String,
    ) -> FieldResult<bool> {
        handlers::users::create_user(email, display_name, password, context).await
    }

    async fn refresh_session(
        context: &Context,
        refresh_token: String,
    ) -> FieldResult<SessionCredentials> {
        handlers::sessions::refresh_session(context, refresh_token).await
    }

    async fn end_session(context: &Context, refresh_token: String) -> FieldResult<bool> {
        handlers::sessions::end_session(context, refresh_token).await
    }

    async fn update_profile(
        context: &Context,
        input: handlers::students::ProfileInput,
    ) -> FieldResult<crate::db::models::Student> {
        handlers::students::update_profile(context, input).await
    }

    async fn toggle_vote(
        context: &Context,
        game_id: i32,
    ) -> FieldResult<handlers::votes::ToggleVoteResult> {
        handlers::votes::toggle_vote(context, game_id).await
    }

    async fn create_team(context: &Context, game_id: i32, name: String) -> FieldResult<Team> {
        handlers::teams::create_team(context, game_id, name).await
    }

    async fn request_to_join(context: &Context, team_id: String) -> FieldResult<TeamJoinRequest> {
        let team_id = uuid::Uuid::parse_str(&team_id)?;
        handlers::join_requests::request_to_join(context, team_id).await
    }

    async fn approve_request(
        context: &Context,
        request_id: String,
    ) -> FieldResult<TeamJoinRequest> {
        let request_id = uuid::Uuid::parse_str(&request_id)?;
        handlers::join_requests::approve_request(context, request_id).await
    }

    async fn reject_request(context: &Context, request_id: String) -> FieldResult<TeamJoinRequest> {
        let request_id = uuid::Uuid::parse_str(&request_id)?;
        handlers::join_requests::reject_request(context, request_id).await
    }

    async fn register(
        context: &Context,
        game_id: i32,
        registration_type: RegistrationType,
        team_name: Option<String>,
    ) -> FieldResult<Registration> {
        handlers::registrations::register(context, game_id, registration_type, team_name).await
    }

    async fn cancel_registration(context: &Context, registration_id: String) -> FieldResult<bool> {
        let registration_id = uuid::Uuid::parse_str(&registration_id)?;
        handlers::registrations::cancel_registration(context, registration_id).await
    }

    async fn set_registration_status(
        context: &Context,
        registration_id: String,
        status: RegistrationStatus,
    ) -> FieldResult<Registration> {
        let registration_id = uuid::Uuid::parse_str(&registration_id)?;
        handlers::registrations::set_registration_status(context, registration_id, status).await
    }

    async fn set_voting_enabled(context: &Context, enabled: bool) -> FieldResult<bool> {
        handlers::admin::set_voting_enabled(context, enabled).await
    }
}
