// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use chrono::{DateTime, Utc};
use diesel::associations::Identifiable;
use diesel::prelude::*;
use juniper::GraphQLEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schema::*;

#[derive(
    diesel_derive_enum::DbEnum,
    Debug,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    Ord,
    PartialOrd,
    GraphQLEnum,
)]
#[DbValueStyle = "UPPERCASE"]
#[ExistingTypePath = "crate::db::schema::sql_types::UserRole"]
pub enum UserRole {
    Participant,
    Moderator,
    Admin,
}

#[derive(
    diesel_derive_enum::DbEnum,
    Debug,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    GraphQLEnum,
)]
#[DbValueStyle = "UPPERCASE"]
#[ExistingTypePath = "crate::db::schema::sql_types::GameCategory"]
pub enum GameCategory {
    Pc,
    Console,
    Board,
}

#[derive(
    diesel_derive_enum::DbEnum,
    Debug,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    GraphQLEnum,
)]
#[DbValueStyle = "UPPERCASE"]
#[ExistingTypePath = "crate::db::schema::sql_types::JoinRequestStatus"]
pub enum JoinRequestStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(
    diesel_derive_enum::DbEnum,
    Debug,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    GraphQLEnum,
)]
#[DbValueStyle = "UPPERCASE"]
#[ExistingTypePath = "crate::db::schema::sql_types::RegistrationType"]
pub enum RegistrationType {
    Individual,
    Team,
}

#[derive(
    diesel_derive_enum::DbEnum,
    Debug,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    GraphQLEnum,
)]
#[DbValueStyle = "UPPERCASE"]
#[ExistingTypePath = "crate::db::schema::sql_types::RegistrationStatus"]
pub enum RegistrationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

/* =========================
 * USERS
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Debug)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
}

/* =========================
 * SESSIONS
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Associations, Debug)]
#[diesel(table_name = sessions)]
#[diesel(belongs_to(User))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Session {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip_address: Option<ipnet::IpNet>,
    pub session_token: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = sessions)]
pub struct NewSession {
    pub user_id: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip_address: Option<ipnet::IpNet>,
    pub session_token: String,
}

/* =========================
 * STUDENTS
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = students)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Student {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub career: String,
    pub preferred_games: Vec<String>,
    pub favorite_console: Option<String>,
    pub game_rank: Option<String>,
    pub discord_username: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = students)]
pub struct NewStudent {
    pub email: String,
    pub full_name: String,
    pub career: String,
}

/* =========================
 * GAMES
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = games)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Game {
    pub id: i32,
    pub name: String,
    pub category: GameCategory,
    pub min_team_size: i32,
    pub max_team_size: i32,
    pub is_active: bool,
    pub votes_count: i32,
    pub created_at: DateTime<Utc>,
}

/* =========================
 * VOTES
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Associations, Debug)]
#[diesel(table_name = votes)]
#[diesel(belongs_to(Student))]
#[diesel(belongs_to(Game))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Vote {
    pub id: Uuid,
    pub student_id: Uuid,
    pub game_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = votes)]
pub struct NewVote {
    pub student_id: Uuid,
    pub game_id: i32,
}

/* =========================
 * TEAMS
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone)]
#[diesel(table_name = teams)]
#[diesel(belongs_to(Game))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub captain_id: Uuid,
    pub game_id: i32,
    pub category: GameCategory,
    pub is_complete: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = teams)]
pub struct NewTeam {
    pub name: String,
    pub captain_id: Uuid,
    pub game_id: i32,
    pub category: GameCategory,
    pub is_complete: bool,
}

/* =========================
 * TEAM MEMBERS
 * ========================= */

#[derive(Insertable, Debug)]
#[diesel(table_name = team_members)]
pub struct NewTeamMember {
    pub team_id: Uuid,
    pub student_id: Uuid,
}

/* =========================
 * TEAM JOIN REQUESTS
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Associations, Debug)]
#[diesel(table_name = team_join_requests)]
#[diesel(belongs_to(Team))]
#[diesel(belongs_to(Student))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TeamJoinRequest {
    pub id: Uuid,
    pub team_id: Uuid,
    pub student_id: Uuid,
    pub status: JoinRequestStatus,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decided_by: Option<Uuid>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = team_join_requests)]
pub struct NewTeamJoinRequest {
    pub team_id: Uuid,
    pub student_id: Uuid,
    pub status: JoinRequestStatus,
}

/* =========================
 * REGISTRATIONS
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Associations, Debug)]
#[diesel(table_name = registrations)]
#[diesel(belongs_to(Student))]
#[diesel(belongs_to(Game))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Registration {
    pub id: Uuid,
    pub student_id: Uuid,
    pub game_id: i32,
    pub team_id: Option<Uuid>,
    pub category: GameCategory,
    pub registration_type: RegistrationType,
    pub status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = registrations)]
pub struct NewRegistration {
    pub student_id: Uuid,
    pub game_id: i32,
    pub team_id: Option<Uuid>,
    pub category: GameCategory,
    pub registration_type: RegistrationType,
    pub status: RegistrationStatus,
}
