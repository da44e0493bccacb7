// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use juniper::graphql_object;

use crate::db::models::{Game, GameCategory};
use crate::graphql::Context;

#[graphql_object]
#[graphql(context = Context)]
impl Game {
    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> GameCategory {
        self.category
    }

    pub fn min_team_size(&self) -> i32 {
        self.min_team_size
    }

    pub fn max_team_size(&self) -> i32 {
        self.max_team_size
    }

    pub fn votes_count(&self) -> i32 {
        self.votes_count
    }
}

/// Active catalog entries, optionally narrowed to one category. Served
/// from the shared cache; the catalog is organizer-managed and changes
/// rarely.
pub async fn get_games(
    ctx: &Context,
    category: Option<GameCategory>,
) -> juniper::FieldResult<Vec<Game>> {
    let games = ctx.active_games().await?;

    Ok(match category {
        Some(wanted) => games.into_iter().filter(|g| g.category == wanted).collect(),
        None => games,
    })
}
