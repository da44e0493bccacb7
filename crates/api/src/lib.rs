pub mod db;
pub mod graphql;
pub mod rules;
