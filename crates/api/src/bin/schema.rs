use juniper::{EmptySubscription, RootNode};

use tarreo_api::graphql::{Mutation, Query};

fn main() {
    let schema = RootNode::new(
        Query,
        Mutation,
        EmptySubscription::<tarreo_api::graphql::Context>::new(),
    );

    let result = schema.as_sdl();

    std::fs::write("schema.gql", result).expect("Unable to write schema file");
}
