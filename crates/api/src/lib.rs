//! HTTP API: REST resources, GraphQL endpoint and the login-gated index.

pub mod app;
pub mod context;
pub mod graphql;
pub mod middleware;
