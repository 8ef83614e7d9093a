//! CRA Client - Probable Futures dataset access
//!
//! Implements [`cra_core::ScenarioSource`] against the remote provider:
//! - OAuth client-credentials exchange for a bearer token
//! - Parameterized GraphQL mutation per location and scenario
//! - Lenient decoding of the returned statistic rows
//!
//! Every query performs a fresh token exchange. The HTTP layer sits behind
//! the [`Transport`] trait so the whole stack can run against scripted
//! responses.

#![warn(unreachable_pub)]

pub mod client;
pub mod config;
pub mod query;
pub mod token;
pub mod transport;

pub use client::DatasetClient;
pub use config::{ClientConfig, DEFAULT_API_URL, DEFAULT_AUDIENCE, DEFAULT_TOKEN_URL};
pub use query::{DatasetQueryBuilder, QueryPayload, QueryVariables, DATASET_STATISTICS_MUTATION};
pub use token::{Token, TokenProvider};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
