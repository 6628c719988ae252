//! Generic CRUD resource client for the admin dashboard.
//!
//! # Overview
//! One configurable client serves every dashboard entity (goals, sales
//! review, products, tickets, commerce products). Requests are built and
//! responses parsed without touching the network (host-does-IO pattern); a
//! `Transport` performs the round-trip.
//!
//! # Design
//! - `ResourceConfig` describes an entity: path, id field, form fields.
//! - `ResourceClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`.
//! - Credentials come from an injected `CredentialProvider`, never from
//!   global state.
//! - `ListController`, `FormController` and `BulkActions` hold the UI-side
//!   state and drive the client through any `Transport`.

pub mod api;
pub mod auth;
pub mod catalog;
pub mod client;
pub mod config;
pub mod controller;
pub mod disposition;
pub mod error;
pub mod filters;
pub mod http;
pub mod resource;
pub mod transport;
pub mod types;

pub use api::ResourceApi;
pub use auth::{CredentialProvider, NoCredentials, StaticToken, TokenStore};
pub use client::ResourceClient;
pub use config::{ClientConfig, ConfigError};
pub use controller::{BulkActions, BulkOutcome, FormController, FormMode, ListController};
pub use error::ApiError;
pub use filters::Filters;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use resource::{Field, FieldKind, ResourceConfig};
pub use transport::{Transport, UreqTransport};
pub use types::{Export, Page, Record, RecordId};
