//! Networking modules for the backend-as-a-service and host server.
//!
//! SYSTEM CONTEXT
//! ==============
//! `auth` talks to the identity provider, `rest` to row storage, `api` to the
//! host server and assistant. `http` is the shared transport and `types`
//! defines the wire schema.

pub mod api;
pub mod auth;
pub mod error;
pub mod http;
pub mod rest;
pub mod types;
