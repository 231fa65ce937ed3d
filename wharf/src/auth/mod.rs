//! Request gate for write routes.
//!
//! The dashboard talks to this service with a static API token. Every route that
//! changes state (upload, admin creates, file deletion) sits behind
//! [`middleware::require_api_token`]; reads are open.
//!
//! Tokens are presented as `Authorization: Bearer <token>` or `X-Api-Key: <token>`
//! and compared against `auth.api_tokens` from the configuration. An empty token
//! list disables the gate, which is logged as a warning at startup.
//!
//! Session management and per-user authentication are handled by the dashboard
//! itself and are not part of this service.

pub mod middleware;
