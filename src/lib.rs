//! Session and field-encryption core of a single-user markdown notes service.
//!
//! Two stateless pieces do the security work: [`services::token`] issues and
//! verifies cookie-borne HS256 session tokens, and [`crypto::envelope`] seals
//! note fields in AES-256-GCM envelopes for transport. The rest is the axum
//! plumbing that calls them.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub mod crypto {
    pub mod csrf;
    pub mod envelope;
    pub mod password;
}

pub mod models {
    pub mod session;
}

pub mod services {
    pub mod auth;
    pub mod token;
}

pub mod handlers {
    pub mod auth;
    pub mod fields;
    pub mod health;
}

pub mod middleware_layer {
    pub mod auth;
    pub mod csrf;
}

pub mod validation {
    pub mod auth;
}
