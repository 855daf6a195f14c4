//! Identity delegation: bearer tokens issued by an external provider are
//! verified against its JWKS and turned into an [`model::AuthenticatedUser`].

mod jwks;
mod validator;

pub mod guards;
pub mod handlers;
pub mod model;
pub mod routes;

pub use jwks::JwksClient;
pub use validator::JwtValidator;
