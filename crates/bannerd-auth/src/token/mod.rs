//! Signed bearer tokens.

pub mod jwt;

pub use jwt::{Claims, JwtError, JwtService};
