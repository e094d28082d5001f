//! Auth-domain models produced by the pipeline: issued credentials and redacted secrets.

pub mod credentials;
pub mod secret;

pub use credentials::*;
pub use secret::*;
