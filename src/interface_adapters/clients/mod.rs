// Reqwest clients for the external identity-verification and
// credential-minting providers.
pub mod identity;
pub mod minting;
