pub mod issue_credentials;
pub mod mint_bundle;
pub mod resolve_room_window;

#[cfg(test)]
pub(crate) mod test_support;
