//! Well-known IDs for integration tests that need stable references across
//! setup and assertions.

use once_cell::sync::Lazy;
use uuid::Uuid;

pub const TEST_WORKSPACE_ID: &str = "00000000-0000-0000-0000-000000000100";
pub const TEST_OWNER_USER_ID: &str = "00000000-0000-0000-0000-000000000001";
pub const TEST_EDITOR_USER_ID: &str = "00000000-0000-0000-0000-000000000002";
pub const TEST_READ_ONLY_USER_ID: &str = "00000000-0000-0000-0000-000000000003";

pub static TEST_WORKSPACE_UUID: Lazy<Uuid> = Lazy::new(|| Uuid::parse_str(TEST_WORKSPACE_ID).expect("invalid test workspace id"));
pub static TEST_OWNER_USER_UUID: Lazy<Uuid> = Lazy::new(|| Uuid::parse_str(TEST_OWNER_USER_ID).expect("invalid test owner id"));
pub static TEST_EDITOR_USER_UUID: Lazy<Uuid> = Lazy::new(|| Uuid::parse_str(TEST_EDITOR_USER_ID).expect("invalid test editor id"));
pub static TEST_READ_ONLY_USER_UUID: Lazy<Uuid> =
    Lazy::new(|| Uuid::parse_str(TEST_READ_ONLY_USER_ID).expect("invalid test read-only id"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_parse_correctly() {
        assert_eq!(*TEST_WORKSPACE_UUID, Uuid::parse_str(TEST_WORKSPACE_ID).unwrap());
        assert_eq!(*TEST_OWNER_USER_UUID, Uuid::parse_str(TEST_OWNER_USER_ID).unwrap());
    }
}
