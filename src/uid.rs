//! Generation of globally unique DICOM identifiers.
//!
//! UIDs are derived from random (version 4) UUIDs under the `2.25` root,
//! as described in PS3.5 B.2. No shared state is involved,
//! so concurrent callers never need to coordinate.
use uuid::Uuid;

/// Root for UUID-derived UIDs.
pub const UUID_UID_ROOT: &str = "2.25";

/// Maximum length of a UID value.
pub const MAX_UID_LENGTH: usize = 64;

/// Generate a new unique identifier.
pub fn generate_uid() -> String {
    format!("{UUID_UID_ROOT}.{}", Uuid::new_v4().as_u128())
}
