//! Identifier generation for stored records and issued cards.

use rand::RngExt;
use uuid::Uuid;

/// Prefix printed in front of every student id.
pub const STUDENT_ID_PREFIX: &str = "GCMN-";

/// Number of digits after [`STUDENT_ID_PREFIX`].
pub const STUDENT_ID_DIGITS: usize = 6;

/// Generate a primary key for a new record of any collection.
///
/// Hyphenated UUID v4 (122 random bits). Callers must treat the value as opaque.
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a student id in the form `GCMN-######`.
///
/// Collisions are possible and never checked: the student id is a display field,
/// the card number is the unique credential.
pub fn new_student_id() -> String {
    let mut rng = rand::rng();
    let n: u32 = rng.random_range(0..1_000_000);
    format!("{STUDENT_ID_PREFIX}{n:0width$}", width = STUDENT_ID_DIGITS)
}
