//! Library card number derivation.
//!
//! A card number reads `{field code}-{roll number}-{class digits}`, optionally
//! followed by `-{n}` when an earlier card already holds the base form.

use std::fmt;

/// Two or three letter code for an academic field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldCode {
    ComputerScience,
    Commerce,
    Humanities,
    PreEngineering,
    PreMedical,
    Unknown,
}

impl FieldCode {
    /// Map a field name to its code. Matching is exact; anything else is `XX`.
    pub fn from_field(field: Option<&str>) -> Self {
        match field {
            Some("Computer Science") => Self::ComputerScience,
            Some("Commerce") => Self::Commerce,
            Some("Humanities") => Self::Humanities,
            Some("Pre-Engineering") => Self::PreEngineering,
            Some("Pre-Medical") => Self::PreMedical,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ComputerScience => "CS",
            Self::Commerce => "COM",
            Self::Humanities => "HM",
            Self::PreEngineering => "PE",
            Self::PreMedical => "PM",
            Self::Unknown => "XX",
        }
    }
}

impl fmt::Display for FieldCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First run of ASCII digits in `class` ("Class 12" -> "12").
///
/// A class name without digits ("ADS I") is used as-is, trimmed.
pub fn class_digits(class: &str) -> &str {
    let Some(start) = class.find(|c: char| c.is_ascii_digit()) else {
        return class.trim();
    };
    let rest = &class[start..];
    let len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    &rest[..len]
}

/// Compose the card number before any collision suffix is applied.
pub fn base_card_number(field: Option<&str>, roll_no: &str, class: &str) -> String {
    format!(
        "{}-{}-{}",
        FieldCode::from_field(field),
        roll_no.trim(),
        class_digits(class)
    )
}

/// Candidate card numbers in the order they are tried: the base form, then
/// `base-1`, `base-2`, and so on.
#[derive(Debug, Clone)]
pub struct CardNumberCandidates {
    base: String,
    next_suffix: u32,
}

impl CardNumberCandidates {
    pub fn new(base: String) -> Self {
        Self {
            base,
            next_suffix: 0,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

impl Iterator for CardNumberCandidates {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let suffix = self.next_suffix;
        self.next_suffix = self.next_suffix.checked_add(1)?;
        if suffix == 0 {
            Some(self.base.clone())
        } else {
            Some(format!("{}-{suffix}", self.base))
        }
    }
}
