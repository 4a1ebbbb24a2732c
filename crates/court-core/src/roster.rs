//! Roster mutation rules.

use crate::types::{Participant, ValidationError};

/// Check that `name` may be added to the roster.
///
/// Returns the trimmed name to store. Names are compared case-insensitively.
pub fn validate_new_participant(
    existing: &[Participant],
    name: &str,
) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::Empty { field: "name" });
    }

    let folded = name.to_lowercase();
    if existing.iter().any(|p| p.name.to_lowercase() == folded) {
        return Err(ValidationError::DuplicateName {
            name: name.to_string(),
        });
    }

    Ok(name.to_string())
}

/// Find a participant by numeric id, falling back to a case-insensitive name match.
///
/// An id match wins: a player named "3" is only reachable by name while no
/// player has id 3.
pub fn find_participant<'a>(participants: &'a [Participant], key: &str) -> Option<&'a Participant> {
    let key = key.trim();
    if let Ok(id) = key.parse::<i64>() {
        if let Some(found) = participants.iter().find(|p| p.id == id) {
            return Some(found);
        }
    }
    let folded = key.to_lowercase();
    participants.iter().find(|p| p.name.to_lowercase() == folded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Classification;

    fn roster() -> Vec<Participant> {
        vec![
            Participant {
                id: 1,
                name: "Linh".to_string(),
                classification: Classification::Regular,
            },
            Participant {
                id: 2,
                name: "Minh Anh".to_string(),
                classification: Classification::DropIn,
            },
        ]
    }

    #[test]
    fn accepts_new_name_and_trims_it() {
        assert_eq!(
            validate_new_participant(&roster(), "  Tuan "),
            Ok("Tuan".to_string())
        );
    }

    #[test]
    fn rejects_case_insensitive_duplicate() {
        let err = validate_new_participant(&roster(), "minh ANH").unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicateName {
                name: "minh ANH".to_string()
            }
        );
        assert_eq!(
            err.to_string(),
            "a participant named \"minh ANH\" already exists"
        );
    }

    #[test]
    fn rejects_blank_name() {
        assert_eq!(
            validate_new_participant(&roster(), "   "),
            Err(ValidationError::Empty { field: "name" })
        );
    }

    #[test]
    fn empty_roster_accepts_anything_nonblank() {
        assert!(validate_new_participant(&[], "Linh").is_ok());
    }

    #[test]
    fn finds_by_id_then_name() {
        let roster = roster();
        assert_eq!(find_participant(&roster, "2").map(|p| p.id), Some(2));
        assert_eq!(find_participant(&roster, "LINH").map(|p| p.id), Some(1));
        assert!(find_participant(&roster, "7").is_none());
        assert!(find_participant(&roster, "nobody").is_none());
    }

    #[test]
    fn numeric_key_prefers_id_over_name() {
        let mut roster = roster();
        roster.push(Participant {
            id: 3,
            name: "2".to_string(),
            classification: Classification::Regular,
        });
        assert_eq!(find_participant(&roster, "2").map(|p| p.id), Some(2));

        roster.remove(1);
        assert_eq!(find_participant(&roster, "2").map(|p| p.id), Some(3));
    }
}
