use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Error ─────────────────────────────────────────────────────────────────────

/// Error type for parsing an ID from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

// ─── Definitions ───────────────────────────────────────────────────────────────

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            #[doc = concat!("Creates a new `", stringify!($name), "`")]
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying u64 value
            #[must_use]
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self::new)
                    .map_err(|_| ParseIdError {
                        kind: stringify!($name),
                    })
            }
        }
    };
}

define_id!(
    /// Unique identifier for a student
    StudentId
);

define_id!(
    /// Unique identifier for a course
    CourseId
);

define_id!(
    /// Identifier for a chapter, unique within its course
    ChapterId
);

define_id!(
    /// Unique identifier for a question in the bank
    QuestionId
);

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_id_display() {
        let id = CourseId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(format!("{id:?}"), "CourseId(42)");
    }

    #[test]
    fn test_chapter_id_from_str() {
        let id: ChapterId = " 7 ".parse().unwrap();
        assert_eq!(id, ChapterId::new(7));
    }

    #[test]
    fn test_question_id_from_str_invalid() {
        let err = "not-a-number".parse::<QuestionId>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse QuestionId from string");
    }

    #[test]
    fn test_student_id_serializes_as_number() {
        let json = serde_json::to_string(&StudentId::new(5)).unwrap();
        assert_eq!(json, "5");
    }
}
