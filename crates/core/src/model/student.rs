use crate::model::ids::StudentId;
use crate::model::submission::UNNAMED_STUDENT;

/// The authenticated student taking an exam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    id: StudentId,
    name: Option<String>,
}

impl Student {
    #[must_use]
    pub fn new(id: StudentId, name: Option<String>) -> Self {
        let name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        Self { id, name }
    }

    #[must_use]
    pub fn id(&self) -> StudentId {
        self.id
    }

    /// Name shown in reports; falls back to a placeholder for unnamed students.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED_STUDENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_falls_back_to_placeholder() {
        let student = Student::new(StudentId::new(1), Some("   ".into()));
        assert_eq!(student.display_name(), "Unnamed");

        let student = Student::new(StudentId::new(1), Some(" Ada ".into()));
        assert_eq!(student.display_name(), "Ada");
    }
}
