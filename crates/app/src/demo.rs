use exam_core::model::{
    Chapter, ChapterExamMeta, ChapterId, Course, CourseId, Difficulty, Question, QuestionId,
};
use storage::repository::Storage;

pub struct SeedSummary {
    pub course_id: CourseId,
    pub chapters: usize,
    pub questions: usize,
}

struct Sample {
    text: &'static str,
    options: &'static [&'static str],
    correct: usize,
    explanation: &'static str,
    difficulty: Difficulty,
}

const FIRE_BEHAVIOR: &[Sample] = &[
    Sample {
        text: "Which three elements make up the fire triangle?",
        options: &["Heat, fuel, oxygen", "Heat, smoke, water", "Fuel, water, nitrogen", "Oxygen, carbon, smoke"],
        correct: 0,
        explanation: "Removing any one of heat, fuel or oxygen extinguishes the fire.",
        difficulty: Difficulty::Easy,
    },
    Sample {
        text: "What is flashover?",
        options: &[
            "Near-simultaneous ignition of all exposed combustibles in a room",
            "Fire spreading along a ceiling",
            "Smoke leaving through a window",
        ],
        correct: 0,
        explanation: "Flashover marks the transition to a fully developed compartment fire.",
        difficulty: Difficulty::Medium,
    },
    Sample {
        text: "Heat transfer through direct contact is called:",
        options: &["Convection", "Radiation", "Conduction", "Ventilation"],
        correct: 2,
        explanation: "Conduction moves heat through solids in contact.",
        difficulty: Difficulty::Easy,
    },
    Sample {
        text: "A sudden explosive burn when air enters an oxygen-starved compartment is a:",
        options: &["Rollover", "Backdraft", "Flashover", "Smoldering"],
        correct: 1,
        explanation: "Backdraft follows the introduction of oxygen into superheated fuel gases.",
        difficulty: Difficulty::Hard,
    },
    Sample {
        text: "Class B fires involve:",
        options: &["Ordinary combustibles", "Flammable liquids", "Energized electrical equipment", "Combustible metals"],
        correct: 1,
        explanation: "Flammable liquids and gases are Class B.",
        difficulty: Difficulty::Easy,
    },
    Sample {
        text: "Which stage follows the growth stage in a compartment fire?",
        options: &["Incipient", "Fully developed", "Decay", "Ignition"],
        correct: 1,
        explanation: "Growth leads to the fully developed stage, then decay.",
        difficulty: Difficulty::Medium,
    },
];

const VENTILATION: &[Sample] = &[
    Sample {
        text: "Horizontal ventilation uses:",
        options: &["Roof openings", "Windows and doors", "Floor cuts", "Skylights only"],
        correct: 1,
        explanation: "Horizontal ventilation relies on openings in walls.",
        difficulty: Difficulty::Easy,
    },
    Sample {
        text: "Positive pressure ventilation places the fan:",
        options: &["Inside the fire room", "At the entry point blowing in", "On the roof", "At the exhaust opening blowing out"],
        correct: 1,
        explanation: "PPV pushes air in at the entry so smoke exits elsewhere.",
        difficulty: Difficulty::Medium,
    },
    Sample {
        text: "Vertical ventilation should normally be made:",
        options: &["Directly over the fire when possible", "At the lowest floor", "Far from the fire"],
        correct: 0,
        explanation: "Opening over the fire lets heated gases escape by the shortest path.",
        difficulty: Difficulty::Medium,
    },
    Sample {
        text: "Uncoordinated ventilation may:",
        options: &["Always cool the fire", "Intensify the fire", "Have no effect"],
        correct: 1,
        explanation: "Added air without suppression feeds the fire.",
        difficulty: Difficulty::Hard,
    },
    Sample {
        text: "Is ventilation coordinated with fire attack?",
        options: &["Yes", "No"],
        correct: 0,
        explanation: "Ventilation is timed with the hose line advance.",
        difficulty: Difficulty::Easy,
    },
];

const LADDERS: &[Sample] = &[
    Sample {
        text: "The recommended climbing angle for a ground ladder is about:",
        options: &["45 degrees", "60 degrees", "75 degrees", "90 degrees"],
        correct: 2,
        explanation: "Roughly 75 degrees balances stability and load capacity.",
        difficulty: Difficulty::Medium,
    },
    Sample {
        text: "The vertical side pieces of a ladder are the:",
        options: &["Rungs", "Beams", "Halyards", "Pawls"],
        correct: 1,
        explanation: "Beams carry the rungs.",
        difficulty: Difficulty::Easy,
    },
    Sample {
        text: "When placed for roof access, a ladder should extend past the edge by:",
        options: &["No rungs", "About one rung", "Several rungs", "Half its length"],
        correct: 2,
        explanation: "Several rungs above the roof line make it visible and easy to mount.",
        difficulty: Difficulty::Medium,
    },
    Sample {
        text: "Pawls on an extension ladder:",
        options: &["Lock the fly section in place", "Raise the fly section", "Anchor the butt"],
        correct: 0,
        explanation: "Pawls (dogs) hold the fly at the chosen height.",
        difficulty: Difficulty::Hard,
    },
    Sample {
        text: "Should a ladder be checked for overhead power lines before raising?",
        options: &["Yes", "No"],
        correct: 0,
        explanation: "Electrical hazards must be cleared first.",
        difficulty: Difficulty::Easy,
    },
];

/// Upserts the demo course: three ordered chapters, a question bank for each and
/// exam settings for the first two (the third uses defaults).
///
/// # Errors
///
/// Returns an error if any record fails validation or storage.
pub async fn seed(storage: &Storage) -> Result<SeedSummary, Box<dyn std::error::Error>> {
    let course_id = CourseId::new(1);
    let chapters = [
        (ChapterId::new(1), "Fire Behavior", FIRE_BEHAVIOR),
        (ChapterId::new(2), "Ventilation", VENTILATION),
        (ChapterId::new(3), "Ground Ladders", LADDERS),
    ];

    let course = Course::new(
        course_id,
        "Firefighter I",
        chapters
            .iter()
            .zip(1..)
            .map(|((id, title, _), order)| Chapter::new(*id, *title, order))
            .collect::<Result<Vec<_>, _>>()?,
    )?;
    storage.courses.upsert_course(&course).await?;

    let mut next_id = 1;
    for (chapter_id, _, samples) in &chapters {
        for sample in *samples {
            let question = Question::new(
                QuestionId::new(next_id),
                course_id,
                *chapter_id,
                sample.text,
                sample.options.iter().map(ToString::to_string).collect(),
                sample.correct,
                Some(sample.explanation.to_string()),
                sample.difficulty,
            )?;
            storage.questions.upsert_question(&question).await?;
            next_id += 1;
        }
    }

    storage
        .exam_meta
        .upsert_exam_meta(&ChapterExamMeta::new(course_id, ChapterId::new(1), 5, 10, None)?)
        .await?;
    storage
        .exam_meta
        .upsert_exam_meta(&ChapterExamMeta::new(course_id, ChapterId::new(2), 4, 8, None)?)
        .await?;

    tracing::info!(course_id = %course_id, "demo course seeded");
    Ok(SeedSummary {
        course_id,
        chapters: chapters.len(),
        questions: usize::try_from(next_id - 1).unwrap_or(usize::MAX),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_chapters_are_examinable() {
        let storage = Storage::in_memory();
        let summary = seed(&storage).await.unwrap();
        assert_eq!(summary.chapters, 3);
        assert_eq!(summary.questions, 16);

        let course = storage.courses.get_course(CourseId::new(1)).await.unwrap().unwrap();
        for chapter in course.chapters() {
            let bank = storage
                .questions
                .chapter_questions(course.id(), chapter.id())
                .await
                .unwrap();
            assert!(bank.len() >= 5, "{} has too few questions", chapter.title());
        }
        assert!(
            storage
                .exam_meta
                .get_exam_meta(course.id(), ChapterId::new(3))
                .await
                .unwrap()
                .is_none()
        );

        // seeding twice is harmless
        seed(&storage).await.unwrap();
    }
}
