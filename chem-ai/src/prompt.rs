//! Level-conditioned instructional prompt.

use chem_core::CurriculumLevel;

const PERSONA: &str = "You are a patient chemistry tutor explaining a single compound to a student.";

const JSON_ONLY: &str = "Respond with a single JSON object that matches the provided schema. \
Do not wrap it in markdown and do not add commentary outside the JSON.";

/// Build the text part of an analysis request.
///
/// The prompt always carries the level label and its directive. When an
/// image is attached the model is told to identify the drawn structure;
/// when text is given it is quoted verbatim as the compound to explain.
#[must_use]
pub fn build_prompt(level: CurriculumLevel, text: Option<&str>, has_image: bool) -> String {
    let subject = match (has_image, text) {
        (true, Some(name)) => format!(
            "The student drew the attached structure and typed \"{name}\". \
             Identify the compound, using the typed name to resolve ambiguity in the drawing."
        ),
        (true, None) => "Identify the chemical structure drawn in the attached image. \
                         The drawing is hand-made and may be imprecise."
            .to_string(),
        (false, Some(name)) => format!("Explain the compound \"{name}\"."),
        (false, None) => "Explain the compound the student is asking about.".to_string(),
    };

    format!(
        "{PERSONA}\n\n{subject}\n\nAudience: {label}.\n{directive}\n\n\
         Fill every field: name, iupacName, molecularFormula, summary, keyPoints, \
         reactions_or_uses, curriculumContext, analogy, and funFacts when you know any.\n\n\
         {JSON_ONLY}",
        label = level.label(),
        directive = level.directive(),
    )
}
