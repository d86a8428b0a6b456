//! Strict output schema declared to the backend.

use serde_json::{json, Value};

/// Field names in the order the backend should emit them.
pub const FIELDS: [&str; 9] = [
    "name",
    "iupacName",
    "molecularFormula",
    "summary",
    "keyPoints",
    "reactions_or_uses",
    "curriculumContext",
    "analogy",
    "funFacts",
];

/// Fields the backend must always return. `funFacts` is optional.
pub const REQUIRED: [&str; 8] = [
    "name",
    "iupacName",
    "molecularFormula",
    "summary",
    "keyPoints",
    "reactions_or_uses",
    "curriculumContext",
    "analogy",
];

fn string(description: &str) -> Value {
    json!({ "type": "STRING", "description": description })
}

fn string_list(description: &str) -> Value {
    json!({
        "type": "ARRAY",
        "description": description,
        "items": { "type": "STRING" }
    })
}

/// The `responseSchema` object for `generationConfig`.
#[must_use]
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": string("Common name of the compound"),
            "iupacName": string("Systematic IUPAC name"),
            "molecularFormula": string("Molecular formula, e.g. C6H6"),
            "summary": string("Two or three sentence overview"),
            "keyPoints": string_list("Key physical and chemical properties"),
            "reactions_or_uses": string_list("Characteristic reactions or everyday uses"),
            "curriculumContext": string("Where this compound appears in the student's syllabus"),
            "analogy": string("An everyday analogy for the structure or behaviour"),
            "funFacts": string_list("Optional memorable facts"),
        },
        "required": REQUIRED,
        "propertyOrdering": FIELDS,
    })
}
