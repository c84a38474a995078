use crate::schema::{NOT_AVAILABLE, UNKNOWN_SPECIES};

/// Instruction sent alongside every image. Single and batch classification
/// share one field contract so both produce the same record shape.
pub fn build_species_prompt() -> String {
    format!(
        r#"You are a marine biology expert. Analyze this image and identify the marine species.

Return ONLY a valid JSON object (no markdown, no code blocks, no explanations) with this EXACT structure:

{{
  "common_name": "Common name of the species",
  "scientific_name": "Scientific name (Genus species)",
  "about": "A 2-3 sentence overview describing this species",
  "habitat": "Where they live - ocean zones, regions, depth range",
  "size": "Typical size/length and weight range",
  "behavior": "Behavioral characteristics, diet, and habits",
  "conservation_status": "IUCN Red List status and any threats, or null",
  "is_dangerous": "Specific danger to humans (venom, bite, sting, etc) ONLY if truly dangerous, otherwise null",
  "fun_facts": ["Interesting fact 1", "Interesting fact 2", "Interesting fact 3"],
  "did_you_know": "A fascinating or surprising fact about this species",
  "category": "fish" or "coral" or "crab" or "other",
  "rarity": "common" or "rare" or "new",
  "confidence": 95
}}

RULES:
- Return ONLY the JSON object, no markdown formatting
- If this is not a marine species, set common_name to "{unknown}"
- Provide accurate, educational information
- Include 3-5 fun facts
- Confidence is an integer between 0 and 100; be realistic (75-98) based on image quality
- All text fields must have values, use "{missing}" if information is unknown
- is_dangerous must be null for species that are harmless to humans

JSON OUTPUT:"#,
        unknown = UNKNOWN_SPECIES,
        missing = NOT_AVAILABLE,
    )
}
