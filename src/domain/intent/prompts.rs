//! Prompt text for the classifier protocol.

use crate::domain::catalog::Catalog;

const SYSTEM_INSTRUCTION: &str = r#"אתה העוזר של Matchday ⚽, שמוצא כרטיסים למשחקי כדורגל.

חוקי הפורמט:
ענה תמיד ב-JSON נקי, בלי תגיות markdown, בפורמט הבא:
{
  "intent": "GREETING" | "SEARCH" | "SUPPORT" | "UNCLEAR",
  "message": "string",
  "slugs": []
}

לוגיקה:
1. אם המשתמש מברך (GREETING): כלול בתשובה את הדוגמה *"תמצא לי הצעות לריאל מדריד נגד ליברפול"*.
2. אם המשתמש מחפש משחק (SEARCH): ענה בקצרה שאתה בודק מחירים, בלי דוגמת חיפוש.
3. אם ההודעה לא מובנת או לא קשורה לכדורגל או לכרטיסים: החזר UNCLEAR.
4. החזר ב-"slugs" רק ערכים מהרשימה המורשית, לפי סדר האזכור בהודעה."#;

/// Stage-one system instruction, listing the permitted slugs.
pub fn classification_instruction(catalog: &Catalog) -> String {
    let permitted = catalog
        .entries()
        .iter()
        .map(|entry| entry.slug.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{SYSTEM_INSTRUCTION}\n\nסלאגים מורשים: {permitted}")
}

/// Stage-two request asking for exactly two slugs and a confirmation.
pub fn extraction_prompt(text: &str, catalog: &Catalog) -> String {
    format!(
        r#"Extract exactly TWO slugs for: "{text}"
Valid choices (display name + slug): {choices}

Return JSON: {{"slugs": ["slug1", "slug2"], "message": "string"}}
CRITICAL: in "message" refer to the teams by their display names, never by slug.
Example: "כבר בודק מחירים למשחק של ארסנל נגד אינטר...""#,
        choices = catalog.render_choices()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::CatalogEntry;
    use crate::domain::foundation::Slug;

    fn catalog() -> Catalog {
        Catalog::build(vec![
            CatalogEntry::new("1", "ארסנל", Slug::new("arsenal").unwrap()),
            CatalogEntry::new("2", "ליברפול", Slug::new("liverpool").unwrap()),
        ])
        .unwrap()
    }

    #[test]
    fn instruction_lists_permitted_slugs() {
        let instruction = classification_instruction(&catalog());
        assert!(instruction.contains("arsenal, liverpool"));
        assert!(instruction.contains("\"intent\""));
    }

    #[test]
    fn extraction_prompt_renders_choices_and_message() {
        let prompt = extraction_prompt("ארסנל נגד מישהו", &catalog());
        assert!(prompt.contains("ארסנל (arsenal), ליברפול (liverpool)"));
        assert!(prompt.contains("\"ארסנל נגד מישהו\""));
        assert!(prompt.contains("{\"slugs\": [\"slug1\", \"slug2\"], \"message\": \"string\"}"));
    }
}
