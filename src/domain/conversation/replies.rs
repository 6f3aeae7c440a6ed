//! Localized (Hebrew) bot replies.

use rand::seq::SliceRandom;
use rand::Rng;

/// Branded openings, one picked at random for a first greeting.
pub const PRIMARY_GREETINGS: [&str; 3] = [
    "היי! ⚽ ברוכים הבאים ל-Matchday.\nכתבו לי שתי קבוצות, למשל *\"ארסנל נגד ליברפול\"*, ואחפש לכם כרטיסים.",
    "אהלן! 🏟️ כאן Matchday, העוזר שלכם למשחקי כדורגל.\nעל איזה משחק חשבתם? למשל *\"ריאל מדריד נגד ברצלונה\"*.",
    "שלום! 🎟️ מחפשים כרטיסים למשחק?\nספרו לי מי נגד מי, למשל *\"מכבי תל אביב נגד הפועל באר שבע\"*.",
];

/// Reply to a repeated greeting inside the cooldown window.
pub const SECONDARY_GREETING: &str = "שוב שלום! 👋 איזה משחק מעניין אתכם?";

/// Example prompts used when nothing actionable was understood.
pub const EXAMPLE_PROMPTS: [&str; 3] = [
    "לא מצאתי משחק בהודעה. 🤔\nנסו למשל: *\"חפש לי הצעות לארסנל נגד צ'לסי\"*",
    "על איזה משחק מדובר? ⚽\nאפשר לכתוב למשל: *\"באיירן נגד דורטמונד\"*",
    "כדי שאוכל לעזור, כתבו שתי קבוצות. למשל: *\"יובנטוס נגד מילאן\"* 🎟️",
];

pub const CLARIFICATION: &str =
    "אופס, לא ממש הבנתי למה הכוונה. 😅\nאפשר לחפש כרטיסים למשל ככה: *\"חפש לי הצעות לריאל מדריד נגד סיטי\"*";

pub const RESET_CONFIRMATION: &str = "🗑️ השיחה אופסה בהצלחה! ההודעה הבאה תיחשב כשיחה חדשה.";

pub const APOLOGY: &str = "❌ אופס, משהו השתבש בעיבוד ההודעה. נסו שוב בעוד רגע.";

/// Acknowledges a single remembered team and asks for the opponent.
pub fn single_team(display_name: &str) -> String {
    format!("קיבלתי, {display_name}! ⚽ נגד איזו קבוצה?")
}

/// Default confirmation when a pair is complete.
pub fn search_confirmation(home: &str, away: &str) -> String {
    format!("{home} נגד {away}")
}

pub fn primary_greeting<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    PRIMARY_GREETINGS
        .choose(rng)
        .copied()
        .unwrap_or(PRIMARY_GREETINGS[0])
}

pub fn example_prompt<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    EXAMPLE_PROMPTS
        .choose(rng)
        .copied()
        .unwrap_or(EXAMPLE_PROMPTS[0])
}
