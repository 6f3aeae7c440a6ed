//! Intent pre-checks and the two-stage classifier protocol.

mod prechecks;
mod prompts;
mod protocol;

pub use prechecks::{PreCheck, GREETING_KEYWORDS, RESET_KEYWORD, SEARCH_MARKERS};
pub use prompts::{classification_instruction, extraction_prompt};
pub use protocol::{
    catalog_slugs, evaluate_stage_one, merge_stage_two, needs_second_pass,
    parse_classifier_reply, parse_extraction_reply, strip_code_fences, ClassifierReply,
    ExtractionReply, ProtocolError, StageOutcome,
};
