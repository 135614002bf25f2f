use serde::Serialize;

/// Context returned when the reply carries no `ANSWER:`/`CONTEXT:` markers
pub const NO_CONTEXT: &str = "No specific context provided";

const ANSWER_MARKER: &str = "ANSWER:";
const CONTEXT_MARKER: &str = "CONTEXT:";

/// Whether the model followed the requested reply format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyFormat {
    Structured,
    Fallback,
}

/// Answer and supporting context extracted from a model reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QaResult {
    pub answer: String,
    pub context: String,
    pub format: ReplyFormat,
}

#[derive(Clone, Copy)]
enum Section {
    Answer,
    Context,
}

/// Split a model reply into answer and context.
///
/// Never fails: a reply without markers becomes the whole answer with
/// [`NO_CONTEXT`] as context.
pub fn parse_reply(reply: &str) -> QaResult {
    let mut answer = String::new();
    let mut context = String::new();
    let mut section = None;

    for line in reply.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix(ANSWER_MARKER) {
            section = Some(Section::Answer);
            answer = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix(CONTEXT_MARKER) {
            section = Some(Section::Context);
            context = rest.trim().to_string();
        } else if !line.is_empty() {
            let target = match section {
                Some(Section::Answer) => &mut answer,
                Some(Section::Context) => &mut context,
                None => continue,
            };
            target.push(' ');
            target.push_str(line);
        }
    }

    if answer.is_empty() && context.is_empty() {
        return QaResult {
            answer: reply.trim().to_string(),
            context: NO_CONTEXT.to_string(),
            format: ReplyFormat::Fallback,
        };
    }

    QaResult {
        answer: answer.trim().to_string(),
        context: context.trim().to_string(),
        format: ReplyFormat::Structured,
    }
}
