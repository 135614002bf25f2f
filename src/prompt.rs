/// Transcripts longer than this many characters are cut before prompting
pub const MAX_TRANSCRIPT_CHARS: usize = 4000;

const ELLIPSIS: &str = "...";

/// Build the question-answering prompt for a transcript.
pub fn build_prompt(transcript: &str, question: &str) -> String {
    let transcript = truncate_transcript(transcript);

    format!(
        "You are a helpful assistant that answers questions about YouTube video transcripts.

TRANSCRIPT:
{transcript}

QUESTION: {question}

Please provide:
1. A clear and accurate answer to the question
2. The relevant context from the transcript (including approximate timestamps if mentioned)

Format your response as:
ANSWER: [your answer here]
CONTEXT: [relevant context with timestamps if available]"
    )
}

/// Cut to the first [`MAX_TRANSCRIPT_CHARS`] characters (not bytes) and mark the cut.
pub fn truncate_transcript(transcript: &str) -> String {
    match transcript.char_indices().nth(MAX_TRANSCRIPT_CHARS) {
        Some((byte_idx, _)) => format!("{}{ELLIPSIS}", &transcript[..byte_idx]),
        None => transcript.to_string(),
    }
}
