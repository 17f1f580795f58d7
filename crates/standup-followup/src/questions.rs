// SPDX-FileCopyrightText: 2026 Standup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Follow-up question generation.
//!
//! One generation call per session, parsed into questions and settled to
//! exactly [`QUESTION_COUNT`] through an ordered fallback chain: a failed or
//! empty call yields the defaults, a short parse is padded from the
//! defaults, a long parse is truncated.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use chrono::NaiveDate;
use regex::Regex;
use standup_config::model::LmStudioConfig;
use standup_core::ProviderAdapter;
use tracing::{debug, info, warn};

use crate::history::{self, HistoryItem};
use crate::provider_request;

/// Number of questions in every set.
pub const QUESTION_COUNT: usize = 3;

/// Questions used whenever generation cannot supply enough of its own.
pub const DEFAULT_QUESTIONS: [&str; QUESTION_COUNT] = [
    "What specific steps did you take to complete this task?",
    "Did you encounter any technical issues or blockers while working?",
    "What will you focus on next in this project?",
];

const MIN_NUMBERED_LEN: usize = 10;
const MIN_LOOSE_LEN: usize = 15;

static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+[.)]\s*").unwrap());
static BOLD_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*.*?\*\*:\s*").unwrap());

/// How a question set came to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionSource {
    /// Generation produced exactly the required number.
    Generated,
    /// Generation produced fewer; the rest came from the defaults.
    Padded { parsed: usize },
    /// Generation produced more; the extras were dropped.
    Truncated { parsed: usize },
    /// Generation failed outright.
    Defaulted { reason: String },
}

/// Exactly [`QUESTION_COUNT`] questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    questions: [String; QUESTION_COUNT],
    source: QuestionSource,
}

impl QuestionSet {
    pub fn defaults(reason: impl Into<String>) -> Self {
        Self {
            questions: DEFAULT_QUESTIONS.map(String::from),
            source: QuestionSource::Defaulted {
                reason: reason.into(),
            },
        }
    }

    /// Pads or truncates parsed questions to a full set.
    pub fn settle(parsed: Vec<String>) -> Self {
        let count = parsed.len();
        let source = match count.cmp(&QUESTION_COUNT) {
            std::cmp::Ordering::Less => QuestionSource::Padded { parsed: count },
            std::cmp::Ordering::Equal => QuestionSource::Generated,
            std::cmp::Ordering::Greater => QuestionSource::Truncated { parsed: count },
        };
        let mut parsed = parsed.into_iter();
        let questions = std::array::from_fn(|i| {
            parsed
                .next()
                .unwrap_or_else(|| DEFAULT_QUESTIONS[i].to_string())
        });
        Self { questions, source }
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn source(&self) -> &QuestionSource {
        &self.source
    }

    pub fn into_vec(self) -> Vec<String> {
        self.questions.into()
    }
}

/// Extracts questions from free-form generated text.
///
/// Numbered lines are taken first. When that yields fewer than
/// [`QUESTION_COUNT`], any sufficiently long line with a question mark is
/// added, skipping headings and near-duplicates, until the set is full.
pub fn parse_questions(response: &str) -> Vec<String> {
    let mut questions: Vec<String> = response
        .lines()
        .map(str::trim)
        .filter(|line| LIST_MARKER.is_match(line))
        .map(clean_line)
        .filter(|q| q.chars().count() > MIN_NUMBERED_LEN)
        .collect();

    if questions.len() >= QUESTION_COUNT {
        return questions;
    }

    for line in response.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with("**") && !line.ends_with('?') {
            continue;
        }
        if !line.contains('?') || line.chars().count() <= MIN_LOOSE_LEN {
            continue;
        }
        let candidate = clean_line(line);
        let lowered = candidate.to_lowercase();
        let seen = questions
            .iter()
            .any(|q| lowered.contains(&q.to_lowercase()));
        if candidate.is_empty() || seen {
            continue;
        }
        questions.push(candidate);
        if questions.len() >= QUESTION_COUNT {
            break;
        }
    }
    questions
}

fn clean_line(line: &str) -> String {
    let unnumbered = LIST_MARKER.replace(line, "");
    BOLD_LABEL.replace_all(&unnumbered, "").trim().to_string()
}

/// What the generator knows about the submission being followed up.
#[derive(Debug, Clone, Copy)]
pub struct QuestionContext<'a> {
    pub task: &'a str,
    pub challenges: &'a str,
    pub history: &'a [HistoryItem],
    pub today: NaiveDate,
}

/// Renders the question-generation prompt.
pub fn build_prompt(ctx: &QuestionContext<'_>) -> String {
    let today_work = history::current_context(ctx.task, ctx.challenges);
    let planned = history::yesterday_plans(ctx.history, ctx.today);
    let challenges = history::current_challenges(&today_work);
    let recent = if ctx.history.is_empty() {
        String::new()
    } else {
        history::history_context(ctx.history)
    };

    format!(
        "You're helping a supervisor create simple, easy-to-answer follow-up questions for an \
         intern's daily work update.\n\n\
         **Today's Work:** {today_work}\n\
         **What They Planned (from yesterday):** {planned}\n\
         **Current Challenges:** {challenges}\n\
         **Recent Work History:** {recent}\n\n\
         Generate exactly 3 simple questions that:\n\
         1. Are easy to answer with 1-2 sentences\n\
         2. Sound friendly and conversational to understand progress without being demanding\n\
         3. Focus on today's work specifically\n\
         4. When they say they completed a task, ask them to describe the steps they followed \
         in a general but specific-enough way, so the work can be understood and verified\n\
         5. If previous plans exist, check naturally that today's work matches them\n\n\
         Avoid questions about:\n\
         - Feelings or emotions\n\
         - Complex technical details\n\
         - Long explanations\n\n\
         Format your response as:\n\
         1. [First simple question]\n\
         2. [Second simple question]\n\
         3. [Third simple question]"
    )
}

/// Generates follow-up questions through a [`ProviderAdapter`].
///
/// Never fails: every generation problem ends in the default set.
pub struct QuestionGenerator {
    provider: Arc<dyn ProviderAdapter>,
    config: LmStudioConfig,
    timeout: Duration,
}

impl QuestionGenerator {
    pub fn new(provider: Arc<dyn ProviderAdapter>, config: LmStudioConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        Self {
            provider,
            config,
            timeout,
        }
    }

    /// Overrides the bound on the generation call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn generate(&self, owner_id: &str, ctx: &QuestionContext<'_>) -> QuestionSet {
        let set = match self.request_text(ctx).await {
            Ok(text) => QuestionSet::settle(parse_questions(&text)),
            Err(reason) => QuestionSet::defaults(reason),
        };

        match set.source() {
            QuestionSource::Generated => {
                info!(owner = %owner_id, "generated follow-up questions");
            }
            QuestionSource::Truncated { parsed } => {
                debug!(owner = %owner_id, parsed, "truncated generated questions");
            }
            QuestionSource::Padded { parsed } => {
                warn!(owner = %owner_id, parsed, "padded generated questions with defaults");
            }
            QuestionSource::Defaulted { reason } => {
                warn!(owner = %owner_id, reason = %reason, "using default follow-up questions");
            }
        }
        set
    }

    async fn request_text(&self, ctx: &QuestionContext<'_>) -> Result<String, String> {
        let request = provider_request(
            &self.config,
            build_prompt(ctx),
            self.config.max_tokens,
            self.timeout,
        );
        let response = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| format!("generation timed out after {:?}", self.timeout))?
            .map_err(|e| e.to_string())?;

        let text = response.content.trim();
        if text.is_empty() {
            return Err("generation returned no text".to_string());
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use standup_core::StandupError;
    use standup_test_utils::MockProvider;
    use tracing_test::traced_test;

    fn ctx(history: &[HistoryItem]) -> QuestionContext<'_> {
        QuestionContext {
            task: "Fixed the pagination bug",
            challenges: "",
            history,
            today: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        }
    }

    fn generator(provider: Arc<MockProvider>) -> QuestionGenerator {
        QuestionGenerator::new(provider, LmStudioConfig::default())
    }

    #[test]
    fn numbered_lines_are_parsed_and_bold_labels_stripped() {
        let text = "Here you go:\n\
                    1. **Steps**: What steps did you follow to find the bug?\n\
                    2) How did you verify the fix works?\n\
                    3. Too short\n\
                    4. What will you pick up tomorrow morning?";
        let parsed = parse_questions(text);
        assert_eq!(
            parsed,
            vec![
                "What steps did you follow to find the bug?",
                "How did you verify the fix works?",
                "What will you pick up tomorrow morning?",
            ]
        );
    }

    #[test]
    fn loose_questions_fill_in_when_numbering_is_missing() {
        let text = "# Questions\n\
                    **Heading without question mark**\n\
                    How did you test the pagination change?\n\
                    how did you test the pagination change?\n\
                    Short one?\n\
                    - Which page sizes did you try?";
        let parsed = parse_questions(text);
        assert_eq!(
            parsed,
            vec![
                "How did you test the pagination change?",
                "- Which page sizes did you try?",
            ]
        );
    }

    #[test]
    fn settle_always_yields_three() {
        let empty = QuestionSet::settle(Vec::new());
        assert_eq!(empty.questions(), DEFAULT_QUESTIONS);
        assert_eq!(empty.source(), &QuestionSource::Padded { parsed: 0 });

        let one = QuestionSet::settle(vec!["Only this one?".into()]);
        assert_eq!(one.questions()[0], "Only this one?");
        assert_eq!(one.questions()[1], DEFAULT_QUESTIONS[1]);
        assert_eq!(one.questions()[2], DEFAULT_QUESTIONS[2]);

        let five: Vec<String> = (1..=5).map(|i| format!("Question number {i}?")).collect();
        let truncated = QuestionSet::settle(five);
        assert_eq!(truncated.questions()[2], "Question number 3?");
        assert_eq!(truncated.source(), &QuestionSource::Truncated { parsed: 5 });
        assert_eq!(truncated.into_vec().len(), QUESTION_COUNT);
    }

    #[test]
    fn prompt_embeds_context_plans_and_history() {
        let history = vec![HistoryItem {
            submitted_at: None,
            timestamp: None,
            date: NaiveDate::from_ymd_opt(2026, 3, 9),
            task: "Set up CI".into(),
            progress: String::new(),
            blockers: "Start on pagination".into(),
        }];
        let prompt = build_prompt(&ctx(&history));
        assert!(prompt.contains("**Today's Work:** CURRENT WORK UPDATE:\nWork Description: Fixed the pagination bug"));
        assert!(prompt.contains("**What They Planned (from yesterday):** Start on pagination"));
        assert!(prompt.contains("**Current Challenges:** No challenges mentioned"));
        assert!(prompt.contains("RECENT WORK HISTORY:\nDate: 2026-03-09\nWork: Set up CI"));
        assert!(prompt.ends_with("3. [Third simple question]"));
    }

    #[tokio::test]
    async fn generated_questions_are_used() {
        let provider = Arc::new(MockProvider::new());
        provider.push_response("1. What was the root cause?\n2. How did you test it?\n3. What is next on your list?");
        let set = generator(provider.clone()).generate("u1", &ctx(&[])).await;
        assert_eq!(set.source(), &QuestionSource::Generated);
        assert_eq!(set.questions()[0], "What was the root cause?");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn one_parsed_question_is_padded_with_two_defaults() {
        let provider = Arc::new(MockProvider::new());
        provider.push_response("1. What was the root cause of the bug?");
        let set = generator(provider).generate("u1", &ctx(&[])).await;
        assert_eq!(set.questions()[0], "What was the root cause of the bug?");
        assert_eq!(&set.questions()[1..], &DEFAULT_QUESTIONS[1..]);
    }

    #[tokio::test]
    #[traced_test]
    async fn provider_failure_falls_back_to_defaults() {
        let provider = Arc::new(MockProvider::new());
        provider.push_error(StandupError::Provider {
            message: "connection refused".into(),
            source: None,
        });
        let set = generator(provider).generate("u1", &ctx(&[])).await;
        assert_eq!(set.questions(), DEFAULT_QUESTIONS);
        assert!(matches!(set.source(), QuestionSource::Defaulted { reason } if reason.contains("connection refused")));
        assert!(logs_contain("using default follow-up questions"));
    }

    #[tokio::test]
    async fn empty_response_falls_back_to_defaults() {
        let provider = Arc::new(MockProvider::new());
        provider.push_response("   ");
        let set = generator(provider).generate("u1", &ctx(&[])).await;
        assert_eq!(set.questions(), DEFAULT_QUESTIONS);
        assert!(matches!(set.source(), QuestionSource::Defaulted { .. }));
    }

    #[tokio::test]
    async fn slow_provider_times_out_into_defaults() {
        let provider = Arc::new(MockProvider::new().with_latency(Duration::from_secs(5)));
        provider.push_response("1. Never seen question here?");
        let set = generator(provider)
            .with_timeout(Duration::from_millis(50))
            .generate("u1", &ctx(&[]))
            .await;
        assert_eq!(set.questions(), DEFAULT_QUESTIONS);
        assert!(matches!(set.source(), QuestionSource::Defaulted { reason } if reason.contains("timed out")));
    }
}
