/// Prompts offered to a user who does not know what to ask yet.
pub const SAMPLE_QUESTIONS: &[&str] = &[
    "How many providers have expired licenses?",
    "What is the overall data quality score?",
    "Show me providers with NPI issues",
    "Which specialty has the lowest quality score?",
    "How many duplicate records were found?",
    "Show me all providers from California",
];
