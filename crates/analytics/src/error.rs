use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum AnalyticsError {
    #[error("Rounds must be sorted oldest first: round {index} is earlier than its predecessor")]
    UnsortedRounds { index: usize },

    #[error("Mindset entries must be sorted newest first: entry {index} is later than its predecessor")]
    UnsortedMindsetEntries { index: usize },

    #[error("Unknown multiplier band label: '{0}'")]
    UnknownBand(String),
}
