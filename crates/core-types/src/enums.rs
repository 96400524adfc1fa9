use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The settled result of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn is_win(&self) -> bool {
        matches!(self, Outcome::Win)
    }

    pub fn is_loss(&self) -> bool {
        matches!(self, Outcome::Loss)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "win" => Ok(Outcome::Win),
            "loss" => Ok(Outcome::Loss),
            _ => Err(CoreError::UnknownLabel {
                kind: "outcome",
                value: s.to_string(),
            }),
        }
    }
}

/// The self-reported state of mind attached to a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mindset {
    Neutral,
    Focused,
    Greedy,
    Tilted,
    Disciplined,
}

impl Mindset {
    pub const ALL: [Mindset; 5] = [
        Mindset::Neutral,
        Mindset::Focused,
        Mindset::Greedy,
        Mindset::Tilted,
        Mindset::Disciplined,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mindset::Neutral => "Neutral",
            Mindset::Focused => "Focused",
            Mindset::Greedy => "Greedy",
            Mindset::Tilted => "Tilted",
            Mindset::Disciplined => "Disciplined",
        }
    }
}

impl fmt::Display for Mindset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mindset {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mindset::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownLabel {
                kind: "mindset",
                value: s.to_string(),
            })
    }
}

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSender {
    User,
    Ai,
}

impl ChatSender {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatSender::User => "user",
            ChatSender::Ai => "ai",
        }
    }
}

impl FromStr for ChatSender {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(ChatSender::User),
            "ai" => Ok(ChatSender::Ai),
            _ => Err(CoreError::UnknownLabel {
                kind: "chat sender",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mindset_parses_case_insensitively() {
        assert_eq!("tilted".parse::<Mindset>().unwrap(), Mindset::Tilted);
        assert_eq!(" Focused ".parse::<Mindset>().unwrap(), Mindset::Focused);
        assert!("euphoric".parse::<Mindset>().is_err());
    }

    #[test]
    fn outcome_serializes_lowercase() {
        let json = serde_json::to_string(&Outcome::Loss).unwrap();
        assert_eq!(json, "\"loss\"");
        assert_eq!("WIN".parse::<Outcome>().unwrap(), Outcome::Win);
    }
}
