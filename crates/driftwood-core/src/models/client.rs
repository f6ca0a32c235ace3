use std::fmt;
use std::str::FromStr;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Anything that can be reached by text message.
pub trait Contact {
    fn full_name(&self) -> &str;
    fn phone_number(&self) -> Option<&str>;
}

/// A person undergoing evaluation. The id is sourced from the scheduling
/// portal, not generated locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub dob: Date,
    pub first_name: String,
    pub last_name: String,
    pub preferred_name: Option<String>,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub diagnosis: Option<DiagnosisCategory>,
    #[serde(default)]
    pub language: Language,
    pub active: bool,
    /// An IFSP (early intervention plan) exists for the client.
    #[serde(default)]
    pub ifsp: bool,
    #[serde(default)]
    pub ifsp_downloaded: bool,
}

impl Client {
    /// Age in whole years on `today`.
    pub fn age_on(&self, today: Date) -> i16 {
        let mut years = today.year() - self.dob.year();
        if (today.month(), today.day()) < (self.dob.month(), self.dob.day()) {
            years -= 1;
        }
        years
    }

    /// The client has an IFSP on file that nobody has pulled down yet.
    pub fn needs_ifsp_download(&self) -> bool {
        self.ifsp && !self.ifsp_downloaded
    }

    /// True when the client has a phone number with at least one digit.
    pub fn has_phone_number(&self) -> bool {
        self.phone_number
            .as_deref()
            .is_some_and(|p| p.chars().any(|c| c.is_ascii_digit()))
    }
}

impl Contact for Client {
    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref().filter(|p| !p.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosisCategory {
    #[serde(rename = "ASD")]
    Asd,
    #[serde(rename = "ADHD")]
    Adhd,
    #[serde(rename = "ASD+ADHD")]
    Both,
}

impl DiagnosisCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asd => "ASD",
            Self::Adhd => "ADHD",
            Self::Both => "ASD+ADHD",
        }
    }
}

impl fmt::Display for DiagnosisCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiagnosisCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASD" => Ok(Self::Asd),
            "ADHD" => Ok(Self::Adhd),
            "ASD+ADHD" | "BOTH" | "ASD/ADHD" => Ok(Self::Both),
            other => Err(CoreError::UnknownDiagnosis(other.to_string())),
        }
    }
}

/// Language used for client-facing messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
    Spanish,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "english",
            Self::Spanish => "spanish",
        }
    }
}

impl FromStr for Language {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(Self::English),
            "spanish" | "es" => Ok(Self::Spanish),
            other => Err(CoreError::UnknownLanguage(other.to_string())),
        }
    }
}
