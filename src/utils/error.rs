use chrono::NaiveDate;
use thiserror::Error;

/// Rejection reasons for a raw absence range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("input matches none of the supported range formats")]
    MalformedInput,

    #[error("end of range lies before its start")]
    EndBeforeStart,

    #[error("indefinite absences are not allowed")]
    IndefiniteNotAllowed,

    #[error("not a valid calendar date or clock time: {value}")]
    InvalidDate { value: String },
}

impl ParseError {
    /// Reply shown to the person who submitted the range.
    pub fn user_message(&self) -> String {
        match self {
            ParseError::IndefiniteNotAllowed => {
                "Bitte einen **konkreten** Abmeldezeitraum angeben (kein „unbestimmt“).".to_string()
            }
            ParseError::EndBeforeStart => "Ende liegt vor dem Beginn.".to_string(),
            ParseError::MalformedInput | ParseError::InvalidDate { .. } => [
                "Ungültiges Zeitraum-Format. Beispiele:",
                "• `17.11.2025`",
                "• `17.11.2025 09:00 - 17.11.2025 16:00`",
                "• `17.11.2025 - 20.11.2025`",
                "• `17.11.2025 09:00 - 16:00`",
            ]
            .join("\n"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DigestError {
    #[error("Invalid absence range: {0}")]
    Parse(#[from] ParseError),

    #[error("Day record update failed for {date}: {source}")]
    StoreFailure {
        date: NaiveDate,
        #[source]
        source: Box<DigestError>,
    },

    #[error("Day record not found: {handle}")]
    RecordNotFound { handle: String },

    #[error("Channel error: {message}")]
    ChannelError { message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid day {year}-{month:02}-{day:02}")]
    InvalidDay { year: i32, month: u32, day: u32 },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DigestError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DigestError::Parse(_) => ErrorSeverity::Low,
            DigestError::StoreFailure { .. }
            | DigestError::RecordNotFound { .. }
            | DigestError::ChannelError { .. }
            | DigestError::HttpError(_) => ErrorSeverity::Medium,
            DigestError::InvalidDay { .. } | DigestError::SerializationError(_) => {
                ErrorSeverity::High
            }
            DigestError::IoError(_)
            | DigestError::ConfigValidationError { .. }
            | DigestError::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DigestError::Parse(e) => e.user_message(),
            DigestError::StoreFailure { .. }
            | DigestError::RecordNotFound { .. }
            | DigestError::ChannelError { .. }
            | DigestError::HttpError(_) => {
                "Fehler beim Eintragen. Bitte probiere es erneut.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            DigestError::Parse(_) => "Correct the range text and submit again",
            DigestError::StoreFailure { .. } => {
                "Earlier days are already recorded; check the digest before resubmitting to avoid duplicate lines"
            }
            DigestError::RecordNotFound { .. } => {
                "The day record was removed from the channel; drop its entry from the state file to recreate it"
            }
            DigestError::ChannelError { .. } | DigestError::HttpError(_) => {
                "Check the webhook URL and network connectivity"
            }
            DigestError::IoError(_) => "Check that the state directory exists and is writable",
            DigestError::SerializationError(_) => "The state file is corrupt; restore it from a backup",
            DigestError::InvalidDay { .. } => "Use a day that exists in the given month",
            DigestError::ConfigValidationError { .. }
            | DigestError::InvalidConfigValueError { .. } => "Review the configuration file",
        }
    }
}

pub type Result<T> = std::result::Result<T, DigestError>;
