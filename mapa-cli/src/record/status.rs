//! Classification of provider, inconsistency and approval status

use std::fmt;

pub const EAN_NOT_INFORMED: &str = "EAN não informado";
pub const PROVIDER_UNIDENTIFIED: &str = "Provedor não identificado";
pub const NO_INCONSISTENCIES: &str = "Sem inconsistências";

/// Whether a product was already posted by an accepted provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderStatus {
    Posted(String),
    EanNotInformed,
    Unidentified,
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderStatus::Posted(name) => write!(f, "{}", name),
            ProviderStatus::EanNotInformed => write!(f, "{}", EAN_NOT_INFORMED),
            ProviderStatus::Unidentified => write!(f, "{}", PROVIDER_UNIDENTIFIED),
        }
    }
}

/// Known catalogue issues for a product
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InconsistencyStatus {
    EanNotInformed,
    Clean,
    /// Distinct error messages joined with `"; "`
    Issues(String),
}

impl fmt::Display for InconsistencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InconsistencyStatus::EanNotInformed => write!(f, "{}", EAN_NOT_INFORMED),
            InconsistencyStatus::Clean => write!(f, "{}", NO_INCONSISTENCIES),
            InconsistencyStatus::Issues(joined) => write!(f, "{}", joined),
        }
    }
}

/// Classify the provider of a record.
///
/// `matched` is the provider found for the EAN in the posted-products
/// reference, if any. An empty EAN never matches.
pub fn classify_provider(ean: &str, matched: Option<&str>, accepted: &[String]) -> ProviderStatus {
    if ean.is_empty() {
        return ProviderStatus::EanNotInformed;
    }
    match matched {
        Some(name) if accepted.iter().any(|a| a == name) => ProviderStatus::Posted(name.to_string()),
        _ => ProviderStatus::Unidentified,
    }
}

pub fn classify_inconsistency(ean: &str, grouped: Option<&str>) -> InconsistencyStatus {
    if ean.is_empty() {
        return InconsistencyStatus::EanNotInformed;
    }
    match grouped {
        Some(joined) if !joined.is_empty() => InconsistencyStatus::Issues(joined.to_string()),
        _ => InconsistencyStatus::Clean,
    }
}

/// Summary bucket used by the status counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusBucket {
    Approved,
    Rejected,
    Awaiting,
}

const AWAITING_SPELLINGS: &[&str] = &[
    "aguardando",
    "aguardando atendimento",
    "",
    "none",
    "aguardando validação",
];

impl StatusBucket {
    /// Exact-match bucket for a status text. A missing status counts as
    /// awaiting; anything unrecognised belongs to no bucket.
    pub fn of(status: Option<&str>) -> Option<StatusBucket> {
        let normalized = status.unwrap_or("none").trim().to_lowercase();
        match normalized.as_str() {
            "aprovado" => Some(StatusBucket::Approved),
            "rejeitado" => Some(StatusBucket::Rejected),
            s if AWAITING_SPELLINGS.contains(&s) => Some(StatusBucket::Awaiting),
            _ => None,
        }
    }
}

/// Presentation state of the status badge on a card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeState {
    Awaiting,
    Approved,
    Rejected,
    Other,
}

/// Text shown on the badge when the record has no status
pub const AWAITING_LABEL: &str = "Aguardando validação";

impl BadgeState {
    /// Containment-based state for a status text
    pub fn of(status: Option<&str>) -> BadgeState {
        let s = match status.map(str::trim) {
            None | Some("") => return BadgeState::Awaiting,
            Some(s) => s.to_lowercase(),
        };

        if s.contains("aguardando") {
            BadgeState::Awaiting
        } else if s.contains("aprovado") {
            BadgeState::Approved
        } else if s.contains("rejeitado") {
            BadgeState::Rejected
        } else {
            BadgeState::Other
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            BadgeState::Awaiting => "#888",
            BadgeState::Approved => "#28a745",
            BadgeState::Rejected => "#dc3545",
            BadgeState::Other => "#6c757d",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            BadgeState::Awaiting => "⏳",
            BadgeState::Approved => "✅",
            BadgeState::Rejected => "❌",
            BadgeState::Other => "ℹ️",
        }
    }
}
