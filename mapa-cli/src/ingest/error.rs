//! Workbook parse errors

/// A sheet or column the pipeline expected could not be read
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Workbook file or sheet the error refers to
    pub location: String,
    pub message: String,
}

impl ParseError {
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

impl std::error::Error for ParseError {}
