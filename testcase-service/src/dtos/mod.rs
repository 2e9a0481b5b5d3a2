use serde::Deserialize;

/// Output format for generated test cases.
///
/// Only these two values are accepted; anything else is a client error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageMode {
    Gherkin,
    Traditional,
}

impl std::str::FromStr for LanguageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gherkin" => Ok(LanguageMode::Gherkin),
            "traditional" => Ok(LanguageMode::Traditional),
            _ => Err(format!(
                "Invalid language_mode '{}': expected 'gherkin' or 'traditional'",
                s
            )),
        }
    }
}

impl std::fmt::Display for LanguageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LanguageMode::Gherkin => write!(f, "gherkin"),
            LanguageMode::Traditional => write!(f, "traditional"),
        }
    }
}

/// Body of `POST /generate-excel-proxy`.
#[derive(Debug, Deserialize)]
pub struct ExcelProxyRequest {
    pub content: String,
}
