use std::error;
use std::fmt;

/// Everything that can stop the figure from being produced.
#[derive(Debug)]
pub enum FigureError {
    /// Fewer qualifying biallelic sites than columns requested.
    TooFewSites { found: usize, required: usize },
    /// A site carried a different number of genotypes than there are haplotypes.
    WidthMismatch { found: usize, expected: usize },
    /// A parameter is out of its valid range.
    ConfigError(String),
    Io(std::io::Error),
    Profile(toml::de::Error),
    Serialize(serde_json::Error),
}

impl fmt::Display for FigureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewSites { found, required } => write!(
                f,
                "Only {found} segregating biallelic SNPs ({required} required); increase parameters and rerun."
            ),
            Self::WidthMismatch { found, expected } => write!(
                f,
                "Unexpected number of genotypes per site: {found} (expected {expected})."
            ),
            Self::ConfigError(msg) => write!(f, "Invalid configuration: {msg}"),
            Self::Io(why) => write!(f, "I/O error: {why}"),
            Self::Profile(why) => write!(f, "Could not parse the profile: {why}"),
            Self::Serialize(why) => write!(f, "Could not serialize the figure: {why}"),
        }
    }
}

impl error::Error for FigureError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(why) => Some(why),
            Self::Profile(why) => Some(why),
            Self::Serialize(why) => Some(why),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FigureError {
    fn from(why: std::io::Error) -> Self {
        Self::Io(why)
    }
}

impl From<toml::de::Error> for FigureError {
    fn from(why: toml::de::Error) -> Self {
        Self::Profile(why)
    }
}

impl From<serde_json::Error> for FigureError {
    fn from(why: serde_json::Error) -> Self {
        Self::Serialize(why)
    }
}

pub type Result<T> = std::result::Result<T, FigureError>;

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn messages() {
        let err = FigureError::TooFewSites {
            found: 12,
            required: 20,
        };
        assert_eq!(
            err.to_string(),
            "Only 12 segregating biallelic SNPs (20 required); increase parameters and rerun."
        );
        let err = FigureError::WidthMismatch {
            found: 19,
            expected: 20,
        };
        assert!(err.to_string().contains("19 (expected 20)"));
    }
}
