use thiserror::Error;

/// Errors produced while fetching or assembling weather data.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The provider could not be reached or answered with a non-success status.
    #[error("{message}")]
    Network {
        /// HTTP status, when the provider answered at all.
        status: Option<u16>,
        message: String,
    },

    /// The provider answered, but the payload was not usable.
    #[error("Failed to parse provider response: {0}")]
    Parse(String),

    /// The query had a blank city name.
    #[error("City name must not be blank")]
    Validation,
}

impl WeatherError {
    pub fn network(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Network { status, message: message.into() }
    }

    /// HTTP status carried by a `Network` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } => *status,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_error_displays_provider_message() {
        let err = WeatherError::network(Some(404), "city not found");
        assert_eq!(err.to_string(), "city not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn non_network_errors_have_no_status() {
        assert_eq!(WeatherError::Validation.status(), None);
        assert_eq!(WeatherError::Parse("bad".into()).status(), None);
    }
}
