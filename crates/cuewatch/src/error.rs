use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("invalid URL `{input}`: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("unsupported scheme `{scheme}`, expected http or https")]
    UnsupportedScheme { scheme: String },

    #[error("HTTP request failed: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    #[error("request failed with HTTP {status} while fetching {url}")]
    HttpStatus { status: StatusCode, url: String },

    #[error("playlist error: {reason}")]
    Playlist { reason: String },

    #[error("no usable variant found in master playlist {url}")]
    NoVariants { url: String },

    #[error("event receiver dropped")]
    ChannelClosed,
}

impl MonitorError {
    pub fn invalid_url(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn http_status(status: StatusCode, url: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
        }
    }

    pub fn playlist(reason: impl Into<String>) -> Self {
        Self::Playlist {
            reason: reason.into(),
        }
    }

    /// URL rejected before any network activity.
    pub fn is_url_validation(&self) -> bool {
        matches!(self, Self::InvalidUrl { .. } | Self::UnsupportedScheme { .. })
    }

    /// Failure talking to the origin server.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::HttpStatus { .. })
    }
}
