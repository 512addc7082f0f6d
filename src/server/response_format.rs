use clap::ValueEnum;

use crate::adapters::http::wire::{JSON_CONTENT_TYPE, PNG_CONTENT_TYPE};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResponseFormat {
    #[default]
    Json,
    Png,
}

impl ResponseFormat {
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => JSON_CONTENT_TYPE,
            Self::Png => PNG_CONTENT_TYPE,
        }
    }

    /// The first supported media type listed in `accept`, else `fallback`.
    #[must_use]
    pub fn negotiate(accept: Option<&str>, fallback: Self) -> Self {
        accept
            .into_iter()
            .flat_map(|accept| accept.split(','))
            .filter_map(|entry| entry.split(';').next())
            .find_map(|media_type| match media_type.trim() {
                JSON_CONTENT_TYPE => Some(Self::Json),
                PNG_CONTENT_TYPE => Some(Self::Png),
                _ => None,
            })
            .unwrap_or(fallback)
    }
}
