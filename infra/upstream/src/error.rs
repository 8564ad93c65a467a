use std::borrow::Cow;

#[zb_derive::zb_error]
pub enum UpstreamError {
    #[error("Upstream unreachable{}: {source}", format_context(.context))]
    Transport { source: reqwest::Error, context: Option<Cow<'static, str>> },

    #[error("Upstream rejected the request{}: {message}", format_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unexpected upstream response{}: {source}", format_context(.context))]
    Decode { source: serde_json::Error, context: Option<Cow<'static, str>> },
}

impl UpstreamError {
    /// The service understood the request and said no.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}
