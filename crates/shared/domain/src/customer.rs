use serde::{Deserialize, Serialize};
use std::fmt;

/// Credentials issued by the login call, as stored in `customers.json`.
///
/// Field names follow the upstream login response so the stored file and the
/// wire format stay interchangeable.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(rename = "klantId", deserialize_with = "crate::wire::id")]
    pub customer_id: String,
    pub token: String,
    #[serde(rename = "voornaam", default)]
    pub first_name: String,
    #[serde(rename = "voorvoegsels", default)]
    pub prefix: String,
    #[serde(rename = "achternaam", default)]
    pub last_name: String,
    #[serde(rename = "waarschuwing", default, deserialize_with = "crate::wire::flag")]
    pub warning: bool,
    #[serde(rename = "boete", default, deserialize_with = "crate::wire::flag")]
    pub fine: bool,
}

impl Customer {
    /// `first [prefix] last`, skipping empty parts.
    #[must_use]
    pub fn display_name(&self) -> String {
        [self.first_name.as_str(), self.prefix.as_str(), self.last_name.as_str()]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// Hand-written so session tokens never end up in logs.
impl fmt::Debug for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Customer")
            .field("customer_id", &self.customer_id)
            .field("token", &"<redacted>")
            .field("name", &self.display_name())
            .field("warning", &self.warning)
            .field("fine", &self.fine)
            .finish()
    }
}
