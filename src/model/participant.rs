use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ParticipantId(pub i64);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub description: String,
}

impl Participant {
    pub fn decoded_description(&self) -> ParticipantDescription {
        ParticipantDescription::decode(&self.description)
    }
}

/// Participant descriptions may carry a portrait using the `url | text`
/// convention. Whatever follows the first `|` is the text; when that is
/// empty the whole description is shown instead.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParticipantDescription {
    pub image_url: Option<String>,
    pub text: String,
}

impl ParticipantDescription {
    pub fn decode(raw: &str) -> Self {
        let whole = raw.trim();
        let Some((head, rest)) = raw.split_once('|') else {
            return Self {
                image_url: None,
                text: whole.to_string(),
            };
        };
        let head = head.trim();
        let rest = rest.trim();
        Self {
            image_url: is_http_url(head).then(|| head.to_string()),
            text: if rest.is_empty() { whole } else { rest }.to_string(),
        }
    }
}

fn is_http_url(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
