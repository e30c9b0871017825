use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// A resolved chat user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub display_name: String,
}

/// Reference to a posted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel_id: String,
    pub ts: String,
}

/// Reply template selected for a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    LeaveRequest,
    Greeting,
}

/// Accent color of a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorCode {
    Positive,
    Neutral,
    Notice,
}

impl ColorCode {
    pub fn hex(&self) -> &'static str {
        match self {
            Self::Positive => "#4af030",
            Self::Neutral => "#3d3d3d",
            Self::Notice => "#36a64f",
        }
    }
}

impl Serialize for ColorCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.hex())
    }
}

/// A labeled field of a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyField {
    pub title: String,
    pub value: String,
    /// Whether Slack may lay the field out side by side with others.
    pub short: bool,
}

impl ReplyField {
    /// A full-width field.
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            short: false,
        }
    }
}

/// A styled reply: heading, body, color, and ordered fields.
///
/// Serializes to the shape of a legacy Slack attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyPayload {
    pub pretext: String,
    #[serde(rename = "text")]
    pub body: String,
    pub color: ColorCode,
    pub fields: Vec<ReplyField>,
}

impl ReplyPayload {
    /// The value of the first field with the given title.
    pub fn field(&self, title: &str) -> Option<&str> {
        self.fields.iter().find(|f| f.title == title).map(|f| f.value.as_str())
    }
}
