use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages reported for one field: either a single message or a list of them.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageList {
    One(String),
    Many(Vec<String>),
}

impl MessageList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            MessageList::One(message) => vec![message],
            MessageList::Many(messages) => messages,
        }
    }
}

impl From<&str> for MessageList {
    fn from(value: &str) -> Self {
        MessageList::One(value.to_owned())
    }
}

impl From<String> for MessageList {
    fn from(value: String) -> Self {
        MessageList::One(value)
    }
}

impl From<Vec<String>> for MessageList {
    fn from(value: Vec<String>) -> Self {
        MessageList::Many(value)
    }
}

impl From<Vec<&str>> for MessageList {
    fn from(value: Vec<&str>) -> Self {
        MessageList::Many(value.into_iter().map(str::to_owned).collect())
    }
}

/// Field name to message list store for server-reported errors.
///
/// Fields keep the order they were recorded or first added in. A field is present only while
/// it has at least one message. Nothing here fails: asking about a field that was never
/// reported returns `false`, `None` or an empty slice.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "IndexMap<String, MessageList>",
    into = "IndexMap<String, Vec<String>>"
)]
pub struct ErrorBag {
    messages: IndexMap<String, Vec<String>>,
}

impl ErrorBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, field: &str) -> bool {
        self.messages.contains_key(field)
    }

    pub fn any(&self) -> bool {
        !self.messages.is_empty()
    }

    /// True when at least one of `fields` has errors. Stops at the first match.
    pub fn any_of<I, S>(&self, fields: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        fields.into_iter().any(|field| self.has(field.as_ref()))
    }

    /// First message of `field`, which is the most recently added one.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.messages
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn all(&self, field: &str) -> &[String] {
        self.messages
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Adds `message` in front of the existing messages of `field` unless it is already there.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let message = message.into();
        let messages = self.messages.entry(field.into()).or_default();
        if !messages.contains(&message) {
            messages.insert(0, message);
        }
    }

    /// Replaces every recorded error with `errors`.
    pub fn record<I, K, M>(&mut self, errors: I)
    where
        I: IntoIterator<Item = (K, M)>,
        K: Into<String>,
        M: Into<MessageList>,
    {
        self.messages = errors
            .into_iter()
            .map(|(field, messages)| (field.into(), messages.into().into_vec()))
            .filter(|(_, messages)| !messages.is_empty())
            .collect();
    }

    /// Replaces every recorded error with the contents of a server JSON body.
    ///
    /// The body is expected to be an object mapping field names to a message or a list of
    /// messages. Anything else records an empty bag.
    pub fn record_value(&mut self, body: &Value) {
        let Value::Object(fields) = body else {
            log::trace!("error body is not an object, clearing recorded errors");
            self.messages.clear();
            return;
        };
        self.record(
            fields
                .iter()
                .map(|(field, messages)| (field.as_str(), MessageList::Many(messages_of(messages)))),
        );
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn clear_field(&mut self, field: &str) {
        self.messages.shift_remove(field);
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.messages
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

fn messages_of(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::String(message) => vec![message.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Null => None,
                Value::String(message) => Some(message.clone()),
                other => Some(other.to_string()),
            })
            .collect(),
        other => vec![other.to_string()],
    }
}

impl From<IndexMap<String, MessageList>> for ErrorBag {
    fn from(value: IndexMap<String, MessageList>) -> Self {
        let mut bag = ErrorBag::new();
        bag.record(value);
        bag
    }
}

impl From<ErrorBag> for IndexMap<String, Vec<String>> {
    fn from(value: ErrorBag) -> Self {
        value.messages
    }
}
