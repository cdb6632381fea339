use crate::error::ParseError;

/// Header fields of an inbound message, in the order they appeared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }
}

impl<K: Into<String>, V: Into<String>> std::iter::FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// One message handed over by the MTA: the envelope plus the parsed headers.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub sender: String,
    pub recipients: Vec<String>,
    pub headers: Headers,
}

impl InboundMessage {
    pub fn parse(sender: &str, recipients: &[String], data: &[u8]) -> Result<Self, ParseError> {
        let (headers, _) = mailparse::parse_headers(data)?;
        let headers = headers.iter()
            .map(|h| (h.get_key(), h.get_value()))
            .collect();

        Ok(InboundMessage {
            sender: sender.trim().to_string(),
            recipients: recipients.to_vec(),
            headers,
        })
    }

    pub fn subject(&self) -> &str {
        self.headers.get("Subject").unwrap_or_default()
    }

    pub fn message_id(&self) -> Option<&str> {
        self.headers.get("Message-ID")
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
    }
}
