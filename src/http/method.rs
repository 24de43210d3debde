use std::fmt::{self, Display};

/// Access class of a probe request. `Read` maps to GET semantics,
/// `Write` to POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethod {
    Read,
    Write,
}

impl ProbeMethod {
    /// Parse a method label from a custom catalog file. Both the access-class
    /// names and the wire verbs are accepted.
    pub fn from_label(label: &str) -> Option<ProbeMethod> {
        match label.trim().to_ascii_uppercase().as_str() {
            "READ" | "GET" => Some(ProbeMethod::Read),
            "WRITE" | "POST" => Some(ProbeMethod::Write),
            _ => None,
        }
    }
}

impl Display for ProbeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProbeMethod::Read => "GET",
            ProbeMethod::Write => "POST",
        };
        write!(f, "{label}")
    }
}

impl From<ProbeMethod> for reqwest::Method {
    fn from(method: ProbeMethod) -> Self {
        match method {
            ProbeMethod::Read => reqwest::Method::GET,
            ProbeMethod::Write => reqwest::Method::POST,
        }
    }
}
