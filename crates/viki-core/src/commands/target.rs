use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};

/// Prefix marking a web application target in the stored string form.
pub const WEB_PREFIX: &str = "web://";

/// Destination bound to a trigger phrase.
///
/// Parsed once from its stored string at the registry boundary. Deeper layers
/// match on the variant and never look at the string form again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionTarget {
    /// A program launched directly (`.exe` suffix, any case).
    Executable(PathBuf),
    /// Any other path, opened with the platform's default handler.
    File(PathBuf),
    /// A web application or URL fragment, stored as `web://<name>`.
    WebApp(String),
}

impl ActionTarget {
    /// Classify a stored target string.
    pub fn parse(raw: &str) -> Self {
        if let Some(name) = raw.strip_prefix(WEB_PREFIX) {
            return ActionTarget::WebApp(name.to_string());
        }

        if raw.to_lowercase().ends_with(".exe") {
            ActionTarget::Executable(PathBuf::from(raw))
        } else {
            ActionTarget::File(PathBuf::from(raw))
        }
    }

    /// Encode back into the stored string form.
    pub fn encode(&self) -> String {
        match self {
            ActionTarget::Executable(path) | ActionTarget::File(path) => {
                path.to_string_lossy().into_owned()
            }
            ActionTarget::WebApp(name) => format!("{WEB_PREFIX}{name}"),
        }
    }
}

impl From<String> for ActionTarget {
    fn from(raw: String) -> Self {
        ActionTarget::parse(&raw)
    }
}

impl From<ActionTarget> for String {
    fn from(target: ActionTarget) -> Self {
        target.encode()
    }
}

impl fmt::Display for ActionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
