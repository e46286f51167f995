use serde::{Deserialize, Serialize};

/// Which wrapped tracker produced a frame's box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerKind {
    Fast,
    ReDetector,
}

impl std::fmt::Display for TrackerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackerKind::Fast => write!(f, "fast tracker"),
            TrackerKind::ReDetector => write!(f, "re-detector"),
        }
    }
}
