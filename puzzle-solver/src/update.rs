//! Progress and result events streamed from a running problem

use crate::identifier::Identifier;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One streamed event, tagged with the problem that produced it
///
/// Serializes as a flat JSON object: `{"type": "text", "id": {...}, "text": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub id: Identifier,
    #[serde(flatten)]
    pub kind: UpdateKind,
}

/// Payload of an [`Update`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum UpdateKind {
    /// The session accepted the input and is about to run the problem
    Start,
    /// Free-form log line
    Text { text: String },
    /// Character grid, one string per row
    Grid { rows: Vec<String> },
    /// Grid of styled glyphs
    GlyphGrid { rows: Vec<Vec<Glyph>> },
    /// Tabular data
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Terminal result; exactly one per session, always last
    Finished {
        successful: bool,
        solution: Option<String>,
        error: Option<String>,
        elapsed_nanoseconds: Option<i64>,
    },
}

/// A single cell of a [`UpdateKind::GlyphGrid`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Glyph {
    pub glyph: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl Glyph {
    pub fn plain(glyph: impl Into<String>) -> Self {
        Self {
            glyph: glyph.into(),
            foreground: None,
            background: None,
        }
    }

    pub fn colored(glyph: impl Into<String>, foreground: impl Into<String>) -> Self {
        Self {
            glyph: glyph.into(),
            foreground: Some(foreground.into()),
            background: None,
        }
    }
}

impl Update {
    pub fn new(id: Identifier, kind: UpdateKind) -> Self {
        Self { id, kind }
    }

    pub fn start(id: Identifier) -> Self {
        Self::new(id, UpdateKind::Start)
    }

    /// Successful terminal update without timing information
    pub fn solved(id: Identifier, solution: impl Into<String>) -> Self {
        Self::new(
            id,
            UpdateKind::Finished {
                successful: true,
                solution: Some(solution.into()),
                error: None,
                elapsed_nanoseconds: None,
            },
        )
    }

    /// Unsuccessful terminal update without timing information
    pub fn failed(id: Identifier, error: impl Into<String>) -> Self {
        Self::new(
            id,
            UpdateKind::Finished {
                successful: false,
                solution: None,
                error: Some(error.into()),
                elapsed_nanoseconds: None,
            },
        )
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.kind, UpdateKind::Finished { .. })
    }

    /// Stamp a `finished` update with the measured solve duration; other kinds are returned as-is
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        if let UpdateKind::Finished {
            elapsed_nanoseconds,
            ..
        } = &mut self.kind
        {
            *elapsed_nanoseconds = Some(i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id() -> Identifier {
        Identifier::new("Advent of Code", 2023, "alice", "Day 1", "Part 1").unwrap()
    }

    #[test]
    fn test_text_wire_shape() {
        let update = Update::new(id(), UpdateKind::Text { text: "hi".into() });
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({
                "type": "text",
                "id": {
                    "source": "Advent of Code",
                    "year": 2023,
                    "author": "alice",
                    "setName": "Day 1",
                    "problemName": "Part 1"
                },
                "text": "hi"
            })
        );
    }

    #[test]
    fn test_finished_wire_shape() {
        let update = Update::solved(id(), "42").with_elapsed(Duration::from_micros(3));
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value["type"], "finished");
        assert_eq!(value["successful"], true);
        assert_eq!(value["solution"], "42");
        assert_eq!(value["error"], serde_json::Value::Null);
        assert_eq!(value["elapsedNanoseconds"], 3000);
    }

    #[test]
    fn test_glyph_grid_tag_is_kebab_case() {
        let update = Update::new(
            id(),
            UpdateKind::GlyphGrid {
                rows: vec![vec![Glyph::colored("#", "red"), Glyph::plain(".")]],
            },
        );
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value["type"], "glyph-grid");
        assert_eq!(value["rows"][0][0], json!({"glyph": "#", "foreground": "red"}));
        assert_eq!(value["rows"][0][1], json!({"glyph": "."}));
    }

    #[test]
    fn test_with_elapsed_ignores_progress_updates() {
        let update = Update::start(id()).with_elapsed(Duration::from_secs(1));
        assert_eq!(update.kind, UpdateKind::Start);
    }
}
