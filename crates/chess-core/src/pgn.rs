//! PGN records: tag pairs plus the SAN mainline.
//!
//! Parsing goes through `pgn-reader`; only the mainline is kept, comments and
//! variations are dropped. Export follows the usual seven-tag-roster layout so
//! files written here read like any other PGN tool's output.

use std::fmt::Write as _;
use std::ops::ControlFlow;

use pgn_reader::{RawTag, Reader, SanPlus, Skip, Visitor};

/// Result tag value of a game that is still being played.
pub const IN_PROGRESS: &str = "*";

/// Tags that are always exported first, in this order.
const SEVEN_TAG_ROSTER: [&str; 7] = ["Event", "Site", "Date", "Round", "White", "Black", "Result"];

/// Movetext lines are wrapped at this many columns.
const MAX_LINE_WIDTH: usize = 80;

#[derive(Debug, thiserror::Error)]
pub enum PgnError {
    #[error("no game found in PGN text")]
    NoGame,

    #[error("PGN read error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single game: ordered tags and mainline moves in SAN.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PgnRecord {
    tags: Vec<(String, String)>,
    pub moves: Vec<String>,
}

impl PgnRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a tag, if present.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set a tag, replacing an existing value in place so ordering is stable.
    pub fn set_tag(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.tags.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.tags.push((name.to_string(), value)),
        }
    }

    /// The Result tag, or `*` when absent.
    pub fn result(&self) -> &str {
        self.tag("Result").unwrap_or(IN_PROGRESS)
    }

    /// Parse the first game found in `text`.
    pub fn parse(text: &str) -> Result<Self, PgnError> {
        let mut reader = Reader::new(text.as_bytes());
        let mut collector = RecordCollector;
        reader.read_game(&mut collector)?.ok_or(PgnError::NoGame)
    }

    /// Export as PGN text: tags, a blank line, then wrapped movetext ending in
    /// the result token. No trailing newline.
    pub fn to_pgn_string(&self) -> String {
        let mut out = String::new();

        for name in SEVEN_TAG_ROSTER {
            let value = match name {
                "Result" => self.result(),
                _ => self.tag(name).unwrap_or("?"),
            };
            write_tag(&mut out, name, value);
        }
        for (name, value) in &self.tags {
            if !SEVEN_TAG_ROSTER.contains(&name.as_str()) {
                write_tag(&mut out, name, value);
            }
        }
        out.push('\n');

        let mut tokens = Vec::with_capacity(self.moves.len() * 3 / 2 + 1);
        for (ply, san) in self.moves.iter().enumerate() {
            if ply % 2 == 0 {
                tokens.push(format!("{}.", ply / 2 + 1));
            }
            tokens.push(san.clone());
        }
        tokens.push(self.result().to_string());

        let mut line_len = 0;
        for token in tokens {
            if line_len > 0 {
                if line_len + 1 + token.len() > MAX_LINE_WIDTH {
                    out.push('\n');
                    line_len = 0;
                } else {
                    out.push(' ');
                    line_len += 1;
                }
            }
            line_len += token.len();
            out.push_str(&token);
        }

        out
    }
}

fn write_tag(out: &mut String, name: &str, value: &str) {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    let _ = writeln!(out, "[{name} \"{escaped}\"]");
}

/// Visitor that keeps tags and mainline SAN tokens verbatim.
struct RecordCollector;

impl Visitor for RecordCollector {
    type Tags = Vec<(String, String)>;
    type Movetext = PgnRecord;
    type Output = PgnRecord;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(Vec::new())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let name = String::from_utf8_lossy(name).into_owned();
        tags.push((name, value.decode_utf8_lossy().into_owned()));
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(PgnRecord {
            tags,
            moves: Vec::new(),
        })
    }

    fn begin_variation(
        &mut self,
        _movetext: &mut Self::Movetext,
    ) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn san(&mut self, movetext: &mut Self::Movetext, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        movetext.moves.push(san_plus.to_string());
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, movetext: Self::Movetext) -> Self::Output {
        movetext
    }
}
