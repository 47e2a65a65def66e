use std::io::BufRead;
use std::ops::Range;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use crate::error::TraceError;

/// One memory reference of a trace
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub struct TraceEvent {
    pub address: u64,
    pub is_write: bool,
}

impl TraceEvent {
    pub fn read(address: u64) -> Self {
        Self { address, is_write: false }
    }

    pub fn write(address: u64) -> Self {
        Self { address, is_write: true }
    }
}

lazy_static! {
    // `R 0x1f`, `w 31`, surrounding whitespace allowed
    static ref TRACE_LINE: Regex = Regex::new(
        r"^\s*(?P<op>[RrWw])\s+(?:0[xX](?P<hex>[0-9a-fA-F]+)|(?P<dec>[0-9]+))\s*$"
    ).unwrap();
}

/// Parses a single trace line
///
/// Returns `None` for blank lines and `#` comments, which carry no event
///
/// # Arguments
///
/// * `line_number`: One based line number, used in the error
/// * `text`: The line, without its terminator
///
/// returns: Result<Option<TraceEvent>, TraceError>
///
/// # Examples
///
/// ```
/// use hierlib::trace::{parse_line, TraceEvent};
/// assert_eq!(parse_line(1, "W 0x1A").unwrap(), Some(TraceEvent::write(26)));
/// assert_eq!(parse_line(2, "# comment").unwrap(), None);
/// ```
pub fn parse_line(line_number: usize, text: &str) -> Result<Option<TraceEvent>, TraceError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let malformed = || TraceError::Malformed {
        line: line_number,
        text: trimmed.to_string(),
    };
    let captures = TRACE_LINE.captures(trimmed).ok_or_else(malformed)?;
    let address = match (captures.name("hex"), captures.name("dec")) {
        (Some(hex), _) => u64::from_str_radix(hex.as_str(), 16),
        (None, Some(dec)) => dec.as_str().parse::<u64>(),
        (None, None) => return Err(malformed()),
    }
    .map_err(|_| malformed())?;
    let is_write = matches!(&captures["op"], "W" | "w");
    Ok(Some(TraceEvent { address, is_write }))
}

/// Lazily reads events from a text trace, one per line
///
/// Yields an error for the first malformed line and for read failures; reading can continue
/// past either
pub struct TraceReader<R: BufRead> {
    reader: R,
    line_number: usize,
    buffer: String,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buffer: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceEvent, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buffer.clear();
            match self.reader.read_line(&mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_number += 1;
                    match parse_line(self.line_number, &self.buffer) {
                        Ok(Some(event)) => return Some(Ok(event)),
                        Ok(None) => continue,
                        Err(e) => return Some(Err(e)),
                    }
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// How each address of a segment is accessed
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AccessMode {
    Read,
    Write,
    /// A read immediately followed by a write to the same address
    ReadThenWrite,
}

/// A run over a contiguous address range
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Segment {
    pub range: Range<u64>,
    pub mode: AccessMode,
}

impl Segment {
    pub fn new(range: Range<u64>, mode: AccessMode) -> Self {
        Self { range, mode }
    }

    pub fn events(&self) -> impl Iterator<Item = TraceEvent> + '_ {
        self.range.clone().flat_map(move |address| {
            let events: &'static [bool] = match self.mode {
                AccessMode::Read => &[false],
                AccessMode::Write => &[true],
                AccessMode::ReadThenWrite => &[false, true],
            };
            events.iter().map(move |&is_write| TraceEvent { address, is_write })
        })
    }
}

/// A named access pattern. Iterating it again replays it from the start
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Phase {
    pub name: &'static str,
    pub segments: Vec<Segment>,
}

impl Phase {
    pub fn new(name: &'static str, segments: Vec<Segment>) -> Self {
        Self { name, segments }
    }

    pub fn events(&self) -> impl Iterator<Item = TraceEvent> + '_ {
        self.segments.iter().flat_map(|segment| segment.events())
    }

    pub fn len(&self) -> usize {
        self.segments
            .iter()
            .map(|s| {
                let per_address = if s.mode == AccessMode::ReadThenWrite { 2 } else { 1 };
                (s.range.end.saturating_sub(s.range.start)) as usize * per_address
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The built-in workload: spatial, temporal and mixed patterns, run one after the other on the
/// same hierarchy
pub fn standard_workload() -> Vec<Phase> {
    use AccessMode::*;
    vec![
        Phase::new("Spatial Access - Read", vec![Segment::new(0..1000, Read)]),
        Phase::new("Spatial Access - Write", vec![Segment::new(0..2000, Write)]),
        Phase::new(
            "Temporal Access - Read",
            vec![
                Segment::new(0..1000, Read),
                Segment::new(0..1000, Read),
                Segment::new(1000..2000, Read),
                Segment::new(1000..2000, Read),
            ],
        ),
        Phase::new(
            "Temporal Access - Write",
            vec![
                Segment::new(0..4000, Write),
                Segment::new(0..4000, Write),
                Segment::new(1000..2000, Write),
                Segment::new(1000..2000, Write),
            ],
        ),
        Phase::new(
            "Mixed Access - Read",
            vec![
                Segment::new(0..100, Read),
                Segment::new(500..3000, Read),
                Segment::new(500..3000, Read),
            ],
        ),
        Phase::new(
            "Mixed Access - Write",
            vec![
                Segment::new(0..1000, Write),
                Segment::new(0..1000, Write),
                Segment::new(2000..6000, Write),
            ],
        ),
        Phase::new(
            "Mixed Access - Read & Write",
            vec![
                Segment::new(0..1000, ReadThenWrite),
                Segment::new(0..1000, ReadThenWrite),
                Segment::new(2000..6000, ReadThenWrite),
            ],
        ),
    ]
}
