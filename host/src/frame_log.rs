//! Tabular per-tick position log, readable by the replay viewer.
//!
//! ```text
//! <width> <height> <paddle_height> <record_count>
//! <ball_x>
//! <ball_y>
//! <paddle1_y>
//! <paddle2_y>
//! ...
//! ```
//!
//! `record_count` is the number of integer lines after the header, four per
//! tick.

use std::io::{self, Write};

use pong_core::{PositionFrame, SimulationConfig, SimulationState};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameLogError {
    #[error("frame log is empty")]
    Empty,

    #[error("bad header '{0}': expected '<width> <height> <paddle_height> <record_count>'")]
    Header(String),

    #[error("line {line}: '{text}' is not an integer")]
    Value { line: usize, text: String },

    #[error("header promises {expected} values, found {found}")]
    Count { expected: usize, found: usize },

    #[error("record count {0} is not a multiple of 4")]
    Ragged(usize),

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameLog {
    pub width: i32,
    pub height: i32,
    pub paddle_height: i32,
    pub records: Vec<PositionFrame>,
}

impl FrameLog {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            paddle_height: config.paddle_height,
            records: Vec::new(),
        }
    }

    pub fn record(&mut self, state: &SimulationState) {
        self.records.push(state.positions());
    }

    pub fn ticks(&self) -> usize {
        self.records.len()
    }

    /// Integer lines after the header.
    pub fn value_count(&self) -> usize {
        self.records.len() * 4
    }

    pub fn write_to<W: Write>(&self, mut out: W) -> io::Result<()> {
        out.write_all(self.to_text().as_bytes())?;
        out.flush()
    }

    pub fn to_text(&self) -> String {
        let mut text = format!(
            "{} {} {} {}\n",
            self.width,
            self.height,
            self.paddle_height,
            self.value_count()
        );
        for record in &self.records {
            for v in record {
                text.push_str(&v.to_string());
                text.push('\n');
            }
        }
        text
    }

    pub fn save(&self, path: &str) -> Result<(), FrameLogError> {
        let file = std::fs::File::create(path)?;
        self.write_to(io::BufWriter::new(file))?;
        Ok(())
    }

    pub fn load(path: &str) -> Result<Self, FrameLogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    /// Parse the text form. A leading `#` on the header is accepted.
    pub fn parse(text: &str) -> Result<Self, FrameLogError> {
        let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

        let (_, header) = lines.next().ok_or(FrameLogError::Empty)?;
        let fields: Vec<&str> = header
            .trim_start()
            .trim_start_matches('#')
            .split_whitespace()
            .collect();
        let bad_header = || FrameLogError::Header(header.to_string());
        if fields.len() != 4 {
            return Err(bad_header());
        }
        let width: i32 = fields[0].parse().map_err(|_| bad_header())?;
        let height: i32 = fields[1].parse().map_err(|_| bad_header())?;
        let paddle_height: i32 = fields[2].parse().map_err(|_| bad_header())?;
        let expected: usize = fields[3].parse().map_err(|_| bad_header())?;
        if expected % 4 != 0 {
            return Err(FrameLogError::Ragged(expected));
        }

        // header count is untrusted; the count check below rejects a mismatch
        let mut values = Vec::with_capacity(expected.min(text.len() / 2));
        for (idx, line) in lines {
            let text = line.trim();
            let v: i32 = text.parse().map_err(|_| FrameLogError::Value {
                line: idx + 1,
                text: text.to_string(),
            })?;
            values.push(v);
        }
        if values.len() != expected {
            return Err(FrameLogError::Count { expected, found: values.len() });
        }

        let records = values
            .chunks_exact(4)
            .map(|c| [c[0], c[1], c[2], c[3]])
            .collect();
        Ok(Self { width, height, paddle_height, records })
    }

    /// SHA-256 over a version tag, the header and every value, little-endian.
    /// Two runs with the same config and seed give the same digest.
    pub fn digest(&self) -> [u8; 32] {
        let mut h = Sha256::new();
        h.update(b"PONGFRAMESv1");
        h.update(self.width.to_le_bytes());
        h.update(self.height.to_le_bytes());
        h.update(self.paddle_height.to_le_bytes());

        let mut buf = Vec::with_capacity(self.value_count() * 4);
        for record in &self.records {
            for v in record {
                buf.extend_from_slice(&v.to_le_bytes());
            }
        }
        h.update(&buf);

        let out = h.finalize();
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&out);
        arr
    }

    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }
}
