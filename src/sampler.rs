// Clipforge - Frame Sample Input
// Frame samples are produced outside the engine (decoder + detectors). This
// module reads them back as JSON Lines and provides the fixed-step clock the
// producer uses to place samples on the logical timeline.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{ClipforgeError, Result};
use crate::scoring::FrameSample;

/// Streams `FrameSample`s from JSON Lines input, one object per line.
/// Blank lines and lines starting with `#` are skipped.
pub struct SampleReader<R> {
    lines: std::io::Lines<R>,
    line_number: usize,
    clock: Option<SampleClock>,
}

impl<R: BufRead> SampleReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            clock: None,
        }
    }

    /// Stamp samples that carry no `timestamp` with the clock's time for
    /// their position in the stream. Without a clock a missing timestamp
    /// is a parse error.
    pub fn with_clock(mut self, clock: SampleClock) -> Self {
        self.clock = Some(clock);
        self
    }

    fn parse(&mut self, line: &str) -> Result<FrameSample> {
        let slot = self.clock.as_mut().and_then(|clock| clock.next());

        let parse_error = |e: serde_json::Error, line| ClipforgeError::SampleParse {
            line,
            message: e.to_string(),
        };

        let mut value: serde_json::Value =
            serde_json::from_str(line).map_err(|e| parse_error(e, self.line_number))?;
        if let (Some(t), Some(fields)) = (slot, value.as_object_mut()) {
            fields.entry("timestamp").or_insert_with(|| t.into());
        }
        serde_json::from_value(value).map_err(|e| parse_error(e, self.line_number))
    }
}

impl<R: BufRead> Iterator for SampleReader<R> {
    type Item = Result<FrameSample>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_number += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            return Some(self.parse(trimmed));
        }
    }
}

/// Read every sample from a JSON Lines reader
pub fn read_samples<R: BufRead>(reader: R) -> Result<Vec<FrameSample>> {
    SampleReader::new(reader).collect()
}

/// Open a JSON Lines file for streaming. Untimed samples are placed on a
/// `sample_interval` grid.
pub fn open_samples(path: &Path, sample_interval: f64) -> Result<SampleReader<BufReader<File>>> {
    let clock = SampleClock::new(sample_interval)?;
    let file = File::open(path)?;
    Ok(SampleReader::new(BufReader::new(file)).with_clock(clock))
}

/// Fixed-step logical clock. Timestamps are `index * interval`, so long runs
/// do not accumulate floating-point drift.
#[derive(Debug, Clone)]
pub struct SampleClock {
    interval: f64,
    index: u64,
}

impl SampleClock {
    pub fn new(interval: f64) -> Result<Self> {
        if !interval.is_finite() || interval <= 0.0 {
            return Err(ClipforgeError::config(format!(
                "sample interval must be a positive number (got {})",
                interval
            )));
        }
        Ok(Self { interval, index: 0 })
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }
}

impl Iterator for SampleClock {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let t = self.index as f64 * self.interval;
        self.index += 1;
        Some(t)
    }
}
