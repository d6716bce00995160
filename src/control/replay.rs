//! Offline landmark source replaying recorded frames from a JSONL file.
//!
//! One JSON object per line; `hand` is `null` for frames where the tracker
//! saw nothing. Lets the whole pipeline run without a camera.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::control::{LandmarkSource, SourceFrame};
use crate::models::landmarks::HandFrame;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplayRecord {
    hand: Option<HandFrame>,
}

pub struct ReplaySource {
    lines: Lines<BufReader<File>>,
    /// Optional pacing between frames, to mimic a camera's frame rate.
    frame_interval: Option<Duration>,
}

impl ReplaySource {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            frame_interval: None,
        })
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = Some(interval);
        self
    }
}

impl LandmarkSource for ReplaySource {
    fn next_frame(&mut self) -> Option<SourceFrame> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => {
                    log::warn!("replay: read failed, ending stream: {err}");
                    return None;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            if let Some(interval) = self.frame_interval {
                std::thread::sleep(interval);
            }

            return match serde_json::from_str::<ReplayRecord>(&line) {
                Ok(ReplayRecord { hand: Some(frame) }) => Some(SourceFrame::Hand(frame)),
                Ok(ReplayRecord { hand: None }) => Some(SourceFrame::Empty),
                Err(err) => {
                    // One bad line loses one frame, not the session.
                    log::warn!("replay: skipping malformed line: {err}");
                    Some(SourceFrame::Empty)
                }
            };
        }
    }
}
