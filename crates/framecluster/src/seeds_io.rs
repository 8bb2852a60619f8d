use crate::kmeans::Representatives;
use crate::types::{NUM_CLUSTERS, Vec3};
use snafu::prelude::*;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum SeedsError {
    #[snafu(display("could not access seeds file {}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("line {line} is not three numbers: {content:?}"))]
    Parse { line: usize, content: String },

    #[snafu(display("expected {expected} seeds, found {found}"))]
    WrongCount { expected: usize, found: usize },
}

/// One representative per line, tab-separated.
pub fn format_seeds(representatives: &Representatives) -> String {
    let mut out = String::new();
    for r in representatives {
        // Writing to a String can't fail
        let _ = writeln!(out, "{:.6}\t{:.6}\t{:.6}", r.x, r.y, r.z);
    }
    out
}

/// Accepts any whitespace between the three numbers and skips blank lines.
pub fn parse_seeds(text: &str) -> Result<Representatives, SeedsError> {
    let mut seeds = Vec::with_capacity(NUM_CLUSTERS);

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let values: Vec<f32> = line
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .ok()
            .filter(|v: &Vec<f32>| v.len() == 3)
            .context(ParseSnafu {
                line: i + 1,
                content: line,
            })?;

        seeds.push(Vec3::new(values[0], values[1], values[2]));
    }

    ensure!(
        seeds.len() == NUM_CLUSTERS,
        WrongCountSnafu {
            expected: NUM_CLUSTERS,
            found: seeds.len()
        }
    );

    Ok(std::array::from_fn(|j| seeds[j]))
}

pub fn write_seeds(path: &Path, representatives: &Representatives) -> Result<(), SeedsError> {
    std::fs::write(path, format_seeds(representatives)).context(IoSnafu { path })
}

pub fn read_seeds(path: &Path) -> Result<Representatives, SeedsError> {
    let text = std::fs::read_to_string(path).context(IoSnafu { path })?;
    parse_seeds(&text)
}
