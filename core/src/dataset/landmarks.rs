//! Landmark text files: one joint per line, `index,x,y,z`.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::constants::{LANDMARK_DIMS, LANDMARK_POINTS};
use crate::payload::Landmarks;
use crate::types::DatasetError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LandmarkError {
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("expected {expected} landmark points, found {actual}")]
    WrongCount { expected: usize, actual: usize },
}

/// Parse 21 `index,x,y,z` lines into [`Landmarks`].
///
/// Blank lines are ignored. The index column must be present but its value
/// is not used; joints are taken in file order.
pub fn parse_landmarks(text: &str) -> Result<Landmarks, LandmarkError> {
    let mut points: Vec<[f32; LANDMARK_DIMS]> = Vec::with_capacity(LANDMARK_POINTS);

    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split(',').map(str::trim).collect();
        if cols.len() != LANDMARK_DIMS + 1 {
            return Err(LandmarkError::Parse {
                line: i + 1,
                reason: format!("expected 4 comma-separated columns, found {}", cols.len()),
            });
        }

        let mut p = [0f32; LANDMARK_DIMS];
        for (dst, col) in p.iter_mut().zip(&cols[1..]) {
            *dst = col.parse().map_err(|_| LandmarkError::Parse {
                line: i + 1,
                reason: format!("invalid coordinate {:?}", col),
            })?;
        }
        points.push(p);
    }

    let points: [[f32; LANDMARK_DIMS]; LANDMARK_POINTS] =
        points.try_into().map_err(|v: Vec<_>| LandmarkError::WrongCount {
            expected: LANDMARK_POINTS,
            actual: v.len(),
        })?;
    Ok(Landmarks::from_points(points))
}

pub fn read_landmarks(path: impl AsRef<Path>) -> Result<Landmarks, DatasetError> {
    let text = fs::read_to_string(path)?;
    Ok(parse_landmarks(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(n: usize) -> String {
        (0..n)
            .map(|j| format!("{},{},{},{}\n", j, j as f32 * 0.5, 1.0, -0.25))
            .collect()
    }

    #[test]
    fn parses_21_points() {
        let lm = parse_landmarks(&lines(21)).unwrap();
        assert_eq!(lm.point(0), Some([0.0, 1.0, -0.25]));
        assert_eq!(lm.point(20), Some([10.0, 1.0, -0.25]));
    }

    #[test]
    fn blank_lines_are_ignored() {
        let text = format!("\n{}\n\n", lines(21));
        assert!(parse_landmarks(&text).is_ok());
    }

    #[test]
    fn wrong_point_count() {
        assert_eq!(
            parse_landmarks(&lines(20)),
            Err(LandmarkError::WrongCount { expected: 21, actual: 20 })
        );
        assert_eq!(
            parse_landmarks(&lines(22)),
            Err(LandmarkError::WrongCount { expected: 21, actual: 22 })
        );
    }

    #[test]
    fn bad_column_reports_line() {
        let mut text = lines(21);
        text.push_str("21,0.1,abc,0.3\n");
        assert!(matches!(parse_landmarks(&text), Err(LandmarkError::Parse { line: 22, .. })));

        assert!(matches!(parse_landmarks("0,1,2\n"), Err(LandmarkError::Parse { line: 1, .. })));
    }
}
