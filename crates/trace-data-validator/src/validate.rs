//! End-to-end validation of two trace dumps given as text or files.

use std::fs;
use std::path::Path;

use log::{debug, info};
use serde_json::Value;

use crate::codec::decode_records;
use crate::compare::{find_mismatch, Mismatch};
use crate::error::{Side, ValidateError};
use crate::record::Record;

/// Outcome of a run that decoded both sides successfully.
#[derive(Debug, Clone)]
pub enum Verdict {
    Match,
    Mismatch(Mismatch),
}

impl Verdict {
    pub fn is_match(&self) -> bool {
        matches!(self, Verdict::Match)
    }
}

/// Compare two already-parsed trace documents.
pub fn validate_values(expected: &Value, output: &Value) -> Result<Verdict, ValidateError> {
    let expected = decode_side(expected, Side::Expected)?;
    let output = decode_side(output, Side::Output)?;
    debug!(
        "decoded {} expected and {} output record(s)",
        expected.len(),
        output.len()
    );

    Ok(match find_mismatch(&expected, &output) {
        None => Verdict::Match,
        Some(mismatch) => Verdict::Mismatch(mismatch),
    })
}

/// Compare two trace documents given as JSON text.
pub fn validate_str(expected: &str, output: &str) -> Result<Verdict, ValidateError> {
    let expected = parse_side(expected, Side::Expected)?;
    let output = parse_side(output, Side::Output)?;
    validate_values(&expected, &output)
}

/// Compare two trace dump files.
pub fn validate_files(
    expected: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<Verdict, ValidateError> {
    let expected_text = read_side(expected.as_ref(), Side::Expected)?;
    let output_text = read_side(output.as_ref(), Side::Output)?;
    info!(
        "validating {} against {}",
        output.as_ref().display(),
        expected.as_ref().display()
    );
    validate_str(&expected_text, &output_text)
}

fn read_side(path: &Path, side: Side) -> Result<String, ValidateError> {
    fs::read_to_string(path).map_err(|source| ValidateError::Io {
        side,
        path: path.to_path_buf(),
        source,
    })
}

fn parse_side(text: &str, side: Side) -> Result<Value, ValidateError> {
    serde_json::from_str(text).map_err(|source| ValidateError::Json { side, source })
}

fn decode_side(document: &Value, side: Side) -> Result<Vec<Record>, ValidateError> {
    decode_records(document).map_err(|source| ValidateError::Decode { side, source })
}
