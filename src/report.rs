//! Report rows for external renderers
//!
//! Rows carry the columns of the classic token-SID table: Process, Pid,
//! Sid and Comment. Layout and widths are the renderer's business.

use crate::error::Result;
use crate::token::TokenOwner;
use crate::types::ClassificationResult;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// One rendered line of a token-SID report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    /// Owning process image name
    pub process: String,

    /// Owning process id
    pub pid: u32,

    /// SID string as extracted
    pub sid: String,

    /// Classification label (may be empty)
    pub comment: String,
}

impl<E: TokenOwner> From<ClassificationResult<E>> for ReportRow {
    fn from(result: ClassificationResult<E>) -> Self {
        Self {
            process: result.owner.image_name().to_string(),
            pid: result.owner.pid(),
            sid: result.sid,
            comment: result.label,
        }
    }
}

/// Lazily convert classification results into report rows
pub fn rows<E, I>(results: I) -> impl Iterator<Item = ReportRow>
where
    E: TokenOwner,
    I: IntoIterator<Item = ClassificationResult<E>>,
{
    results.into_iter().map(ReportRow::from)
}

/// Write rows as newline-delimited JSON, returning the number written
pub fn to_json_lines<W, I>(mut writer: W, rows: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = ReportRow>,
{
    let mut written = 0;
    for row in rows {
        serde_json::to_writer(&mut writer, &row)?;
        writer.write_all(b"\n")?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}
