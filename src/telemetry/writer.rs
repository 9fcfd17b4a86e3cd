use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use super::{LapInfo, LapTelemetrySample, SessionInfo, SessionRecord};
use crate::LapDeltaError;

/// Writes one session in the JSON-lines layout read by [`super::load_session_jsonl`]
pub fn write_session<'a>(
    file: &Path,
    session: &SessionInfo,
    laps: impl IntoIterator<Item = (&'a LapInfo, &'a [LapTelemetrySample])>,
) -> Result<(), LapDeltaError> {
    let session_file = File::create(file).map_err(|e| LapDeltaError::WriterError { source: e })?;
    let mut session_file_writer = BufWriter::new(session_file);

    write_record(
        &mut session_file_writer,
        &SessionRecord::SessionChange(session.clone()),
    )?;
    for (info, samples) in laps {
        write_record(&mut session_file_writer, &SessionRecord::LapStart(info.clone()))?;
        for sample in samples {
            write_record(
                &mut session_file_writer,
                &SessionRecord::DataPoint(sample.clone()),
            )?;
        }
    }
    session_file_writer
        .flush()
        .map_err(|e| LapDeltaError::WriterError { source: e })
}

fn write_record(writer: &mut impl Write, record: &SessionRecord) -> Result<(), LapDeltaError> {
    serde_json::to_writer(&mut *writer, record).map_err(|e| LapDeltaError::WriterError {
        source: e.into(),
    })?;
    writeln!(writer).map_err(|e| LapDeltaError::WriterError { source: e })
}
