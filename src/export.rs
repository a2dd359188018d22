//! Export of the result log, one CSV file per sheet.

use csv::WriterBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::models::{Language, SimulationReport, SimulationResult};
use crate::session::{ExportedData, ExportedTable};

/// Write a result table with localized headers
pub fn write_result<P: AsRef<Path>>(
    path: P,
    result: &SimulationResult,
    language: Language,
) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(language.result_headers())?;
    for day in &result.rows {
        writer.write_record(day.to_record())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_report<P: AsRef<Path>>(path: P, report: &SimulationReport) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(SimulationReport::HEADERS)?;
    for entry in &report.entries {
        writer.write_record([entry.parameter.as_str(), entry.value.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write every record as `<dir>/<sheet_name>.csv`, creating `dir` if needed
pub fn write_workbook<P: AsRef<Path>>(
    dir: P,
    tables: &[ExportedTable],
    language: Language,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(tables.len());
    for table in tables {
        let path = dir.join(format!("{}.csv", table.sheet_name));
        match &table.data {
            ExportedData::Simulation(result) => write_result(&path, result, language)?,
            ExportedData::Report(report) => write_report(&path, report)?,
        }
        written.push(path);
    }

    info!(dir = %dir.display(), sheets = written.len(), "Exported simulation tables");
    Ok(written)
}
