//! CSV leaderboard export.
//!
//! One file per table and faction. Durations are written as whole elapsed
//! seconds.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::StorageError;
use crate::models::Leaderboards;

/// Files written by an export run.
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    pub files: Vec<PathBuf>,
    pub rows: usize,
}

/// Writes leaderboards as CSV tables into a directory.
pub struct CsvExporter {
    output_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write every table, replacing files from earlier runs.
    pub fn export(&self, boards: &Leaderboards) -> Result<ExportSummary, StorageError> {
        fs::create_dir_all(&self.output_dir)?;
        let mut summary = ExportSummary::default();

        self.write_table(
            "most_active.csv",
            &["portal_id", "average_td", "flip_count"],
            boards.most_active.iter().map(|r| {
                vec![
                    r.portal_id.to_string(),
                    r.average_hold.num_seconds().to_string(),
                    r.flip_count.to_string(),
                ]
            }),
            &mut summary,
        )?;

        for (faction, rows) in &boards.longest_held {
            self.write_table(
                &format!("longest_held_{}.csv", faction),
                &["portal_id", "current_held_td"],
                rows.iter().map(|r| {
                    vec![
                        r.portal_id.to_string(),
                        r.current_held.num_seconds().to_string(),
                    ]
                }),
                &mut summary,
            )?;
        }

        for (faction, rows) in &boards.weakest_by_link {
            self.write_table(
                &format!("weakest_by_link_{}.csv", faction),
                &["portal_id", "health", "level", "links"],
                rows.iter().map(|r| {
                    vec![
                        r.portal_id.to_string(),
                        r.health.to_string(),
                        r.level.to_string(),
                        r.link_count.to_string(),
                    ]
                }),
                &mut summary,
            )?;
        }

        for (faction, rows) in &boards.most_links {
            self.write_table(
                &format!("most_links_{}.csv", faction),
                &["portal_id", "links"],
                rows.iter()
                    .map(|r| vec![r.portal_id.to_string(), r.link_count.to_string()]),
                &mut summary,
            )?;
        }

        for (faction, rows) in &boards.weakest_by_age {
            self.write_table(
                &format!("weakest_by_age_{}.csv", faction),
                &["portal_id", "current_held_td", "health"],
                rows.iter().map(|r| {
                    vec![
                        r.portal_id.to_string(),
                        r.current_held.num_seconds().to_string(),
                        r.health.to_string(),
                    ]
                }),
                &mut summary,
            )?;
        }

        info!(
            "Exported {} rows across {} files to {:?}",
            summary.rows,
            summary.files.len(),
            self.output_dir
        );

        Ok(summary)
    }

    fn write_table<I>(
        &self,
        filename: &str,
        header: &[&str],
        rows: I,
        summary: &mut ExportSummary,
    ) -> Result<(), StorageError>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let path = self.output_dir.join(filename);
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_path(&path)?;

        writer.write_record(header)?;
        let mut count = 0;
        for row in rows {
            writer.write_record(&row)?;
            count += 1;
        }
        writer.flush()?;

        debug!("Wrote {} rows to {:?}", count, path);
        summary.rows += count;
        summary.files.push(path);
        Ok(())
    }
}
