use tracing::debug;

use crate::error::Result;
use crate::models::{Field, ParameterSet, RawBlock, UtcDataset, Value};
use crate::readers::column_mapper::{map_columns, ColumnMap, LayoutKind};
use crate::readers::tokenizer::{tokenize, TokenizedRow};
use crate::utils::diagnostics::{Diagnostic, DiagnosticSink};

/// Per-block outcome, kept for the `validate` summary.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockSummary {
    pub timestamp: chrono::NaiveDateTime,
    pub location: usize,
    pub layout: LayoutKind,
    pub levels: usize,
    pub rejected_rows: usize,
    pub surface_rejected: bool,
}

/// Turns raw blocks into a UTC-keyed dataset.
pub struct ProfileAssembler<'a> {
    diagnostics: &'a dyn DiagnosticSink,
    summaries: Vec<BlockSummary>,
}

impl<'a> ProfileAssembler<'a> {
    pub fn new(diagnostics: &'a dyn DiagnosticSink) -> Self {
        Self {
            diagnostics,
            summaries: Vec::new(),
        }
    }

    /// Assemble every block. A later block for the same hour and location
    /// replaces an earlier one.
    pub fn assemble(&mut self, blocks: Vec<RawBlock>) -> Result<UtcDataset> {
        let mut dataset = UtcDataset::new();

        for block in blocks {
            let columns = map_columns(&block)?;
            let params = self.assemble_block(&block, &columns);

            if dataset
                .entry(block.timestamp)
                .or_default()
                .insert(block.location, params)
                .is_some()
            {
                debug!(
                    "Duplicate block for {} location {}; keeping the later one",
                    block.timestamp, block.location
                );
            }
        }

        debug!("Assembled {} hours", dataset.len());
        Ok(dataset)
    }

    pub fn summaries(&self) -> &[BlockSummary] {
        &self.summaries
    }

    fn assemble_block(&mut self, block: &RawBlock, columns: &ColumnMap) -> ParameterSet {
        let mut params = ParameterSet::new(block.lat, block.lng, block.utc_offset);
        let offsets = columns.offsets;

        // surface values: one-element sequences until derivation collapses them
        let surface_line = block.line(offsets.surface_values).unwrap_or("");
        let surface = self.tokenize_row(block, offsets.surface_values, surface_line);
        let expected = columns.surface_names.len();
        let surface_rejected = surface.len() < expected;

        if surface.len() > expected {
            self.diagnostics.report(Diagnostic::LongSurfaceRow {
                timestamp: block.timestamp,
                location: block.location,
                line: self.file_line(block, offsets.surface_values),
                expected,
                found: surface.len(),
            });
        }

        let surface_values: Vec<Value> = if surface_rejected {
            self.diagnostics.report(Diagnostic::ShortSurfaceRow {
                timestamp: block.timestamp,
                location: block.location,
                line: self.file_line(block, offsets.surface_values),
                expected,
                found: surface.len(),
            });
            vec![Value::Missing; expected]
        } else {
            surface.into_values()
        };

        for (name, value) in columns.surface_names.iter().zip(surface_values) {
            params.insert(name.clone(), Field::Levels(vec![value]));
        }

        // level rows
        let width = columns.level_names.len();
        let mut levels: Vec<Vec<Value>> = vec![Vec::new(); width];
        let mut rejected_rows = 0;

        for index in offsets.first_level_row..block.lines.len() {
            let row = self.tokenize_row(block, index, &block.lines[index]);
            if row.is_empty() {
                continue;
            }

            let values = if row.len() == width {
                row.into_values()
            } else {
                rejected_rows += 1;
                self.diagnostics.report(Diagnostic::RowLengthMismatch {
                    timestamp: block.timestamp,
                    location: block.location,
                    line: self.file_line(block, index),
                    expected: width,
                    found: row.len(),
                });
                vec![Value::Missing; width]
            };

            for (column, value) in levels.iter_mut().zip(values) {
                column.push(value);
            }
        }

        let level_count = levels.first().map_or(0, Vec::len);
        for (name, column) in columns.level_names.iter().zip(levels) {
            params.insert(name.clone(), Field::Levels(column));
        }

        self.summaries.push(BlockSummary {
            timestamp: block.timestamp,
            location: block.location,
            layout: columns.layout,
            levels: level_count,
            rejected_rows,
            surface_rejected,
        });

        params
    }

    fn tokenize_row(&self, block: &RawBlock, index: usize, line: &str) -> TokenizedRow {
        let row = tokenize(line);
        for &run_length in &row.ambiguous_runs {
            self.diagnostics.report(Diagnostic::AmbiguousMissingRun {
                timestamp: block.timestamp,
                location: block.location,
                line: self.file_line(block, index),
                run_length,
            });
        }
        row
    }

    fn file_line(&self, block: &RawBlock, index: usize) -> usize {
        block.line_number + index + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::diagnostics::CollectingDiagnostics;
    use chrono::{NaiveDate, NaiveDateTime};

    const BLOCK: &str = "
        PRSS  SHGT  T02M  U10M  V10M  PBLH  TPPA
         hPa                                  mm
     0   996   112  31.5   2.6  -1.8     0     0

        PRES  UWND  VWND  WWND  TEMP  SPHU     TPOT  WDIR  WSPD
               m/s   m/s  mb/h    oC  g/kg       oK   deg   m/s
   993   993   2.5  -1.9  -7.0  31.0   3.2    304.8 307.1   3.1
   984   984   2.5  -1.8  -7.0  29.5   3.0    304.0******   3.1
   973   975   2.3  -1.7  -7.0  27.0   2.8    304.0 305.4
   958   961   2.4  -1.7  -7.0  25.5   2.5    302.1 305.5   3.0

";

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2014, 5, 30)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn block(text: &str, location: usize) -> RawBlock {
        RawBlock {
            timestamp: timestamp(),
            location,
            lat: 37.43,
            lng: -120.40,
            utc_offset: -7.0,
            line_number: 10,
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    #[test]
    fn test_assemble_block() {
        let diagnostics = CollectingDiagnostics::new();
        let mut assembler = ProfileAssembler::new(&diagnostics);
        let dataset = assembler.assemble(vec![block(BLOCK, 0)]).unwrap();

        let params = &dataset[&timestamp()][&0];
        assert_eq!(params.levels("PRSS"), Some(&[Value::raw("996")][..]));
        assert_eq!(params.levels("pressure_at_surface"), Some(&[Value::raw("0")][..]));
        assert_eq!(params.level_count(), 4);

        // six asterisks stand in for one value and the row is kept
        assert_eq!(params.levels("WDIR").unwrap()[1], Value::Missing);
        assert_eq!(params.levels("WSPD").unwrap()[1], Value::raw("3.1"));

        // short row becomes missing across the board
        assert!(params.levels("TEMP").unwrap()[2].is_missing());
        assert!(params.levels("pressure").unwrap()[2].is_missing());
        assert_eq!(params.levels("pressure").unwrap()[3], Value::raw("958"));

        let collected = diagnostics.diagnostics();
        assert_eq!(collected.len(), 1);
        assert!(matches!(
            collected[0],
            Diagnostic::RowLengthMismatch {
                expected: 10,
                found: 9,
                line: 20,
                ..
            }
        ));

        let summary = &assembler.summaries()[0];
        assert_eq!(summary.layout, LayoutKind::Standard);
        assert_eq!(summary.rejected_rows, 1);
        assert!(!summary.surface_rejected);
    }

    #[test]
    fn test_short_surface_row_rejected() {
        let text = BLOCK.replace("     0   996   112  31.5", "     0   996");
        let diagnostics = CollectingDiagnostics::new();
        let mut assembler = ProfileAssembler::new(&diagnostics);
        let dataset = assembler.assemble(vec![block(&text, 0)]).unwrap();

        let params = &dataset[&timestamp()][&0];
        assert_eq!(params.levels("PRSS"), Some(&[Value::Missing][..]));
        assert_eq!(params.levels("TPPA"), Some(&[Value::Missing][..]));
        assert!(matches!(
            diagnostics.diagnostics()[0],
            Diagnostic::ShortSurfaceRow { expected: 8, found: 6, .. }
        ));
    }

    #[test]
    fn test_long_surface_row_reported() {
        let text = BLOCK.replace("-1.8     0     0\n", "-1.8     0     0     5\n");
        let diagnostics = CollectingDiagnostics::new();
        let dataset = ProfileAssembler::new(&diagnostics)
            .assemble(vec![block(&text, 0)])
            .unwrap();

        let params = &dataset[&timestamp()][&0];
        assert_eq!(params.levels("PRSS"), Some(&[Value::raw("996")][..]));
        assert_eq!(params.levels("TPPA"), Some(&[Value::raw("0")][..]));
        assert!(diagnostics.diagnostics().iter().any(|d| matches!(
            d,
            Diagnostic::LongSurfaceRow {
                expected: 8,
                found: 9,
                line: 14,
                ..
            }
        )));
    }

    #[test]
    fn test_ambiguous_run_rejects_level_row() {
        let text = BLOCK.replace("302.1 305.5   3.0", "302.1**********");
        let diagnostics = CollectingDiagnostics::new();
        let dataset = ProfileAssembler::new(&diagnostics)
            .assemble(vec![block(&text, 0)])
            .unwrap();

        let params = &dataset[&timestamp()][&0];
        assert_eq!(params.level_count(), 4);
        for name in ["pressure", "PRES", "TEMP", "TPOT", "WDIR", "WSPD"] {
            assert!(params.levels(name).unwrap()[3].is_missing(), "{} kept a value", name);
        }
        assert_eq!(params.levels("pressure").unwrap()[0], Value::raw("993"));

        let collected = diagnostics.diagnostics();
        assert!(collected
            .iter()
            .any(|d| matches!(d, Diagnostic::AmbiguousMissingRun { run_length: 10, line: 21, .. })));
        assert!(collected
            .iter()
            .any(|d| matches!(d, Diagnostic::RowLengthMismatch { found: 9, line: 21, .. })));
    }

    #[test]
    fn test_shifted_layout_block() {
        let text = "
        PRSS  SHGT  T02M
  TPP3  TPP6
         hPa

     0   996   112  31.5

        PRES  TEMP
               oC
   993   993  31.0
   984   984  29.5
";
        let diagnostics = CollectingDiagnostics::new();
        let mut assembler = ProfileAssembler::new(&diagnostics);
        let dataset = assembler.assemble(vec![block(text, 0)]).unwrap();

        let params = &dataset[&timestamp()][&0];
        assert_eq!(params.levels("PRSS"), Some(&[Value::raw("996")][..]));
        assert_eq!(params.levels("T02M"), Some(&[Value::raw("31.5")][..]));
        assert_eq!(
            params.levels("pressure"),
            Some(&[Value::raw("993"), Value::raw("984")][..])
        );
        assert_eq!(
            params.levels("TEMP"),
            Some(&[Value::raw("31.0"), Value::raw("29.5")][..])
        );
        assert!(!params.contains("TPP3"));
        assert!(diagnostics.diagnostics().is_empty());
        assert_eq!(assembler.summaries()[0].layout, LayoutKind::ShiftedBySurfaceFields);
    }

    #[test]
    fn test_later_duplicate_wins() {
        let later = BLOCK.replace("     0   996", "     0   997");
        let diagnostics = CollectingDiagnostics::new();
        let dataset = ProfileAssembler::new(&diagnostics)
            .assemble(vec![block(BLOCK, 1), block(&later, 1)])
            .unwrap();

        assert_eq!(dataset[&timestamp()].len(), 1);
        assert_eq!(
            dataset[&timestamp()][&1].first_value("PRSS"),
            Some(&Value::raw("997"))
        );
    }
}
