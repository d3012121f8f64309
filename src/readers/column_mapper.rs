use serde::Serialize;

use crate::error::{ProfileError, Result};
use crate::models::RawBlock;
use crate::utils::constants::{PRESSURE, PRESSURE_AT_SURFACE};

/// Which block lines hold the surface names, surface values, level names and
/// the first level row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineOffsets {
    pub surface_names: usize,
    pub surface_values: usize,
    pub level_names: usize,
    pub first_level_row: usize,
}

/// The two column layouts the profiler emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LayoutKind {
    Standard,
    ShiftedBySurfaceFields,
}

impl LayoutKind {
    /// Pick the layout from a block's data lines.
    ///
    /// Characters 2..6 of line 2 are blank in the standard layout (a units
    /// row) and hold data when extra surface lines push everything down.
    pub fn detect(lines: &[String]) -> Option<Self> {
        let probe = lines.get(2)?;
        let blank = probe.chars().skip(2).take(4).all(char::is_whitespace);
        Some(if blank {
            LayoutKind::Standard
        } else {
            LayoutKind::ShiftedBySurfaceFields
        })
    }

    pub fn offsets(self) -> LineOffsets {
        match self {
            LayoutKind::Standard => LineOffsets {
                surface_names: 1,
                surface_values: 3,
                level_names: 5,
                first_level_row: 7,
            },
            LayoutKind::ShiftedBySurfaceFields => LineOffsets {
                surface_names: 1,
                surface_values: 5,
                level_names: 7,
                first_level_row: 9,
            },
        }
    }
}

/// Column names of one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub layout: LayoutKind,
    pub offsets: LineOffsets,
    /// `pressure_at_surface` followed by the surface header names.
    pub surface_names: Vec<String>,
    /// `pressure` followed by the level header names.
    pub level_names: Vec<String>,
}

/// Work out the layout and column names of a block.
pub fn map_columns(block: &RawBlock) -> Result<ColumnMap> {
    let unrecognized = |reason: String| ProfileError::UnrecognizedLayout {
        timestamp: block.timestamp,
        location: block.location,
        reason,
    };

    let layout = LayoutKind::detect(&block.lines)
        .ok_or_else(|| unrecognized(format!("block has only {} lines", block.lines.len())))?;
    let offsets = layout.offsets();

    if block.lines.len() <= offsets.level_names {
        return Err(unrecognized(format!(
            "{:?} layout needs at least {} lines, block has {}",
            layout,
            offsets.level_names + 1,
            block.lines.len()
        )));
    }

    let surface_names = header_names(&block.lines[offsets.surface_names], PRESSURE_AT_SURFACE)
        .ok_or_else(|| unrecognized(format!("line {} is not a surface header", offsets.surface_names)))?;
    let level_names = header_names(&block.lines[offsets.level_names], PRESSURE)
        .ok_or_else(|| unrecognized(format!("line {} is not a level header", offsets.level_names)))?;

    Ok(ColumnMap {
        layout,
        offsets,
        surface_names,
        level_names,
    })
}

fn header_names(line: &str, leading: &str) -> Option<Vec<String>> {
    let names: Vec<&str> = line.split_whitespace().collect();
    if names.is_empty() || !names.iter().all(|name| is_variable_name(name)) {
        return None;
    }

    let mut columns = Vec::with_capacity(names.len() + 1);
    columns.push(leading.to_string());
    columns.extend(names.into_iter().map(str::to_string));
    Some(columns)
}

fn is_variable_name(token: &str) -> bool {
    token.starts_with(|c: char| c.is_ascii_alphabetic())
        && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
