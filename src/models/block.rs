use chrono::NaiveDateTime;

/// One location's one hour of unparsed profile text.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBlock {
    /// Profile time, assumed UTC.
    pub timestamp: NaiveDateTime,
    /// 0-based location index (`|ordinal| - 1`).
    pub location: usize,
    pub lat: f64,
    pub lng: f64,
    pub utc_offset: f64,
    /// File line number of the block's location marker.
    pub line_number: usize,
    pub lines: Vec<String>,
}

impl RawBlock {
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }
}
