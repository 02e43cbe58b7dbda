use crate::ingest::{
    self, Config,
    row::{RawRow, RejectReason, split_routes},
};
use csv::{ReaderBuilder, StringRecord, Trim};

const REQUIRED_FIELDS: usize = 5;

/// A record as read from the upload, or the reason it could not be read.
pub(crate) type CsvLine = (u64, Result<StringRecord, RejectReason>);

/// Reads header-less `date,umlauf,start_time,end_time,routes` records.
///
/// The routes may be one quoted field (`"31,32"`) or spill over into trailing
/// unquoted fields (`31,32`). A quoted field may span several lines; each
/// record is numbered by the line it starts on. Blank lines and comment lines
/// are skipped but still counted, so line numbers match the uploaded text.
/// Broken records are reported per line; only an I/O failure of the reader
/// aborts.
pub(crate) fn read_records(raw: &str, config: &Config) -> Result<Vec<CsvLine>, ingest::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(config.comment)
        .trim(if config.trim { Trim::All } else { Trim::None })
        .from_reader(raw.as_bytes());

    let mut index = LineIndex::new(raw, config.comment);
    let mut lines = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => {
                // Whitespace-only lines parse as one empty field
                if record.iter().all(|field| field.trim().is_empty()) {
                    continue;
                }
                let line = index.data_line(record.position().map(|pos| pos.byte()));
                lines.push((line, Ok(record)));
            }
            Err(err) if matches!(err.kind(), csv::ErrorKind::Io(_)) => return Err(err.into()),
            Err(err) => {
                let line = index.data_line(err.position().map(|pos| pos.byte()));
                lines.push((
                    line,
                    Err(RejectReason::Malformed {
                        detail: err.to_string(),
                    }),
                ));
            }
        }
    }
    Ok(lines)
}

/// Maps byte offsets reported by the csv reader to 1-based line numbers.
///
/// A record's offset may point at blank or comment lines the reader skipped
/// before the record itself, so those are stepped over.
struct LineIndex<'a> {
    raw: &'a str,
    comment: Option<u8>,
    offset: usize,
    line: u64,
}

impl<'a> LineIndex<'a> {
    fn new(raw: &'a str, comment: Option<u8>) -> Self {
        Self {
            raw,
            comment,
            offset: 0,
            line: 1,
        }
    }

    /// Line of the first data line at or after `offset`. Offsets never decrease.
    fn data_line(&mut self, offset: Option<u64>) -> u64 {
        let target = offset
            .map_or(self.offset, |offset| offset as usize)
            .clamp(self.offset, self.raw.len());
        let counted = self.raw.get(self.offset..target).unwrap_or_default();
        self.line += counted.bytes().filter(|b| *b == b'\n').count() as u64;
        self.offset = target;

        let rest = self.raw.get(self.offset..).unwrap_or_default();
        let skipped = rest
            .split_inclusive('\n')
            .take_while(|line| {
                let comment = self.comment.is_some_and(|c| line.as_bytes().first() == Some(&c));
                comment || line.trim().is_empty()
            })
            .count();
        self.line + skipped as u64
    }
}

/// Splits a record into its named fields.
pub(crate) fn to_raw_row(record: &StringRecord) -> Result<RawRow<'_>, RejectReason> {
    if record.len() < REQUIRED_FIELDS {
        return Err(RejectReason::MissingFields {
            found: record.len(),
        });
    }
    Ok(RawRow {
        date: &record[0],
        umlauf: &record[1],
        start_time: &record[2],
        end_time: &record[3],
        routes: split_routes(record.iter().skip(4)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_numbers_skip_blank_lines() {
        let raw = "2025-04-17,U1,08:00,12:00,31\n\n2025-04-17,U2,13:00,15:00,\"31,32\"\n";
        let lines = read_records(raw, &Config::default()).unwrap();
        let numbers: Vec<u64> = lines.iter().map(|(line, _)| *line).collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[test]
    fn quoted_routes_stay_in_one_field() {
        let raw = "2025-04-17,U1,08:00,12:00,\"31,32\"";
        let lines = read_records(raw, &Config::default()).unwrap();
        let record = lines[0].1.as_ref().unwrap();
        assert_eq!(record.len(), 5);
        let row = to_raw_row(record).unwrap();
        assert_eq!(row.routes, vec!["31", "32"]);
    }

    #[test]
    fn unquoted_routes_spill_into_trailing_fields() {
        let raw = "2025-04-17,U1,08:00,12:00,31,32";
        let lines = read_records(raw, &Config::default()).unwrap();
        let row = to_raw_row(lines[0].1.as_ref().unwrap()).unwrap();
        assert_eq!(row.routes, vec!["31", "32"]);
    }

    #[test]
    fn short_records_are_reported() {
        let raw = "2025-04-17,U1,08:00";
        let lines = read_records(raw, &Config::default()).unwrap();
        let err = to_raw_row(lines[0].1.as_ref().unwrap()).unwrap_err();
        assert_eq!(err, RejectReason::MissingFields { found: 3 });
    }

    #[test]
    fn comment_lines_are_skipped() {
        let raw = "# exported from the depot roster\n2025-04-17,U1,08:00,12:00,31\n";
        let lines = read_records(raw, &Config::default()).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, 2);
    }

    #[test]
    fn quoted_field_may_span_lines() {
        let raw = "2025-04-17,U1,08:00,12:00,\"31,\n32\"\n2025-04-17,U2,13:00,14:00,31\n";
        let lines = read_records(raw, &Config::default()).unwrap();
        let numbers: Vec<u64> = lines.iter().map(|(line, _)| *line).collect();
        assert_eq!(numbers, vec![1, 3]);
        let row = to_raw_row(lines[0].1.as_ref().unwrap()).unwrap();
        assert_eq!(row.routes, vec!["31", "32"]);
    }

    #[test]
    fn line_numbers_survive_comments_and_crlf() {
        let raw = "# roster\r\n\r\n2025-04-17,U1,08:00,12:00,31\r\n# break\r\n2025-04-17,U2,13:00,15:00,\"31,\r\n32\"\r\n\r\n2025-04-18,U3,06:00,10:00,31\r\n";
        let lines = read_records(raw, &Config::default()).unwrap();
        let numbers: Vec<u64> = lines.iter().map(|(line, _)| *line).collect();
        assert_eq!(numbers, vec![3, 5, 8]);
    }

    #[test]
    fn whitespace_only_lines_are_skipped() {
        let raw = "2025-04-17,U1,08:00,12:00,31\n   \n2025-04-17,U2,13:00,15:00,31\n";
        let lines = read_records(raw, &Config::default()).unwrap();
        let numbers: Vec<u64> = lines.iter().map(|(line, _)| *line).collect();
        assert_eq!(numbers, vec![1, 3]);
    }
}
