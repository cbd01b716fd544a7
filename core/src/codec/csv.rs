//! CSV persistence for [`GroupedPointStore`].
//!
//! Layout: a `Group,Index,Click X,Click Y` header, then one row per click,
//! groups in store order and clicks in insertion order. Rows end with CRLF;
//! the reader also accepts bare LF. Absent coordinates are
//! written as empty fields. The index column is informational; on load clicks
//! are appended in file order.

use crate::prelude::{Point, StoreError, StoreResult};
use crate::store::{Group, GroupedPointStore};
use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

pub const HEADER: [&str; 4] = ["Group", "Index", "Click X", "Click Y"];

pub fn write_csv<W: Write>(store: &GroupedPointStore, writer: W) -> StoreResult<()> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(writer);
    writer.write_record(HEADER).map_err(from_csv)?;

    for group in store.groups() {
        for (index, point) in group.points().iter().enumerate() {
            let index = index.to_string();
            let x = coordinate_field(point.x);
            let y = coordinate_field(point.y);
            writer
                .write_record([group.name(), index.as_str(), x.as_str(), y.as_str()])
                .map_err(from_csv)?;
        }
    }

    writer.flush()?;
    Ok(())
}

pub fn read_csv<R: Read>(reader: R) -> StoreResult<GroupedPointStore> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = reader.records();
    let header = records
        .next()
        .ok_or_else(|| StoreError::Format("missing header row".into()))?
        .map_err(from_csv)?;
    check_header(&header)?;

    let mut groups: Vec<Group> = Vec::new();
    for record in records {
        let record = record.map_err(from_csv)?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        let (name, point) = parse_row(&record, line)?;

        let index = match groups.iter().position(|group| group.name() == name) {
            Some(index) => index,
            None => {
                groups.push(Group::new(name));
                groups.len() - 1
            }
        };
        groups[index].push(point);
    }

    Ok(GroupedPointStore::from_groups(groups))
}

/// Writes through a sibling temporary file so an interrupted save never
/// truncates the previous file. The replaced file keeps its permissions; a
/// new file gets the usual umask-filtered mode.
pub fn save<P: AsRef<Path>>(store: &GroupedPointStore, path: P) -> StoreResult<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = temp_file_for(path, dir)?;
    write_csv(store, &mut temp)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| StoreError::Io(err.error))?;
    Ok(())
}

fn temp_file_for(target: &Path, dir: &Path) -> io::Result<NamedTempFile> {
    match fs::metadata(target) {
        Ok(metadata) => {
            let temp = NamedTempFile::new_in(dir)?;
            temp.as_file().set_permissions(metadata.permissions())?;
            Ok(temp)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => fresh_temp_file(dir),
        Err(err) => Err(err),
    }
}

#[cfg(unix)]
fn fresh_temp_file(dir: &Path) -> io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    // The mode passes through open(2), so the process umask still applies.
    Builder::new()
        .permissions(fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn fresh_temp_file(dir: &Path) -> io::Result<NamedTempFile> {
    NamedTempFile::new_in(dir)
}

pub fn load<P: AsRef<Path>>(path: P) -> StoreResult<GroupedPointStore> {
    let file = File::open(path)?;
    read_csv(file)
}

fn check_header(record: &StringRecord) -> StoreResult<()> {
    let found: Vec<&str> = record
        .iter()
        .enumerate()
        .map(|(i, field)| {
            if i == 0 {
                field.trim_start_matches('\u{feff}')
            } else {
                field
            }
        })
        .collect();

    if found != HEADER {
        return Err(StoreError::Format(format!(
            "expected header '{}', found '{}'",
            HEADER.join(","),
            found.join(",")
        )));
    }
    Ok(())
}

fn parse_row(record: &StringRecord, line: u64) -> StoreResult<(&str, Point)> {
    if record.len() != HEADER.len() {
        return Err(StoreError::Format(format!(
            "line {}: expected {} fields, found {}",
            line,
            HEADER.len(),
            record.len()
        )));
    }

    let name = &record[0];
    if name.is_empty() {
        return Err(StoreError::Format(format!("line {}: empty group name", line)));
    }

    let x = parse_coordinate(&record[2], HEADER[2], line)?;
    let y = parse_coordinate(&record[3], HEADER[3], line)?;
    Ok((name, Point::from_parts(x, y)))
}

fn parse_coordinate(field: &str, column: &'static str, line: u64) -> StoreResult<Option<i64>> {
    if field.is_empty() {
        return Ok(None);
    }
    field
        .trim()
        .parse::<i64>()
        .map(Some)
        .map_err(|_| StoreError::Parse {
            line,
            field: column,
            value: field.to_string(),
        })
}

fn coordinate_field(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn from_csv(err: csv::Error) -> StoreError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => StoreError::Io(io),
        _ => StoreError::Format(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::DEFAULT_GROUP;
    use tempfile::tempdir;

    fn render(store: &GroupedPointStore) -> String {
        let mut buffer = Vec::new();
        write_csv(store, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    fn sample_store() -> GroupedPointStore {
        let mut store = GroupedPointStore::new();
        store.add_click(Some(10), Some(20), None).unwrap();
        store.add_click(None, None, None).unwrap();
        store.set_group("faces, left").unwrap();
        store.add_click(Some(-3), Some(0), None).unwrap();
        store.add_click(Some(7), Some(8), Some("hands")).unwrap();
        store
    }

    #[test]
    fn placeholder_in_new_group_writes_single_row() {
        let mut store = GroupedPointStore::new();
        store.set_group("faces").unwrap();
        store.add_click(None, None, None).unwrap();
        assert_eq!(render(&store), "Group,Index,Click X,Click Y\r\nfaces,0,,\r\n");
    }

    #[test]
    fn rows_follow_group_then_insertion_order() {
        assert_eq!(
            render(&sample_store()),
            "Group,Index,Click X,Click Y\r\n\
             default,0,10,20\r\n\
             default,1,,\r\n\
             \"faces, left\",0,-3,0\r\n\
             hands,0,7,8\r\n"
        );
    }

    #[test]
    fn empty_store_writes_header_only() {
        assert_eq!(
            render(&GroupedPointStore::new()),
            "Group,Index,Click X,Click Y\r\n"
        );
    }

    #[test]
    fn save_then_load_restores_mapping() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clicks.csv");
        let store = sample_store();

        store.save(&path).unwrap();
        let loaded = GroupedPointStore::load(&path).unwrap();
        assert_eq!(loaded.to_mapping(), store.to_mapping());
        assert_eq!(loaded.current_group(), DEFAULT_GROUP);
    }

    #[test]
    fn save_replaces_previous_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clicks.csv");
        sample_store().save(&path).unwrap();

        let mut smaller = GroupedPointStore::new();
        smaller.add_click(Some(1), Some(1), None).unwrap();
        smaller.save(&path).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Group,Index,Click X,Click Y\r\ndefault,0,1,1\r\n"
        );
    }

    #[test]
    fn save_into_missing_directory_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("clicks.csv");
        let err = sample_store().save(&path).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(!path.exists());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = GroupedPointStore::load(dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn header_only_yields_default_store() {
        let store = read_csv("Group,Index,Click X,Click Y\n".as_bytes()).unwrap();
        assert_eq!(store, GroupedPointStore::new());
    }

    #[test]
    fn groups_only_include_those_present_in_file() {
        let store =
            read_csv("Group,Index,Click X,Click Y\nfaces,0,1,2\n".as_bytes()).unwrap();
        assert_eq!(store.group_names().collect::<Vec<_>>(), vec!["faces"]);
        assert_eq!(store.current_group(), "faces");
    }

    #[test]
    fn missing_or_wrong_header_is_format_error() {
        assert!(matches!(read_csv("".as_bytes()), Err(StoreError::Format(_))));
        assert!(matches!(
            read_csv("Group,Index,X,Y\nfaces,0,1,2\n".as_bytes()),
            Err(StoreError::Format(_))
        ));
        assert!(matches!(
            read_csv("faces,0,1,2\n".as_bytes()),
            Err(StoreError::Format(_))
        ));
    }

    #[test]
    fn wrong_field_count_is_format_error() {
        let err = read_csv("Group,Index,Click X,Click Y\nfaces,0,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::Format(msg) if msg.contains("line 2")));
    }

    #[test]
    fn empty_group_name_is_format_error() {
        assert!(matches!(
            read_csv("Group,Index,Click X,Click Y\n,0,1,2\n".as_bytes()),
            Err(StoreError::Format(_))
        ));
    }

    #[test]
    fn non_integer_coordinate_is_parse_error() {
        let input = "Group,Index,Click X,Click Y\nfaces,0,1,2\nfaces,1,12.5,3\n";
        match read_csv(input.as_bytes()) {
            Err(StoreError::Parse { line, field, value }) => {
                assert_eq!(line, 3);
                assert_eq!(field, "Click X");
                assert_eq!(value, "12.5");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn index_column_does_not_seat_points() {
        let input = "Group,Index,Click X,Click Y\na,5,1,1\nb,0,9,9\na,0,2,2\n";
        let store = read_csv(input.as_bytes()).unwrap();
        assert_eq!(
            store.extract_group(Some("a")).unwrap(),
            &[Point::at(1, 1), Point::at(2, 2)]
        );
        assert_eq!(store.group_names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn one_sided_points_survive_load_and_save() {
        let input = "Group,Index,Click X,Click Y\r\na,0,4,\r\na,1,,5\r\n";
        let store = read_csv(input.as_bytes()).unwrap();
        assert_eq!(
            store.extract_group(None).unwrap(),
            &[Point::from_parts(Some(4), None), Point::from_parts(None, Some(5))]
        );
        assert_eq!(render(&store), input);
    }

    #[test]
    fn coordinates_tolerate_surrounding_spaces() {
        let input = "Group,Index,Click X,Click Y\nfaces,0, 12,7 \n";
        let store = read_csv(input.as_bytes()).unwrap();
        assert_eq!(store.extract_group(Some("faces")).unwrap(), &[Point::at(12, 7)]);

        let blank = "Group,Index,Click X,Click Y\nfaces,0,  ,7\n";
        assert!(matches!(
            read_csv(blank.as_bytes()),
            Err(StoreError::Parse { field: "Click X", .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn save_keeps_existing_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("clicks.csv");
        for mode in [0o644, 0o640] {
            fs::write(&path, "old").unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();

            sample_store().save(&path).unwrap();

            let after = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
            assert_eq!(after, mode);
        }
    }

    #[cfg(unix)]
    #[test]
    fn new_file_gets_default_create_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let reference = dir.path().join("reference.csv");
        File::create(&reference).unwrap();
        let expected = fs::metadata(&reference).unwrap().permissions().mode() & 0o777;

        let path = dir.path().join("clicks.csv");
        sample_store().save(&path).unwrap();
        let actual = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(actual, expected);
    }

    #[test]
    fn crlf_and_bom_are_accepted() {
        let input = "\u{feff}Group,Index,Click X,Click Y\r\nfaces,0,1,2\r\n";
        let store = read_csv(input.as_bytes()).unwrap();
        assert_eq!(store.extract_group(Some("faces")).unwrap(), &[Point::at(1, 2)]);
    }
}
