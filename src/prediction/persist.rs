//! Versioned binary layout of a [`PredictionDatabase`].
//!
//! ```text
//! i32 version
//! map forward
//! map backward
//!
//! map    := i32 count, count * (string anchor, i32 n, n * record)
//! record := i32 direction, string prediction, string anchor,
//!           i32 m, m * string context, i32 num_uses
//! string := i32 byte length, UTF-8 bytes
//! ```
//!
//! All integers are little-endian. Anchors are written in signature order so
//! the same database always produces the same bytes.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::{Direction, PredictionDatabase, PredictionRecord};
use crate::errors::PersistError;
use crate::identity::NodeIdentity;
use crate::path::{AdjacencyPath, MAX_CONTEXT_PATH_LENGTH};

pub const DATABASE_FORMAT_VERSION: i32 = 1;

pub fn write_database<W: Write>(
    database: &PredictionDatabase,
    writer: &mut W,
) -> Result<(), PersistError> {
    write_i32(writer, DATABASE_FORMAT_VERSION)?;
    for direction in Direction::ALL {
        let entries = database.entries(direction);
        write_len(writer, entries.len())?;
        for (anchor, records) in entries {
            write_string(writer, anchor.signature())?;
            write_len(writer, records.len())?;
            for record in records {
                write_record(writer, record)?;
            }
        }
    }
    Ok(())
}

/// Read a full database. Nothing is returned unless the whole input parses.
pub fn read_database<R: Read>(reader: &mut R) -> Result<PredictionDatabase, PersistError> {
    let version = read_i32(reader)?;
    if version != DATABASE_FORMAT_VERSION {
        return Err(PersistError::VersionMismatch {
            found: version,
            expected: DATABASE_FORMAT_VERSION,
        });
    }

    let mut database = PredictionDatabase::new();
    for direction in Direction::ALL {
        let anchors = read_len(reader)?;
        for _ in 0..anchors {
            let key = NodeIdentity::new(read_string(reader)?);
            let count = read_len(reader)?;
            for _ in 0..count {
                let record = read_record(reader)?;
                if record.direction != direction || record.anchor != key {
                    return Err(PersistError::InconsistentRecord {
                        map: direction.to_string(),
                        key: key.signature().to_string(),
                        direction: record.direction.to_string(),
                        anchor: record.anchor.signature().to_string(),
                    });
                }
                database.insert(record);
            }
        }
    }
    Ok(database)
}

pub fn save_to_path(database: &PredictionDatabase, path: &Path) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_database(database, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<PredictionDatabase, PersistError> {
    let mut reader = BufReader::new(File::open(path)?);
    read_database(&mut reader)
}

fn write_record<W: Write>(writer: &mut W, record: &PredictionRecord) -> Result<(), PersistError> {
    write_i32(writer, record.direction.as_i32())?;
    write_string(writer, record.prediction.signature())?;
    write_string(writer, record.anchor.signature())?;
    write_len(writer, record.context.len())?;
    for node in record.context.nodes() {
        write_string(writer, node.signature())?;
    }
    let uses = i32::try_from(record.num_uses)
        .map_err(|_| PersistError::Overflow(record.num_uses as usize))?;
    write_i32(writer, uses)
}

fn read_record<R: Read>(reader: &mut R) -> Result<PredictionRecord, PersistError> {
    let raw_direction = read_i32(reader)?;
    let direction =
        Direction::from_i32(raw_direction).ok_or(PersistError::InvalidDirection(raw_direction))?;
    let prediction = NodeIdentity::new(read_string(reader)?);
    let anchor = NodeIdentity::new(read_string(reader)?);

    let context_len = read_len(reader)?;
    if context_len > MAX_CONTEXT_PATH_LENGTH {
        return Err(PersistError::ContextTooLong(context_len));
    }
    let mut context = AdjacencyPath::new();
    for _ in 0..context_len {
        context.push(NodeIdentity::new(read_string(reader)?));
    }

    let uses = read_i32(reader)?;
    if uses < 1 {
        return Err(PersistError::InvalidUseCount(uses));
    }

    Ok(PredictionRecord {
        direction,
        anchor,
        prediction,
        context,
        num_uses: uses as u32,
    })
}

fn write_i32<W: Write>(writer: &mut W, value: i32) -> Result<(), PersistError> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_len<W: Write>(writer: &mut W, len: usize) -> Result<(), PersistError> {
    let value = i32::try_from(len).map_err(|_| PersistError::Overflow(len))?;
    write_i32(writer, value)
}

fn write_string<W: Write>(writer: &mut W, value: &str) -> Result<(), PersistError> {
    write_len(writer, value.len())?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32, PersistError> {
    let mut buf = [0u8; 4];
    read_exact(reader, &mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_len<R: Read>(reader: &mut R) -> Result<usize, PersistError> {
    let value = read_i32(reader)?;
    usize::try_from(value).map_err(|_| PersistError::NegativeLength(value))
}

fn read_string<R: Read>(reader: &mut R) -> Result<String, PersistError> {
    let len = read_len(reader)?;
    let mut bytes = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut bytes)?;
    if bytes.len() != len {
        return Err(PersistError::Truncated);
    }
    Ok(String::from_utf8(bytes)?)
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), PersistError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => PersistError::Truncated,
        _ => PersistError::Io(e),
    })
}
