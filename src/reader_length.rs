use std::any::Any;
use std::error::Error;
use std::io;

/// Figure out how many bytes a reader will yield, so the upload request can
/// carry a sized multipart part instead of a chunked body.
pub fn determine_length<T: io::Read + Send + 'static>(
    mut r: T,
) -> Result<(Box<dyn io::Read + Send + 'static>, u64), Box<dyn Error>> {
    if let Some(cursor) = (&r as &dyn Any).downcast_ref::<io::Cursor<Vec<u8>>>() {
        let l = (cursor.get_ref().len() as u64).saturating_sub(cursor.position());
        return Ok((Box::new(r), l));
    }
    if let Some(f) = (&r as &dyn Any).downcast_ref::<std::fs::File>() {
        if let Ok(metadata) = f.metadata() {
            if metadata.is_file() {
                return Ok((Box::new(r), metadata.len()));
            }
        }
    }

    // generic impl: buffer the whole reader
    let mut data = Vec::new();
    let amount = r.read_to_end(&mut data)?;
    Ok((Box::new(io::Cursor::new(data)), amount as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn cursor_length_accounts_for_position() {
        let mut cursor = io::Cursor::new(b"hello world".to_vec());
        cursor.set_position(6);
        let (mut reader, length) = determine_length(cursor).unwrap();
        assert_eq!(length, 5);
        let mut rest = String::new();
        reader.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "world");
    }

    #[test]
    fn cursor_position_past_end_means_zero_bytes_left() {
        let mut cursor = io::Cursor::new(b"abc".to_vec());
        cursor.set_position(10);
        let (_, length) = determine_length(cursor).unwrap();
        assert_eq!(length, 0);
    }

    #[test]
    fn arbitrary_reader_is_buffered() {
        let reader = io::BufReader::new(io::Cursor::new(b"abc".to_vec()));
        let (mut reader, length) = determine_length(reader).unwrap();
        assert_eq!(length, 3);
        let mut data = Vec::new();
        reader.read_to_end(&mut data).unwrap();
        assert_eq!(data, b"abc");
    }
}
