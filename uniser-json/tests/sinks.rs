use std::collections::VecDeque;
use std::io::Cursor;

use arrayvec::ArrayVec;
use uniser::{impl_record, SerError, Serializer, SliceWriter};
use uniser_json::{from_slice, to_slice, to_writer, to_writer_pretty, JsonFormat};

#[derive(Debug, Default, PartialEq)]
struct Reading {
    sensor: String,
    values: Vec<i16>,
}

impl_record!(Reading { sensor, values });

const COMPACT: &[u8] = br#"{"sensor":"t1","values":[-4,0,17]}"#;

fn reading_tree() -> uniser::TreeElement {
    let serializer = Serializer::with_format(JsonFormat::compact());
    serializer.to_tree(&Reading { sensor: "t1".into(), values: vec![-4, 0, 17] }).unwrap()
}

#[test]
fn test_fixed_capacity_sinks() {
    let tree = reading_tree();

    let mut arrayvec = ArrayVec::<u8, 64>::new();
    to_writer(&mut arrayvec, &tree).unwrap();
    assert_eq!(arrayvec.as_slice(), COMPACT);

    let mut heapless = heapless::Vec::<u8, 64>::new();
    to_writer(&mut heapless, &tree).unwrap();
    assert_eq!(heapless.as_slice(), COMPACT);

    let mut buf = [0u8; 64];
    assert_eq!(to_slice(&mut buf, &tree).unwrap().as_bytes(), COMPACT);

    let mut cursor = Cursor::new([0u8; 64]);
    to_writer(&mut cursor, &tree).unwrap();
    let len = cursor.position() as usize;
    assert_eq!(&cursor.get_ref()[..len], COMPACT);
}

#[test]
fn test_fixed_capacity_overflow() {
    let tree = reading_tree();
    let short = COMPACT.len() - 1;

    let mut arrayvec = ArrayVec::<u8, 16>::new();
    assert_eq!(to_writer(&mut arrayvec, &tree), Err(SerError::BufferFull));
    assert!(COMPACT.starts_with(&arrayvec));

    let mut heapless = heapless::Vec::<u8, 16>::new();
    assert_eq!(to_writer(&mut heapless, &tree), Err(SerError::BufferFull));
    assert!(COMPACT.starts_with(&heapless));

    let mut buf = vec![0u8; short];
    let mut writer = SliceWriter::new(&mut buf);
    assert_eq!(to_writer(&mut writer, &tree), Err(SerError::BufferFull));
    assert!(COMPACT.starts_with(writer.as_ref()));

    let mut cursor = Cursor::new(vec![0u8; short].into_boxed_slice());
    assert_eq!(to_writer(&mut cursor, &tree), Err(SerError::BufferFull));
    // an overflow converts into the engine error
    assert_eq!(uniser::Error::from(SerError::BufferFull), uniser::Error::Write(SerError::BufferFull));
}

#[test]
fn test_growable_sinks_read_back() {
    let tree = reading_tree();
    let mut deque = VecDeque::<u8>::new();
    to_writer_pretty(&mut deque, &tree).unwrap();
    let text = Vec::from(deque);
    assert_eq!(from_slice(&text).unwrap(), tree);

    let mut cursor = Cursor::new(Vec::<u8>::new());
    to_writer(&mut cursor, &tree).unwrap();
    assert_eq!(cursor.into_inner(), COMPACT);

    let serializer = Serializer::with_format(JsonFormat::compact());
    let reading = serializer.from_tree::<Reading>(&from_slice(COMPACT).unwrap()).unwrap();
    assert_eq!(reading.map(|reading| reading.values), Some(vec![-4, 0, 17]));
}
