//! Heap file slot layout, compaction and truncation.

use std::fs;

use ntest::timeout;
use tempfile::tempdir;

use heapdb_core::storage::HeapFile;

const KEY_SIZE: usize = 4;
const RECORD_SIZE: usize = 12;

fn slot(key: u32, fill: u8) -> Vec<u8> {
    let mut data = vec![fill; RECORD_SIZE];
    data[..KEY_SIZE].copy_from_slice(&key.to_le_bytes());
    data
}

fn keys(heap: &mut HeapFile) -> Vec<u32> {
    heap.scan()
        .map(|slot| {
            let slot = slot.unwrap();
            u32::from_le_bytes(slot[..KEY_SIZE].try_into().unwrap())
        })
        .collect()
}

#[timeout(1000)]
#[test]
fn test_push_get() {
    let dir = tempdir().unwrap();
    let mut heap = HeapFile::open(dir.path().join("t"), KEY_SIZE, RECORD_SIZE).unwrap();

    heap.push(&slot(7, b'a')).unwrap();
    heap.push(&slot(9, b'b')).unwrap();

    assert_eq!(heap.len(), 2);
    assert_eq!(heap.end_position(), 2 * RECORD_SIZE as u64);
    assert_eq!(heap.get(&9u32.to_le_bytes()).unwrap(), Some(slot(9, b'b')));
    assert_eq!(heap.get(&8u32.to_le_bytes()).unwrap(), None);
    assert!(heap.contains(&7u32.to_le_bytes()).unwrap());
}

#[timeout(1000)]
#[test]
fn test_delete_middle_slot_moves_last_into_hole() {
    let dir = tempdir().unwrap();
    let mut heap = HeapFile::open(dir.path().join("t"), KEY_SIZE, RECORD_SIZE).unwrap();
    for key in 1..=4 {
        heap.push(&slot(key, key as u8)).unwrap();
    }

    let removed = heap.delete(&2u32.to_le_bytes()).unwrap();
    assert_eq!(removed, Some(slot(2, 2)));
    assert_eq!(keys(&mut heap), vec![1, 4, 3]);
    assert_eq!(heap.end_position(), 3 * RECORD_SIZE as u64);
}

#[timeout(1000)]
#[test]
fn test_delete_last_slot() {
    let dir = tempdir().unwrap();
    let mut heap = HeapFile::open(dir.path().join("t"), KEY_SIZE, RECORD_SIZE).unwrap();
    for key in 1..=3 {
        heap.push(&slot(key, 0)).unwrap();
    }

    assert_eq!(heap.delete(&3u32.to_le_bytes()).unwrap(), Some(slot(3, 0)));
    assert_eq!(keys(&mut heap), vec![1, 2]);
    assert_eq!(heap.delete(&3u32.to_le_bytes()).unwrap(), None);
    assert_eq!(heap.len(), 2);
}

#[timeout(1000)]
#[test]
fn test_delete_only_slot() {
    let dir = tempdir().unwrap();
    let mut heap = HeapFile::open(dir.path().join("t"), KEY_SIZE, RECORD_SIZE).unwrap();
    heap.push(&slot(1, 0)).unwrap();

    heap.delete(&1u32.to_le_bytes()).unwrap();
    assert!(heap.is_empty());
    assert_eq!(heap.scan().count(), 0);
}

#[timeout(1000)]
#[test]
fn test_close_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t");
    let mut heap = HeapFile::open(&path, KEY_SIZE, RECORD_SIZE).unwrap();
    heap.push(&slot(1, 0)).unwrap();
    heap.push(&slot(2, 0)).unwrap();
    heap.delete(&1u32.to_le_bytes()).unwrap();

    heap.close().unwrap();
    assert!(heap.is_closed());
    assert_eq!(fs::metadata(&path).unwrap().len(), RECORD_SIZE as u64);

    heap.close().unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len(), RECORD_SIZE as u64);
    assert!(heap.push(&slot(3, 0)).unwrap_err().is_io_error());
}

#[timeout(1000)]
#[test]
fn test_close_without_changes_keeps_file_size() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t");
    let contents: Vec<u8> = (1..=3).flat_map(|key| slot(key, 0x5A)).collect();
    fs::write(&path, &contents).unwrap();

    let mut heap = HeapFile::open(&path, KEY_SIZE, RECORD_SIZE).unwrap();
    assert_eq!(heap.len(), 3);
    heap.close().unwrap();

    assert_eq!(fs::metadata(&path).unwrap().len(), contents.len() as u64);
    assert_eq!(fs::read(&path).unwrap(), contents);
}

#[timeout(1000)]
#[test]
fn test_drop_truncates_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t");
    {
        let mut heap = HeapFile::open(&path, KEY_SIZE, RECORD_SIZE).unwrap();
        for key in 1..=5 {
            heap.push(&slot(key, 0)).unwrap();
        }
        heap.delete(&1u32.to_le_bytes()).unwrap();
        heap.delete(&2u32.to_le_bytes()).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 5 * RECORD_SIZE as u64);
    }
    assert_eq!(fs::metadata(&path).unwrap().len(), 3 * RECORD_SIZE as u64);
}

#[timeout(1000)]
#[test]
fn test_reopen_recovers_end_position() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t");
    {
        let mut heap = HeapFile::open(&path, KEY_SIZE, RECORD_SIZE).unwrap();
        for key in 1..=3 {
            heap.push(&slot(key, key as u8)).unwrap();
        }
        heap.close().unwrap();
    }

    let mut heap = HeapFile::open(&path, KEY_SIZE, RECORD_SIZE).unwrap();
    assert_eq!(heap.end_position(), 3 * RECORD_SIZE as u64);
    assert_eq!(keys(&mut heap), vec![1, 2, 3]);

    heap.push(&slot(4, 4)).unwrap();
    assert_eq!(heap.get(&4u32.to_le_bytes()).unwrap(), Some(slot(4, 4)));
}
