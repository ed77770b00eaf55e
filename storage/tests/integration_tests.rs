use std::collections::BTreeMap;
use std::collections::HashSet;

use storage::disk::slot_store::SlotStore;
use storage::list::ListError;
use storage::list::engine::RecordList;
use storage::slot::cursor::Cursor;
use storage::slot::node::Record;
use tempfile::TempDir;

/// Walks both chains and checks every structural invariant of the file.
fn audit<S: SlotStore>(list: &RecordList<S>) -> anyhow::Result<()> {
    let hdr = list.header()?;

    assert_eq!(hdr.count == 0, hdr.first.is_nil());
    assert_eq!(hdr.count == 0, hdr.last.is_nil());
    assert_eq!(hdr.free.is_nil(), hdr.count == hdr.capacity);

    // Forward: first -> last in exactly `count` steps, then nil.
    let active = list.active()?;
    assert_eq!(active.len() as i64, hdr.count);
    if let Some((cursor, node)) = active.last() {
        assert_eq!(*cursor, hdr.last);
        assert!(node.next.is_nil());
    }
    if let Some((cursor, node)) = active.first() {
        assert_eq!(*cursor, hdr.first);
        assert!(node.prev.is_nil());
    }

    // Backward: last -> first via prev mirrors the forward walk.
    let mut backward = Vec::new();
    let mut current = hdr.last;
    while !current.is_nil() {
        assert!((backward.len() as i64) < hdr.capacity, "prev chain cycles");
        backward.push(current);
        current = list.store().read_node(current)?.prev;
    }
    backward.reverse();
    let forward: Vec<Cursor> = active.iter().map(|(c, _)| *c).collect();
    assert_eq!(backward, forward);

    // Active and free chains partition 1..=capacity.
    let free: Vec<Cursor> = list.free_chain()?;
    let mut seen = HashSet::new();
    for cursor in forward.iter().chain(free.iter()) {
        assert!(seen.insert(*cursor), "{:?} is on both chains", cursor);
    }
    assert_eq!(seen.len() as i64, hdr.capacity);

    // Every active node carries a real key, every free node the sentinel.
    for (_, node) in &active {
        assert!(!node.is_free());
    }
    for cursor in &free {
        assert!(list.store().read_node(*cursor)?.is_free());
    }

    Ok(())
}

fn active_keys<S: SlotStore>(list: &RecordList<S>) -> anyhow::Result<Vec<i64>> {
    Ok(list.active()?.iter().map(|(_, n)| n.rec.key).collect())
}

#[test]
fn end_to_end_record_workflow() -> anyhow::Result<()> {
    let td = TempDir::new()?;
    let path = td.path().join("records.db");
    let mut list = RecordList::create(&path, 8)?;

    list.insert_append(Record::new(10, "ten"))?;
    list.insert_append(Record::new(20, "twenty"))?;
    list.insert_append(Record::new(30, "thirty"))?;
    audit(&list)?;

    assert!(list.delete(20)?);
    audit(&list)?;
    assert_eq!(active_keys(&list)?, vec![10, 30]);

    let (_, node) = list.search(30)?.unwrap();
    assert_eq!(node.rec.payload, "thirty");
    assert!(list.search(20)?.is_none());

    Ok(())
}

#[test]
fn persistence_across_reopen() -> anyhow::Result<()> {
    let td = TempDir::new()?;
    let path = td.path().join("records.db");

    {
        let mut list = RecordList::create(&path, 4)?;
        list.insert_sorted(Record::new(3, "c"))?;
        list.insert_sorted(Record::new(1, "a"))?;
        list.insert_sorted(Record::new(2, "b"))?;
        let _ = list.sync();
    }

    let mut list = RecordList::open(&path)?;
    audit(&list)?;
    assert_eq!(active_keys(&list)?, vec![1, 2, 3]);
    assert_eq!(list.header()?.count, 3);

    assert!(list.delete(2)?);
    drop(list);

    let list = RecordList::open(&path)?;
    audit(&list)?;
    assert_eq!(active_keys(&list)?, vec![1, 3]);

    Ok(())
}

#[test]
fn capacity_law() -> anyhow::Result<()> {
    let td = TempDir::new()?;
    let path = td.path().join("records.db");
    let mut list = RecordList::create(&path, 5)?;

    for i in 1..=5 {
        list.insert_append(Record::new(i, format!("r{}", i)))?;
    }
    audit(&list)?;
    assert!(list.header()?.is_full());

    let before = std::fs::read(&path)?;
    for result in [
        list.insert_append(Record::new(100, "no room")),
        list.insert_sorted(Record::new(100, "no room")),
    ] {
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ListError>(),
            Some(ListError::OutOfSpace)
        ));
    }
    assert_eq!(std::fs::read(&path)?, before);

    Ok(())
}

#[test]
fn failed_delete_leaves_file_byte_identical() -> anyhow::Result<()> {
    let td = TempDir::new()?;
    let path = td.path().join("records.db");
    let mut list = RecordList::create(&path, 3)?;

    list.insert_append(Record::new(1, "a"))?;
    list.insert_append(Record::new(2, "b"))?;

    let before = std::fs::read(&path)?;
    assert!(!list.delete(42)?);
    assert!(!list.delete(42)?);
    assert_eq!(std::fs::read(&path)?, before);

    Ok(())
}

#[test]
fn released_slots_reused_lifo() -> anyhow::Result<()> {
    let td = TempDir::new()?;
    let mut list = RecordList::create(td.path().join("records.db"), 4)?;

    for i in 1..=4 {
        list.insert_append(Record::new(i, "x"))?;
    }
    assert!(list.delete(2)?);
    assert!(list.delete(4)?);
    audit(&list)?;

    // Slot of key 4 was freed last, so it is handed out first.
    assert_eq!(list.insert_append(Record::new(40, "y"))?, Cursor::new(4));
    assert_eq!(list.insert_append(Record::new(20, "z"))?, Cursor::new(2));
    audit(&list)?;

    Ok(())
}

#[test]
fn sorted_ordering_law() -> anyhow::Result<()> {
    let td = TempDir::new()?;
    let mut list = RecordList::create(td.path().join("records.db"), 16)?;

    for key in [8, 3, 11, 1, 15, 6, 2, 9, 14, 5, 12, 7] {
        list.insert_sorted(Record::new(key, format!("k{}", key)))?;
        audit(&list)?;
    }

    let keys = active_keys(&list)?;
    assert!(keys.windows(2).all(|w| w[0] < w[1]), "keys: {:?}", keys);

    Ok(())
}

#[test]
fn sorted_insert_on_appended_file_splices_at_scan_point() -> anyhow::Result<()> {
    let td = TempDir::new()?;
    let mut list = RecordList::create(td.path().join("records.db"), 4)?;

    list.insert_append(Record::new(9, "a"))?;
    list.insert_append(Record::new(2, "b"))?;

    // The scan stops at the first key greater than 5, which here is the
    // head, so 5 becomes the new head of a still-unsorted list.
    list.insert_sorted(Record::new(5, "c"))?;
    assert_eq!(active_keys(&list)?, vec![5, 9, 2]);
    audit(&list)?;

    Ok(())
}

#[test]
fn fill_empty_fill_cycle() -> anyhow::Result<()> {
    let td = TempDir::new()?;
    let mut list = RecordList::create(td.path().join("records.db"), 6)?;

    for i in 1..=6 {
        list.insert_sorted(Record::new(i * 10, "first round"))?;
    }
    audit(&list)?;

    for i in 1..=6 {
        assert!(list.delete(i * 10)?);
    }
    audit(&list)?;
    assert_eq!(list.header()?.count, 0);
    assert_eq!(list.free_chain()?.len(), 6);

    for i in 1..=6 {
        list.insert_sorted(Record::new(i, "second round"))?;
    }
    audit(&list)?;
    assert_eq!(active_keys(&list)?, vec![1, 2, 3, 4, 5, 6]);

    Ok(())
}

#[test]
fn randomized_against_model() -> anyhow::Result<()> {
    use rand::Rng;

    let td = TempDir::new()?;
    let mut list = RecordList::create(td.path().join("records.db"), 24)?;
    let mut model: BTreeMap<i64, String> = BTreeMap::new();
    let mut rng = rand::rng();

    for step in 0..400 {
        let key = rng.random_range(0..40);
        if rng.random_bool(0.6) {
            let payload = format!("s{}", step);
            let result = list.insert_sorted(Record::new(key, payload.clone()));
            if model.contains_key(&key) {
                assert!(result.is_err(), "duplicate {} accepted", key);
            } else if (model.len() as i64) < 24 {
                result?;
                model.insert(key, payload);
            } else {
                assert!(result.is_err(), "insert beyond capacity accepted");
            }
        } else {
            let deleted = list.delete(key)?;
            assert_eq!(deleted, model.remove(&key).is_some());
        }

        if step % 50 == 0 {
            audit(&list)?;
        }
    }
    audit(&list)?;

    let expected: Vec<i64> = model.keys().copied().collect();
    assert_eq!(active_keys(&list)?, expected);
    for (key, payload) in &model {
        let (_, node) = list.search(*key)?.unwrap();
        assert_eq!(&node.rec.payload, payload);
    }

    Ok(())
}
