/// Identifier of a record within its collection.
pub type RecordId = u64;

/// A persisted entity addressed by a unique `id` within its collection.
pub trait Record {
    fn id(&self) -> RecordId;
}

/// Linear scan for the first record with the given id.
pub fn find_by_id<T: Record>(records: &[T], id: RecordId) -> Option<&T> {
    records.iter().find(|r| r.id() == id)
}

pub fn find_by_id_mut<T: Record>(records: &mut [T], id: RecordId) -> Option<&mut T> {
    records.iter_mut().find(|r| r.id() == id)
}

/// Remove every record with the given id; returns whether anything was removed.
pub fn remove_by_id<T: Record>(records: &mut Vec<T>, id: RecordId) -> bool {
    let before = records.len();
    records.retain(|r| r.id() != id);
    records.len() != before
}

pub fn max_id<T: Record>(records: &[T]) -> Option<RecordId> {
    records.iter().map(Record::id).max()
}
