//! Content identifiers for subjects.
//!
//! A proposal references subjects by a hash of their content rather than by
//! their store id, so a link goes stale once the subject changes.

use sha2::{Digest, Sha256};

use proposal_types::Subject;

/// Hex SHA-256 over the subject's fields.
///
/// Every variable-length field is length-prefixed so adjacent fields cannot
/// collide.
pub fn content_id(subject: &Subject) -> String {
    let mut hasher = Sha256::new();
    update_str(&mut hasher, &subject.topic);
    update_str(&mut hasher, &subject.id);

    hasher.update((subject.keywords.len() as u64).to_le_bytes());
    for keyword in &subject.keywords {
        update_str(&mut hasher, keyword);
    }

    hasher.update((subject.time_ranges.len() as u64).to_le_bytes());
    for range in &subject.time_ranges {
        hasher.update(range.start.to_le_bytes());
        hasher.update(range.end.to_le_bytes());
    }

    hasher.update(subject.message_count.to_le_bytes());
    match subject.confidence {
        Some(c) => {
            hasher.update([1u8]);
            hasher.update(c.to_bits().to_le_bytes());
        }
        None => hasher.update([0u8]),
    }
    match &subject.description {
        Some(d) => {
            hasher.update([1u8]);
            update_str(&mut hasher, d);
        }
        None => hasher.update([0u8]),
    }
    hasher.update([u8::from(subject.archived)]);

    hex::encode(hasher.finalize())
}

fn update_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}
