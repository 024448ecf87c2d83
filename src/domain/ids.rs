//! Task id allocation.
//!
//! Ids are drawn from lowercase letters and digits. Ten characters give
//! 36^10 (about 3.6e15) values. The progress store is never consulted, so a
//! collision silently replaces the older record.

use crate::domain::task::TaskId;
use crate::ports::id_allocator::TaskIdAllocator;
use rand::Rng;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub const DEFAULT_ID_LENGTH: usize = 10;

fn random_id<R: Rng + ?Sized>(rng: &mut R, length: usize) -> TaskId {
    let id: String = (0..length)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    TaskId::new(id)
}

#[derive(Debug, Clone, Copy)]
pub struct RandomIdAllocator {
    length: usize,
}

impl RandomIdAllocator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomIdAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_LENGTH)
    }
}

impl TaskIdAllocator for RandomIdAllocator {
    fn new_id(&self) -> TaskId {
        random_id(&mut rand::thread_rng(), self.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_use_the_expected_alphabet() {
        let allocator = RandomIdAllocator::default();
        for _ in 0..100 {
            let id = allocator.new_id();
            assert_eq!(id.as_str().len(), DEFAULT_ID_LENGTH);
            assert!(id
                .as_str()
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_ids_do_not_repeat_in_practice() {
        let allocator = RandomIdAllocator::default();
        let ids: HashSet<_> = (0..10_000).map(|_| allocator.new_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_custom_length() {
        assert_eq!(RandomIdAllocator::new(8).new_id().as_str().len(), 8);
    }
}
