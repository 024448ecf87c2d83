use crate::domain::task::TaskId;

pub trait TaskIdAllocator: Send + Sync {
    fn new_id(&self) -> TaskId;
}
