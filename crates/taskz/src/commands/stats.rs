use crate::commands::CmdResult;
use crate::error::Result;
use crate::manager::TaskManager;
use crate::store::backend::StorageBackend;

pub fn run<B: StorageBackend>(manager: &TaskManager<B>) -> Result<CmdResult> {
    Ok(CmdResult::default().with_statistics(manager.statistics()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTask;
    use crate::store::mem_backend::MemBackend;

    #[test]
    fn reports_completion_rate() {
        let mut manager = TaskManager::with_backend(MemBackend::new());
        for title in ["a", "b", "c"] {
            manager.create(NewTask::new(title)).unwrap();
        }
        manager.toggle(2);

        let stats = run(&manager).unwrap().statistics.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.completion_rate, 33);
    }
}
