use std::collections::{HashMap, VecDeque};

use tracing::trace;

use crate::model::script::Script;
use crate::model::task::TaskId;

/// Carries task ids across re-parses of an edited document.
///
/// Parsing numbers tasks by position, so the same task gets a different id as
/// soon as a line above it is inserted. The reconciler remembers which ids
/// belonged to which signature (name plus description) last time and hands
/// them back to tasks with that signature, in document order. Tasks it cannot
/// match get ids that were never used before.
#[derive(Debug, Clone, Default)]
pub struct IdReconciler {
    previous: HashMap<String, VecDeque<TaskId>>,
    next_id: u64,
}

impl IdReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite every task id in `script`, orphans included.
    pub fn reconcile(&mut self, script: &mut Script) {
        let mut pool = std::mem::take(&mut self.previous);
        let mut current: HashMap<String, VecDeque<TaskId>> = HashMap::new();

        for task in script.tasks.iter_mut() {
            let signature = task.signature();
            let id = match pool.get_mut(&signature).and_then(VecDeque::pop_front) {
                Some(id) => id,
                None => {
                    let id = TaskId(self.next_id);
                    self.next_id += 1;
                    trace!(%id, name = %task.name, "issued task id");
                    id
                }
            };
            task.id = id;
            current.entry(signature).or_default().push_back(id);
        }

        self.previous = current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_tasks;
    use pretty_assertions::assert_eq;

    fn reconciled(reconciler: &mut IdReconciler, text: &str) -> Script {
        let mut script = parse_tasks(text);
        reconciler.reconcile(&mut script);
        script
    }

    fn id_of(script: &Script, name: &str) -> TaskId {
        script.task_by_name(name).unwrap().id
    }

    #[test]
    fn test_ids_survive_insertion_above() {
        let mut reconciler = IdReconciler::new();
        let before = reconciled(&mut reconciler, "% A\nnotes\n% B");
        let after = reconciled(&mut reconciler, "% New\n% A\nnotes\n% B");

        assert_eq!(id_of(&after, "A"), id_of(&before, "A"));
        assert_eq!(id_of(&after, "B"), id_of(&before, "B"));
        assert_ne!(id_of(&after, "New"), id_of(&before, "A"));
        assert_ne!(id_of(&after, "New"), id_of(&before, "B"));
    }

    #[test]
    fn test_edited_task_gets_fresh_id() {
        let mut reconciler = IdReconciler::new();
        let before = reconciled(&mut reconciler, "% A\nnotes");
        let after = reconciled(&mut reconciler, "% A\nother notes");
        assert_ne!(id_of(&after, "A"), id_of(&before, "A"));
    }

    #[test]
    fn test_duplicate_signatures_keep_order() {
        let mut reconciler = IdReconciler::new();
        let before = reconciled(&mut reconciler, "% Same\n% Same");
        let after = reconciled(&mut reconciler, "% Other\n% Same\n% Same");

        assert_eq!(after.tasks[1].id, before.tasks[0].id);
        assert_eq!(after.tasks[2].id, before.tasks[1].id);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut reconciler = IdReconciler::new();
        reconciled(&mut reconciler, "% A\n% B\n% C");
        let script = reconciled(&mut reconciler, "% A\n% X\n% Y\n% Z\n% C");

        let mut ids: Vec<TaskId> = script.tasks.iter().map(|t| t.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_lookup_by_reconciled_id() {
        let mut reconciler = IdReconciler::new();
        let before = reconciled(&mut reconciler, "% A\n% B");
        let b_id = id_of(&before, "B");
        let after = reconciled(&mut reconciler, "% Z\n% A\n% B");
        assert_eq!(after.task_by_id(b_id).unwrap().name, "B");
    }
}
