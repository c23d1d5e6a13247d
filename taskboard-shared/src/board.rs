/// Task board state with optimistic status moves
///
/// A client renders a project's tasks as three columns and lets the user
/// drag a card to another column. The move is applied locally right away,
/// then confirmed or rolled back once the server answers
/// `PATCH /tasks/:id`. Only one move may be in flight at a time; further
/// drags are ignored until it settles.
///
/// # Example
///
/// ```
/// use taskboard_shared::board::Board;
/// use taskboard_shared::models::task::TaskStatus;
/// # use taskboard_shared::models::task::Task;
/// # fn tasks() -> Vec<Task> { Vec::new() }
///
/// let mut board = Board::new(tasks());
/// # let task_id = uuid::Uuid::new_v4();
/// if let Some(patch) = board.begin_move(task_id, TaskStatus::Done) {
///     // send `patch` to the server, then:
///     board.settle(patch.task_id, true);
/// }
/// ```

use serde::Serialize;
use uuid::Uuid;

use crate::models::task::{Task, TaskStatus};

/// The request body a client sends to persist a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusPatch {
    #[serde(skip)]
    pub task_id: Uuid,
    pub status: TaskStatus,
}

/// One column of the board
#[derive(Debug, Clone, PartialEq)]
pub struct Column<'a> {
    pub status: TaskStatus,
    pub tasks: Vec<&'a Task>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    task_id: Uuid,
    previous: TaskStatus,
}

/// Client-side board for one project
#[derive(Debug, Clone, Default)]
pub struct Board {
    tasks: Vec<Task>,
    in_flight: Option<InFlight>,
}

impl Board {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            in_flight: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Task currently waiting on the server, if any
    pub fn in_flight(&self) -> Option<Uuid> {
        self.in_flight.map(|f| f.task_id)
    }

    /// Tasks grouped by status, always in TODO, IN_PROGRESS, DONE order
    ///
    /// Tasks keep their relative order within a column.
    pub fn columns(&self) -> Vec<Column<'_>> {
        TaskStatus::ALL
            .iter()
            .map(|&status| Column {
                status,
                tasks: self.tasks.iter().filter(|t| t.status == status).collect(),
            })
            .collect()
    }

    /// Starts moving a task to `target`
    ///
    /// Returns `None` and leaves the board untouched if a move is already in
    /// flight, the task is unknown, or it is already in `target`.
    pub fn begin_move(&mut self, task_id: Uuid, target: TaskStatus) -> Option<StatusPatch> {
        if self.in_flight.is_some() {
            return None;
        }

        let task = self.tasks.iter_mut().find(|t| t.id == task_id)?;
        if task.status == target {
            return None;
        }

        self.in_flight = Some(InFlight {
            task_id,
            previous: task.status,
        });
        task.status = target;

        Some(StatusPatch {
            task_id,
            status: target,
        })
    }

    /// Finishes the in-flight move
    ///
    /// On failure the task goes back to the column it came from. Settling a
    /// task that is not in flight is a no-op.
    pub fn settle(&mut self, task_id: Uuid, succeeded: bool) {
        let Some(in_flight) = self.in_flight.filter(|f| f.task_id == task_id) else {
            return;
        };
        self.in_flight = None;

        if !succeeded {
            if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) {
                task.status = in_flight.previous;
            }
        }
    }

    /// Replaces local state with a fresh server listing
    ///
    /// The in-flight marker survives so a late response still settles.
    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(title: &str, status: TaskStatus) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            status,
            project_id: Uuid::nil(),
            assignee_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn status_of(board: &Board, id: Uuid) -> TaskStatus {
        board
            .tasks()
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.status)
            .unwrap()
    }

    #[test]
    fn test_columns_fixed_order() {
        let board = Board::new(vec![
            task("c", TaskStatus::Done),
            task("a", TaskStatus::Todo),
            task("b", TaskStatus::InProgress),
            task("d", TaskStatus::Todo),
        ]);

        let columns = board.columns();
        let statuses: Vec<_> = columns.iter().map(|c| c.status).collect();
        assert_eq!(statuses, TaskStatus::ALL.to_vec());

        let todo: Vec<_> = columns[0].tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(todo, vec!["a", "d"]);
        assert_eq!(columns[2].tasks.len(), 1);
    }

    #[test]
    fn test_empty_board_has_three_columns() {
        let board = Board::default();
        let columns = board.columns();

        assert_eq!(columns.len(), 3);
        assert!(columns.iter().all(|c| c.tasks.is_empty()));
    }

    #[test]
    fn test_begin_move_applies_optimistically() {
        let t = task("a", TaskStatus::Todo);
        let id = t.id;
        let mut board = Board::new(vec![t]);

        let patch = board.begin_move(id, TaskStatus::Done).unwrap();

        assert_eq!(patch, StatusPatch { task_id: id, status: TaskStatus::Done });
        assert_eq!(status_of(&board, id), TaskStatus::Done);
        assert_eq!(board.in_flight(), Some(id));

        let body = serde_json::to_value(patch).unwrap();
        assert_eq!(body, serde_json::json!({ "status": "DONE" }));
    }

    #[test]
    fn test_second_move_rejected_while_in_flight() {
        let a = task("a", TaskStatus::Todo);
        let b = task("b", TaskStatus::Todo);
        let (a_id, b_id) = (a.id, b.id);
        let mut board = Board::new(vec![a, b]);

        assert!(board.begin_move(a_id, TaskStatus::InProgress).is_some());
        assert!(board.begin_move(b_id, TaskStatus::Done).is_none());
        assert!(board.begin_move(a_id, TaskStatus::Done).is_none());

        assert_eq!(status_of(&board, b_id), TaskStatus::Todo);
        assert_eq!(status_of(&board, a_id), TaskStatus::InProgress);
    }

    #[test]
    fn test_noop_moves() {
        let t = task("a", TaskStatus::Todo);
        let id = t.id;
        let mut board = Board::new(vec![t]);

        assert!(board.begin_move(id, TaskStatus::Todo).is_none());
        assert!(board.begin_move(Uuid::new_v4(), TaskStatus::Done).is_none());
        assert_eq!(board.in_flight(), None);
    }

    #[test]
    fn test_failed_settle_rolls_back() {
        let t = task("a", TaskStatus::InProgress);
        let id = t.id;
        let mut board = Board::new(vec![t]);

        board.begin_move(id, TaskStatus::Done).unwrap();
        board.settle(id, false);

        assert_eq!(status_of(&board, id), TaskStatus::InProgress);
        assert_eq!(board.in_flight(), None);
        assert!(board.begin_move(id, TaskStatus::Todo).is_some());
    }

    #[test]
    fn test_successful_settle_keeps_move() {
        let t = task("a", TaskStatus::Todo);
        let id = t.id;
        let mut board = Board::new(vec![t]);

        board.begin_move(id, TaskStatus::Done).unwrap();
        board.settle(id, true);

        assert_eq!(status_of(&board, id), TaskStatus::Done);
        assert_eq!(board.in_flight(), None);
    }

    #[test]
    fn test_settle_unknown_task_is_noop() {
        let a = task("a", TaskStatus::Todo);
        let a_id = a.id;
        let mut board = Board::new(vec![a]);

        board.begin_move(a_id, TaskStatus::Done).unwrap();
        board.settle(Uuid::new_v4(), false);

        assert_eq!(board.in_flight(), Some(a_id));
        assert_eq!(status_of(&board, a_id), TaskStatus::Done);
    }

    #[test]
    fn test_replace_tasks_keeps_in_flight() {
        let a = task("a", TaskStatus::Todo);
        let a_id = a.id;
        let mut board = Board::new(vec![a.clone()]);

        board.begin_move(a_id, TaskStatus::Done).unwrap();

        let mut refreshed = a;
        refreshed.status = TaskStatus::Done;
        board.replace_tasks(vec![refreshed]);

        assert_eq!(board.in_flight(), Some(a_id));
        board.settle(a_id, false);
        assert_eq!(status_of(&board, a_id), TaskStatus::Todo);
    }
}
