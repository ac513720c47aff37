mod curve;

pub use curve::{AddAnchor, ClearCurve, CloseLoop, DeleteAnchor, MoveAnchor};

use std::fmt;

/// A reversible edit applied to a context of type `C`.
///
/// Executing then undoing a command must leave the context observably as
/// it was before execution. `execute` is also used for redo.
pub trait Command<C> {
    /// Applies (or re-applies) the edit.
    fn execute(&mut self, ctx: &mut C);

    /// Reverts the edit.
    fn undo(&mut self, ctx: &mut C);

    /// Short name used in logs.
    fn label(&self) -> &'static str {
        "command"
    }
}

/// Undo/redo availability, reported to the history listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryState {
    /// The undo stack is non-empty.
    pub can_undo: bool,
    /// The redo stack is non-empty.
    pub can_redo: bool,
}

type Listener = Box<dyn FnMut(HistoryState)>;

/// Undo and redo stacks of executed commands.
pub struct CommandLog<C> {
    undo_stack: Vec<Box<dyn Command<C>>>,
    redo_stack: Vec<Box<dyn Command<C>>>,
    listener: Option<Listener>,
}

impl<C> Default for CommandLog<C> {
    fn default() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            listener: None,
        }
    }
}

impl<C> fmt::Debug for CommandLog<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandLog")
            .field("undo", &self.undo_stack.len())
            .field("redo", &self.redo_stack.len())
            .finish_non_exhaustive()
    }
}

impl<C> CommandLog<C> {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a callback run after every change to the stacks.
    pub fn set_listener(&mut self, listener: impl FnMut(HistoryState) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Executes a command and records it. Clears the redo stack.
    pub fn execute(&mut self, mut command: Box<dyn Command<C>>, ctx: &mut C) {
        tracing::debug!(command = command.label(), "execute");
        command.execute(ctx);
        self.undo_stack.push(command);
        self.redo_stack.clear();
        self.notify();
    }

    /// Records a command whose effect has already been applied.
    pub fn push_existing(&mut self, command: Box<dyn Command<C>>) {
        tracing::debug!(command = command.label(), "record");
        self.undo_stack.push(command);
        self.redo_stack.clear();
        self.notify();
    }

    /// Reverts the most recent command. Returns `false` if there is none.
    pub fn undo(&mut self, ctx: &mut C) -> bool {
        let Some(mut command) = self.undo_stack.pop() else {
            return false;
        };
        tracing::debug!(command = command.label(), "undo");
        command.undo(ctx);
        self.redo_stack.push(command);
        self.notify();
        true
    }

    /// Re-applies the most recently undone command. Returns `false` if
    /// there is none.
    pub fn redo(&mut self, ctx: &mut C) -> bool {
        let Some(mut command) = self.redo_stack.pop() else {
            return false;
        };
        tracing::debug!(command = command.label(), "redo");
        command.execute(ctx);
        self.undo_stack.push(command);
        self.notify();
        true
    }

    /// Returns `true` if a command can be undone.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns `true` if a command can be redone.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Current undo/redo availability.
    #[must_use]
    pub fn state(&self) -> HistoryState {
        HistoryState {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }

    /// Drops both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.notify();
    }

    fn notify(&mut self) {
        let state = self.state();
        if let Some(listener) = self.listener.as_mut() {
            listener(state);
        }
    }
}

/// A group of commands executed in order and undone in reverse order.
pub struct MultiCommand<C> {
    commands: Vec<Box<dyn Command<C>>>,
}

impl<C> MultiCommand<C> {
    /// Groups `commands` into one history entry.
    #[must_use]
    pub fn new(commands: Vec<Box<dyn Command<C>>>) -> Self {
        Self { commands }
    }
}

impl<C> fmt::Debug for MultiCommand<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiCommand")
            .field("len", &self.commands.len())
            .finish()
    }
}

impl<C> Command<C> for MultiCommand<C> {
    fn execute(&mut self, ctx: &mut C) {
        for command in &mut self.commands {
            command.execute(ctx);
        }
    }

    fn undo(&mut self, ctx: &mut C) {
        for command in self.commands.iter_mut().rev() {
            command.undo(ctx);
        }
    }

    fn label(&self) -> &'static str {
        "multi"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Pushes a value on execute, pops it on undo.
    struct Push(i32);

    impl Command<Vec<i32>> for Push {
        fn execute(&mut self, ctx: &mut Vec<i32>) {
            ctx.push(self.0);
        }

        fn undo(&mut self, ctx: &mut Vec<i32>) {
            ctx.pop();
        }
    }

    #[test]
    fn undo_redo_cycle() {
        let mut log: CommandLog<Vec<i32>> = CommandLog::new();
        let mut v = Vec::new();
        log.execute(Box::new(Push(1)), &mut v);
        log.execute(Box::new(Push(2)), &mut v);
        assert_eq!(v, vec![1, 2]);

        assert!(log.undo(&mut v));
        assert_eq!(v, vec![1]);
        assert!(log.can_redo());

        assert!(log.redo(&mut v));
        assert_eq!(v, vec![1, 2]);
        assert!(!log.can_redo());
    }

    #[test]
    fn empty_stacks_decline() {
        let mut log: CommandLog<Vec<i32>> = CommandLog::new();
        let mut v = Vec::new();
        assert!(!log.undo(&mut v));
        assert!(!log.redo(&mut v));
    }

    #[test]
    fn execute_clears_redo() {
        let mut log: CommandLog<Vec<i32>> = CommandLog::new();
        let mut v = Vec::new();
        log.execute(Box::new(Push(1)), &mut v);
        log.undo(&mut v);
        log.execute(Box::new(Push(3)), &mut v);
        assert!(!log.can_redo());
        assert_eq!(v, vec![3]);
    }

    #[test]
    fn push_existing_is_undoable() {
        let mut log: CommandLog<Vec<i32>> = CommandLog::new();
        let mut v = vec![5];
        log.push_existing(Box::new(Push(5)));
        assert!(log.undo(&mut v));
        assert!(v.is_empty());
    }

    #[test]
    fn multi_undoes_in_reverse() {
        let mut log: CommandLog<Vec<i32>> = CommandLog::new();
        let mut v = Vec::new();
        let children: Vec<Box<dyn Command<Vec<i32>>>> = vec![Box::new(Push(1)), Box::new(Push(2))];
        log.execute(Box::new(MultiCommand::new(children)), &mut v);
        assert_eq!(v, vec![1, 2]);
        log.undo(&mut v);
        assert!(v.is_empty());
        log.redo(&mut v);
        assert_eq!(v, vec![1, 2]);
    }

    #[test]
    fn listener_sees_every_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut log: CommandLog<Vec<i32>> = CommandLog::new();
        log.set_listener(move |state| sink.borrow_mut().push(state));
        let mut v = Vec::new();
        log.execute(Box::new(Push(1)), &mut v);
        log.undo(&mut v);
        log.clear();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert_eq!(
            seen[0],
            HistoryState {
                can_undo: true,
                can_redo: false
            }
        );
        assert_eq!(
            seen[1],
            HistoryState {
                can_undo: false,
                can_redo: true
            }
        );
        assert_eq!(seen[2], HistoryState::default());
    }
}
