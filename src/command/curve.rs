use crate::curve::{AnchorId, Insertion};
use crate::editor::CurveSession;
use crate::math::Point3;

use super::Command;

/// Adds an anchor at the surface vertex nearest to a point.
///
/// Redo puts the same anchor id back rather than creating a new one, so
/// later history entries that name it stay valid.
#[derive(Debug, Clone)]
pub struct AddAnchor {
    point: Point3,
    insert_after: Option<usize>,
    placed: Option<Placed>,
}

#[derive(Debug, Clone, Copy)]
struct Placed {
    insertion: Insertion,
    vertex: usize,
    index: usize,
    closed: bool,
}

impl AddAnchor {
    /// Creates the command; `insert_after` is a curve position, `None`
    /// appends.
    #[must_use]
    pub fn new(point: Point3, insert_after: Option<usize>) -> Self {
        Self {
            point,
            insert_after,
            placed: None,
        }
    }

    /// What the first execution did, if it has run.
    #[must_use]
    pub fn outcome(&self) -> Option<Insertion> {
        self.placed.map(|p| p.insertion)
    }
}

impl Command<CurveSession> for AddAnchor {
    fn execute(&mut self, ctx: &mut CurveSession) {
        match self.placed {
            None => {
                let Some((insertion, vertex)) = ctx.insert_anchor(&self.point, self.insert_after)
                else {
                    return;
                };
                let id = insertion.id();
                self.placed = Some(Placed {
                    insertion,
                    vertex,
                    index: ctx.store().index_of(id).unwrap_or(0),
                    closed: ctx.store().is_closed(),
                });
            }
            Some(Placed {
                insertion: Insertion::Inserted(id),
                vertex,
                index,
                closed,
            }) => {
                ctx.reattach_anchor(id, vertex, index, closed);
            }
            Some(_) => {}
        }
    }

    fn undo(&mut self, ctx: &mut CurveSession) {
        if let Some(Placed {
            insertion: Insertion::Inserted(id),
            ..
        }) = self.placed
        {
            ctx.detach_anchor(id);
        }
    }

    fn label(&self) -> &'static str {
        "add anchor"
    }
}

/// Removes an anchor from the curve.
#[derive(Debug, Clone)]
pub struct DeleteAnchor {
    id: AnchorId,
    removed: Option<(usize, usize, bool)>,
}

impl DeleteAnchor {
    /// Creates the command.
    #[must_use]
    pub fn new(id: AnchorId) -> Self {
        Self { id, removed: None }
    }
}

impl Command<CurveSession> for DeleteAnchor {
    fn execute(&mut self, ctx: &mut CurveSession) {
        let was_closed = ctx.store().is_closed();
        self.removed = ctx
            .detach_anchor(self.id)
            .map(|(index, vertex)| (index, vertex, was_closed));
    }

    fn undo(&mut self, ctx: &mut CurveSession) {
        if let Some((index, vertex, was_closed)) = self.removed.take() {
            ctx.reattach_anchor(self.id, vertex, index, was_closed);
        }
    }

    fn label(&self) -> &'static str {
        "delete anchor"
    }
}

/// Re-snaps an anchor from one vertex to another.
#[derive(Debug, Clone)]
pub struct MoveAnchor {
    id: AnchorId,
    from: usize,
    to: usize,
}

impl MoveAnchor {
    /// Creates the command.
    #[must_use]
    pub fn new(id: AnchorId, from: usize, to: usize) -> Self {
        Self { id, from, to }
    }
}

impl Command<CurveSession> for MoveAnchor {
    fn execute(&mut self, ctx: &mut CurveSession) {
        ctx.relocate_anchor(self.id, self.to);
    }

    fn undo(&mut self, ctx: &mut CurveSession) {
        ctx.relocate_anchor(self.id, self.from);
    }

    fn label(&self) -> &'static str {
        "move anchor"
    }
}

/// Connects the last anchor back to the first.
#[derive(Debug, Clone, Default)]
pub struct CloseLoop {
    previous: bool,
}

impl CloseLoop {
    /// Creates the command.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Command<CurveSession> for CloseLoop {
    fn execute(&mut self, ctx: &mut CurveSession) {
        self.previous = ctx.store().is_closed();
        ctx.set_closed(true);
    }

    fn undo(&mut self, ctx: &mut CurveSession) {
        ctx.set_closed(self.previous);
    }

    fn label(&self) -> &'static str {
        "close loop"
    }
}

/// Empties the curve; undo brings back the same anchors and closed flag.
#[derive(Debug, Clone, Default)]
pub struct ClearCurve {
    saved: Vec<AnchorId>,
    closed: bool,
}

impl ClearCurve {
    /// Creates the command.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Command<CurveSession> for ClearCurve {
    fn execute(&mut self, ctx: &mut CurveSession) {
        self.closed = ctx.store().is_closed();
        self.saved = ctx.hard_reset(false);
    }

    fn undo(&mut self, ctx: &mut CurveSession) {
        ctx.restore_full_state(&self.saved, self.closed);
    }

    fn label(&self) -> &'static str {
        "clear curve"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::command::{CommandLog, MultiCommand};
    use crate::testing::{grid_session, p};

    fn snapshot(ctx: &CurveSession) -> (Vec<usize>, bool) {
        (ctx.store().vertices(), ctx.store().is_closed())
    }

    fn add(log: &mut CommandLog<CurveSession>, ctx: &mut CurveSession, x: f64, y: f64) {
        log.execute(Box::new(AddAnchor::new(p(x, y, 0.0), None)), ctx);
    }

    #[test]
    fn add_snaps_to_nearest_vertex() {
        let (mut ctx, _log) = grid_session(11);
        let mut cmd = AddAnchor::new(p(2.2, 3.9, 0.4), None);
        cmd.execute(&mut ctx);
        assert!(cmd.outcome().unwrap().is_new());
        // (2, 4) on an 11-wide grid
        assert_eq!(ctx.store().vertices(), vec![46]);
    }

    #[test]
    fn undoing_repeated_add_keeps_anchor() {
        let (mut ctx, _log) = grid_session(11);
        let mut log = CommandLog::new();
        add(&mut log, &mut ctx, 1.0, 1.0);
        add(&mut log, &mut ctx, 1.1, 0.9);
        assert_eq!(ctx.store().len(), 1);
        log.undo(&mut ctx);
        assert_eq!(ctx.store().len(), 1);
        log.undo(&mut ctx);
        assert!(ctx.store().is_empty());
    }

    #[test]
    fn mixed_history_round_trips() {
        let (mut ctx, handles) = grid_session(11);
        let mut log = CommandLog::new();
        let initial = snapshot(&ctx);

        add(&mut log, &mut ctx, 0.0, 0.0);
        add(&mut log, &mut ctx, 10.0, 0.0);
        add(&mut log, &mut ctx, 10.0, 10.0);
        let first = ctx.store().ids()[0];
        let second = ctx.store().ids()[1];
        log.execute(Box::new(CloseLoop::new()), &mut ctx);
        log.execute(Box::new(MoveAnchor::new(second, 10, 9)), &mut ctx);
        log.execute(Box::new(DeleteAnchor::new(first)), &mut ctx);
        log.execute(Box::new(ClearCurve::new()), &mut ctx);
        add(&mut log, &mut ctx, 5.0, 5.0);

        let mut states = Vec::new();
        while log.can_undo() {
            states.push(snapshot(&ctx));
            log.undo(&mut ctx);
        }
        assert_eq!(snapshot(&ctx), initial);
        assert_eq!(handles.borrow().live.len(), 0);

        while log.can_redo() {
            log.redo(&mut ctx);
        }
        assert_eq!(snapshot(&ctx), states[0]);
        assert_eq!(handles.borrow().live.len(), 1);
    }

    #[test]
    fn delete_then_undo_restores_middle_and_closed() {
        let (mut ctx, _handles) = grid_session(11);
        let mut log = CommandLog::new();
        add(&mut log, &mut ctx, 0.0, 0.0);
        add(&mut log, &mut ctx, 5.0, 0.0);
        add(&mut log, &mut ctx, 5.0, 5.0);
        log.execute(Box::new(CloseLoop::new()), &mut ctx);
        let middle = ctx.store().ids()[1];

        log.execute(Box::new(DeleteAnchor::new(middle)), &mut ctx);
        assert!(!ctx.store().is_closed());
        log.undo(&mut ctx);
        assert_eq!(ctx.store().ids()[1], middle);
        assert!(ctx.store().is_closed());
    }

    #[test]
    fn delete_missing_anchor_is_noop() {
        let (mut ctx, _handles) = grid_session(11);
        let mut log = CommandLog::new();
        add(&mut log, &mut ctx, 0.0, 0.0);
        add(&mut log, &mut ctx, 3.0, 0.0);
        let id = ctx.store().ids()[0];
        log.execute(Box::new(DeleteAnchor::new(id)), &mut ctx);
        log.execute(Box::new(DeleteAnchor::new(id)), &mut ctx);
        assert_eq!(ctx.store().len(), 1);
        log.undo(&mut ctx);
        assert_eq!(ctx.store().len(), 1);
        log.undo(&mut ctx);
        assert_eq!(ctx.store().len(), 2);
    }

    #[test]
    fn clear_reuses_and_recreates_handles() {
        let (mut ctx, handles) = grid_session(11);
        let mut log = CommandLog::new();
        add(&mut log, &mut ctx, 0.0, 0.0);
        add(&mut log, &mut ctx, 4.0, 0.0);
        let updates = handles.borrow().curve_updates;
        log.execute(Box::new(ClearCurve::new()), &mut ctx);
        assert!(handles.borrow().live.is_empty());
        assert!(handles.borrow().curve_updates > updates);
        log.undo(&mut ctx);
        assert_eq!(handles.borrow().live.len(), 2);
        assert_eq!(ctx.store().vertices(), vec![0, 4]);
    }

    #[test]
    fn multi_command_clears_as_one_step() {
        let (mut ctx, _handles) = grid_session(11);
        let mut log = CommandLog::new();
        add(&mut log, &mut ctx, 0.0, 0.0);
        add(&mut log, &mut ctx, 4.0, 0.0);
        let before = snapshot(&ctx);
        let children: Vec<Box<dyn Command<CurveSession>>> = vec![
            Box::new(AddAnchor::new(p(4.0, 4.0, 0.0), None)),
            Box::new(ClearCurve::new()),
        ];
        log.execute(Box::new(MultiCommand::new(children)), &mut ctx);
        assert!(ctx.store().is_empty());
        log.undo(&mut ctx);
        assert_eq!(snapshot(&ctx), before);
    }
}
