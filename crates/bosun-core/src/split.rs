//! Split-view layout: ≥2 sessions shown side by side in proportioned panes
//! along one axis.
//!
//! The view is a two-state machine: Disabled (no panes) and Enabled (two or
//! more panes). A pane list of length 1 is never a valid enabled state; any
//! operation that would leave exactly one pane disables the view instead.
//! While enabled, `session_ids` and `sizes` stay the same length and the
//! sizes are percentages that sum to 100 (up to the documented divider-drag
//! boundary case, see [`SplitView::resize_divider`]).

use serde::{Deserialize, Serialize};

use crate::session::SessionId;

/// Stacking axis for the panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitDirection {
    Horizontal,
    Vertical,
}

/// Smallest share a pane can be dragged down to, in percent.
pub const MIN_PANE_PERCENT: f32 = 10.0;
/// Largest share a dragged pane can take, in percent.
pub const MAX_PANE_PERCENT: f32 = 90.0;

/// Outcome of removing a pane, so the caller can fix up focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitRemoval {
    /// The id was not a member; nothing changed.
    NotMember,
    /// The pane was removed and the view is still enabled.
    Removed,
    /// Membership dropped below 2; the view reset to Disabled. `remaining`
    /// is the sole surviving pane, if there was one.
    Disabled { remaining: Option<SessionId> },
}

#[derive(Debug, Clone)]
pub struct SplitView {
    session_ids: Vec<SessionId>,
    /// Pane sizes in percent, parallel to `session_ids`.
    sizes: Vec<f32>,
    direction: SplitDirection,
}

impl SplitView {
    pub fn new() -> Self {
        Self {
            session_ids: Vec::new(),
            sizes: Vec::new(),
            direction: SplitDirection::Horizontal,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.session_ids.is_empty()
    }

    pub fn session_ids(&self) -> &[SessionId] {
        &self.session_ids
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn direction(&self) -> SplitDirection {
        self.direction
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.session_ids.contains(&id)
    }

    /// Enable the view with the given panes at equal shares.
    ///
    /// Fewer than 2 ids is a no-op returning `false`, leaving the current
    /// state untouched.
    pub fn enable(&mut self, ids: Vec<SessionId>, direction: SplitDirection) -> bool {
        if ids.len() < 2 {
            return false;
        }
        let share = 100.0 / ids.len() as f32;
        self.sizes = vec![share; ids.len()];
        self.session_ids = ids;
        self.direction = direction;
        true
    }

    /// Append a pane to an enabled view.
    ///
    /// The newcomer gets the equal share 100/n and existing panes are
    /// scaled down proportionally, so mutual proportions and the
    /// sum-to-100 invariant are preserved. No-op when disabled or when the
    /// id is already a member.
    pub fn add(&mut self, id: SessionId) -> bool {
        if !self.is_enabled() || self.contains(id) {
            return false;
        }
        let share = 100.0 / (self.session_ids.len() + 1) as f32;
        let scale = (100.0 - share) / 100.0;
        for size in &mut self.sizes {
            *size *= scale;
        }
        self.session_ids.push(id);
        self.sizes.push(share);
        true
    }

    /// Remove a pane, redistributing its share proportionally over the
    /// survivors. Dropping below 2 members resets to Disabled.
    pub fn remove(&mut self, id: SessionId) -> SplitRemoval {
        let Some(pos) = self.session_ids.iter().position(|&other| other == id) else {
            return SplitRemoval::NotMember;
        };
        self.session_ids.remove(pos);
        self.sizes.remove(pos);

        if self.session_ids.len() < 2 {
            let remaining = self.session_ids.first().copied();
            self.session_ids.clear();
            self.sizes.clear();
            return SplitRemoval::Disabled { remaining };
        }

        let total: f32 = self.sizes.iter().sum();
        if total > 0.0 {
            let scale = 100.0 / total;
            for size in &mut self.sizes {
                *size *= scale;
            }
        }
        SplitRemoval::Removed
    }

    /// Pure field update; meaningful only while enabled but valid in
    /// either state.
    pub fn set_direction(&mut self, direction: SplitDirection) {
        self.direction = direction;
    }

    /// Interactive divider drag, run once per pointer-move event.
    ///
    /// `pointer_fraction` is the pointer's position as a fraction of the
    /// total layout extent along the stacking axis. The pane at `divider`
    /// is sized so its far edge lands under the pointer, clamped to
    /// [10, 90]; the pane at `divider + 1` absorbs the negated delta with
    /// only its 10% floor enforced. When one side hits a clamp the sum can
    /// transiently drift off 100 during a fast drag; this is a known
    /// boundary case and is deliberately not renormalized here.
    ///
    /// Repeated calls with the same fraction are idempotent.
    pub fn resize_divider(&mut self, divider: usize, pointer_fraction: f32) {
        if divider + 1 >= self.session_ids.len() {
            return;
        }
        let cumulative: f32 = self.sizes[..divider].iter().sum();
        let target =
            (pointer_fraction * 100.0 - cumulative).clamp(MIN_PANE_PERCENT, MAX_PANE_PERCENT);
        let delta = target - self.sizes[divider];
        self.sizes[divider] = target;
        self.sizes[divider + 1] = (self.sizes[divider + 1] - delta).max(MIN_PANE_PERCENT);
    }

    /// Reset to Disabled.
    pub fn clear(&mut self) {
        self.session_ids.clear();
        self.sizes.clear();
    }
}

impl Default for SplitView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_sums_to_100(view: &SplitView) {
        let total: f32 = view.sizes().iter().sum();
        assert!(
            (total - 100.0).abs() < 1e-3,
            "sizes should sum to 100, got {total}"
        );
    }

    #[test]
    fn test_enable_with_fewer_than_two_is_noop() {
        let mut view = SplitView::new();
        assert!(!view.enable(vec![], SplitDirection::Horizontal));
        assert!(!view.enable(vec![1], SplitDirection::Horizontal));
        assert!(!view.is_enabled());
        assert!(view.session_ids().is_empty());
    }

    #[test]
    fn test_enable_initializes_equal_shares() {
        let mut view = SplitView::new();
        assert!(view.enable(vec![1, 2, 3], SplitDirection::Vertical));
        assert!(view.is_enabled());
        assert_eq!(view.session_ids(), &[1, 2, 3]);
        assert_eq!(view.direction(), SplitDirection::Vertical);
        for &size in view.sizes() {
            assert!((size - 100.0 / 3.0).abs() < 1e-4);
        }
        assert_sums_to_100(&view);
    }

    #[test]
    fn test_add_keeps_lengths_parallel_and_sum() {
        let mut view = SplitView::new();
        view.enable(vec![1, 2], SplitDirection::Horizontal);
        view.resize_divider(0, 0.7);

        assert!(view.add(3));
        assert_eq!(view.session_ids().len(), view.sizes().len());
        assert_sums_to_100(&view);
        // Newcomer takes the equal share.
        assert!((view.sizes()[2] - 100.0 / 3.0).abs() < 1e-3);
        // Existing panes keep their mutual proportion (70:30).
        let ratio = view.sizes()[0] / view.sizes()[1];
        assert!((ratio - 70.0 / 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_add_rejects_duplicate_and_disabled() {
        let mut view = SplitView::new();
        assert!(!view.add(1), "add while disabled is a no-op");

        view.enable(vec![1, 2], SplitDirection::Horizontal);
        assert!(!view.add(2), "adding a member again is a no-op");
        assert_eq!(view.session_ids(), &[1, 2]);
    }

    #[test]
    fn test_remove_redistributes_proportionally() {
        let mut view = SplitView::new();
        view.enable(vec![1, 2, 3], SplitDirection::Horizontal);

        assert_eq!(view.remove(2), SplitRemoval::Removed);
        assert_eq!(view.session_ids(), &[1, 3]);
        assert_eq!(view.sizes().len(), 2);
        assert_sums_to_100(&view);
    }

    #[test]
    fn test_remove_below_two_disables() {
        let mut view = SplitView::new();
        view.enable(vec![1, 2], SplitDirection::Horizontal);

        assert_eq!(
            view.remove(1),
            SplitRemoval::Disabled { remaining: Some(2) }
        );
        assert!(!view.is_enabled());
        assert!(view.session_ids().is_empty());
        assert!(view.sizes().is_empty());
    }

    #[test]
    fn test_remove_non_member() {
        let mut view = SplitView::new();
        view.enable(vec![1, 2], SplitDirection::Horizontal);
        assert_eq!(view.remove(9), SplitRemoval::NotMember);
        assert_eq!(view.session_ids(), &[1, 2]);
    }

    #[test]
    fn test_resize_divider_moves_adjacent_panes() {
        let mut view = SplitView::new();
        view.enable(vec![1, 2], SplitDirection::Horizontal);

        view.resize_divider(0, 0.7);
        assert!((view.sizes()[0] - 70.0).abs() < 1e-4);
        assert!((view.sizes()[1] - 30.0).abs() < 1e-4);
        assert_sums_to_100(&view);
    }

    #[test]
    fn test_resize_divider_is_idempotent() {
        let mut view = SplitView::new();
        view.enable(vec![1, 2, 3], SplitDirection::Horizontal);

        view.resize_divider(1, 0.6);
        let after_first = view.sizes().to_vec();
        view.resize_divider(1, 0.6);
        view.resize_divider(1, 0.6);
        assert_eq!(view.sizes(), after_first.as_slice());
    }

    #[test]
    fn test_resize_divider_clamps_to_bounds() {
        let mut view = SplitView::new();
        view.enable(vec![1, 2], SplitDirection::Horizontal);

        view.resize_divider(0, 0.01);
        assert!((view.sizes()[0] - MIN_PANE_PERCENT).abs() < 1e-4);

        view.resize_divider(0, 0.99);
        assert!((view.sizes()[0] - MAX_PANE_PERCENT).abs() < 1e-4);
        assert!(view.sizes()[1] >= MIN_PANE_PERCENT);
    }

    #[test]
    fn test_resize_divider_out_of_range_is_noop() {
        let mut view = SplitView::new();
        view.enable(vec![1, 2], SplitDirection::Horizontal);
        let before = view.sizes().to_vec();

        view.resize_divider(1, 0.5);
        view.resize_divider(7, 0.5);
        assert_eq!(view.sizes(), before.as_slice());
    }

    #[test]
    fn test_set_direction_valid_in_either_state() {
        let mut view = SplitView::new();
        view.set_direction(SplitDirection::Vertical);
        assert_eq!(view.direction(), SplitDirection::Vertical);

        view.enable(vec![1, 2], SplitDirection::Vertical);
        view.set_direction(SplitDirection::Horizontal);
        assert_eq!(view.direction(), SplitDirection::Horizontal);
    }

    #[test]
    fn test_lengths_stay_parallel_across_mutations() {
        let mut view = SplitView::new();
        view.enable(vec![1, 2], SplitDirection::Horizontal);
        view.add(3);
        view.add(4);
        view.remove(2);
        view.add(5);
        view.remove(1);
        assert_eq!(view.session_ids().len(), view.sizes().len());
        assert_sums_to_100(&view);
    }
}
