// src/drag.rs

use serde::{Deserialize, Serialize};

/// Default rendered height of one ranking item, in pixels.
pub const DEFAULT_ITEM_HEIGHT: f64 = 48.0;

/// One entry of the ranking list as read out at submit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedToken {
    /// 1-based visual position.
    pub rank: usize,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq)]
struct RankingSlot {
    token: String,
    height: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging { active: String },
}

/// Pointer-drag reordering of a small fixed list of ranking items.
///
/// Items are stacked vertically from `origin_y` in their current order; their
/// midpoints decide where the dragged item lands. The order is updated on every
/// drag-over, so drag-end has nothing left to reconcile.
#[derive(Debug, Clone)]
pub struct DragReorderController {
    items: Vec<RankingSlot>,
    origin_y: f64,
    state: DragState,
}

impl DragReorderController {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_layout(
            tokens
                .into_iter()
                .map(|t| (t.into(), DEFAULT_ITEM_HEIGHT)),
            0.0,
        )
    }

    /// Items with explicit heights, laid out downwards from `origin_y`.
    pub fn with_layout<I>(items: I, origin_y: f64) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        Self {
            items: items
                .into_iter()
                .map(|(token, height)| RankingSlot { token, height })
                .collect(),
            origin_y,
            state: DragState::Idle,
        }
    }

    /// Replaces the item list. Items that stay keep their measured height;
    /// a drag whose active item disappeared is dropped.
    pub fn set_items<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<RankingSlot> = tokens
            .into_iter()
            .map(|t| {
                let token = t.into();
                let height = self
                    .items
                    .iter()
                    .find(|i| i.token == token)
                    .map_or(DEFAULT_ITEM_HEIGHT, |i| i.height);
                RankingSlot { token, height }
            })
            .collect();
        self.items = items;

        let active_gone = matches!(
            &self.state,
            DragState::Dragging { active } if !self.items.iter().any(|i| &i.token == active)
        );
        if active_gone {
            tracing::debug!("Active ranking item was removed, dropping the drag");
            self.state = DragState::Idle;
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Idle -> Dragging. Ignored while already dragging or for unknown tokens.
    pub fn drag_start(&mut self, token: &str) -> bool {
        if self.is_dragging() || !self.items.iter().any(|i| i.token == token) {
            return false;
        }
        tracing::debug!("Drag started on '{}'", token);
        self.state = DragState::Dragging {
            active: token.to_string(),
        };
        true
    }

    /// Relocates the active item to the insertion point under the pointer.
    /// Returns `true` when the order changed.
    pub fn drag_over(&mut self, pointer_y: f64) -> bool {
        let DragState::Dragging { active } = &self.state else {
            return false;
        };
        let Some(from) = self.items.iter().position(|i| &i.token == active) else {
            return false;
        };

        let anchor = self.insertion_anchor(from, pointer_y);
        let before = self.tokens();

        let item = self.items.remove(from);
        match anchor {
            // Anchor indices were taken before removal.
            Some(anchor) if anchor > from => self.items.insert(anchor - 1, item),
            Some(anchor) => self.items.insert(anchor, item),
            None => self.items.push(item),
        }

        before != self.tokens()
    }

    /// Dragging -> Idle. The last computed position is already committed.
    pub fn drag_end(&mut self) {
        if let DragState::Dragging { active } = &self.state {
            tracing::debug!("Drag ended on '{}'", active);
        }
        self.state = DragState::Idle;
    }

    /// Nearest non-active item whose midpoint lies below the pointer.
    /// `None` means the pointer is below every item: insert at the end.
    fn insertion_anchor(&self, active: usize, pointer_y: f64) -> Option<usize> {
        let mut top = self.origin_y;
        let mut closest: Option<(usize, f64)> = None;

        for (index, item) in self.items.iter().enumerate() {
            let midpoint = top + item.height / 2.0;
            top += item.height;
            if index == active {
                continue;
            }
            let offset = pointer_y - midpoint;
            if offset < 0.0 && closest.is_none_or(|(_, best)| offset > best) {
                closest = Some((index, offset));
            }
        }

        closest.map(|(index, _)| index)
    }

    /// Item keys in their current order.
    pub fn tokens(&self) -> Vec<String> {
        self.items.iter().map(|i| i.token.clone()).collect()
    }

    /// Current order as contiguous 1-based ranks.
    pub fn current_order(&self) -> Vec<RankedToken> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| RankedToken {
                rank: index + 1,
                token: item.token.clone(),
            })
            .collect()
    }
}
