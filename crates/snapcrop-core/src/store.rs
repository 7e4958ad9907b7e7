//! Per-kind annotation sequences with a tail draft.
//!
//! Each kind owns an ordered track. While that kind's tool is active the
//! last element of its track is the draft, otherwise every element is
//! committed. The store does not track activity itself: callers pass the
//! tool state in, so the draft rule is evaluated the same way for the live
//! preview and for export.

use crate::shapes::{Annotation, AnnotationKind, AnnotationTrait};
use crate::tools::ToolSet;
use kurbo::Point;

/// An annotation yielded for drawing.
#[derive(Debug, Clone, Copy)]
pub struct Visible<'a> {
    pub annotation: &'a Annotation,
    /// True for the draft of an active tool.
    pub live: bool,
}

#[derive(Debug, Clone, Default)]
struct Track {
    items: Vec<Annotation>,
}

impl Track {
    fn committed_len(&self, active: bool) -> usize {
        if active {
            self.items.len().saturating_sub(1)
        } else {
            self.items.len()
        }
    }
}

/// Ordered annotation collections, one per kind.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    markers: Track,
    lines: Track,
    arrows: Track,
    rectangles: Track,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn track(&self, kind: AnnotationKind) -> &Track {
        match kind {
            AnnotationKind::Marker => &self.markers,
            AnnotationKind::Line => &self.lines,
            AnnotationKind::Arrow => &self.arrows,
            AnnotationKind::Rectangle => &self.rectangles,
        }
    }

    fn track_mut(&mut self, kind: AnnotationKind) -> &mut Track {
        match kind {
            AnnotationKind::Marker => &mut self.markers,
            AnnotationKind::Line => &mut self.lines,
            AnnotationKind::Arrow => &mut self.arrows,
            AnnotationKind::Rectangle => &mut self.rectangles,
        }
    }

    /// Append a new draft anchored at `point`.
    pub(crate) fn begin_draft(&mut self, kind: AnnotationKind, point: Point) {
        self.track_mut(kind).items.push(Annotation::begin(kind, point));
    }

    /// Move the draft's trailing point. Only reachable while the tool is active.
    pub(crate) fn update_draft(&mut self, kind: AnnotationKind, point: Point) {
        if let Some(draft) = self.track_mut(kind).items.last_mut() {
            draft.set_moving_point(point);
        }
    }

    /// Drop the draft.
    pub(crate) fn discard_draft(&mut self, kind: AnnotationKind) -> Option<Annotation> {
        self.track_mut(kind).items.pop()
    }

    /// Turn the draft into a committed element, discarding it if it has no extent.
    ///
    /// Returns true when something was kept.
    pub(crate) fn finalize_draft(&mut self, kind: AnnotationKind) -> bool {
        let track = self.track_mut(kind);
        match track.items.last() {
            Some(draft) if draft.is_degenerate() => {
                track.items.pop();
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// The draft of an active tool.
    pub fn draft(&self, kind: AnnotationKind, active: bool) -> Option<&Annotation> {
        if active {
            self.track(kind).items.last()
        } else {
            None
        }
    }

    /// Remove the most recently committed element of a kind, never the draft.
    pub fn pop_committed(&mut self, kind: AnnotationKind, active: bool) -> Option<Annotation> {
        let track = self.track_mut(kind);
        let n = track.committed_len(active);
        if n == 0 {
            return None;
        }
        Some(track.items.remove(n - 1))
    }

    /// Committed elements of a kind, oldest first.
    pub fn committed(&self, kind: AnnotationKind, active: bool) -> &[Annotation] {
        let track = self.track(kind);
        &track.items[..track.committed_len(active)]
    }

    /// Number of committed elements of a kind.
    pub fn committed_len(&self, kind: AnnotationKind, active: bool) -> usize {
        self.track(kind).committed_len(active)
    }

    /// Total elements of a kind, draft included.
    pub fn len(&self, kind: AnnotationKind) -> usize {
        self.track(kind).items.len()
    }

    pub fn is_empty(&self) -> bool {
        AnnotationKind::ALL.iter().all(|k| self.track(*k).items.is_empty())
    }

    /// Everything of one kind that should be drawn, with the draft flagged as live.
    pub fn visible(&self, kind: AnnotationKind, active: bool) -> impl Iterator<Item = Visible<'_>> {
        let items = &self.track(kind).items;
        let last = items.len().saturating_sub(1);
        items.iter().enumerate().map(move |(i, annotation)| Visible {
            annotation,
            live: active && i == last,
        })
    }

    /// Everything visible across all kinds, in paint order.
    pub fn visible_all<'a>(&'a self, tools: &'a ToolSet) -> impl Iterator<Item = Visible<'a>> + 'a {
        AnnotationKind::ALL
            .into_iter()
            .flat_map(move |kind| self.visible(kind, tools.is_kind_active(kind)))
    }
}
