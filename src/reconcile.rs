//! Placeholder-vs-live decision for each editable collection.
//!
//! A collection loaded with entries starts `Live`; an empty one starts in
//! `Placeholder` and shows the built-in examples. The first add flips it to
//! `Live` for the rest of the session, and the examples are dropped rather
//! than merged. Removing the last entry keeps it `Live`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Spotlight,
    Media,
    Shop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionState {
    Placeholder,
    Live,
}

/// What the view should render for a collection.
#[derive(Debug, PartialEq, Eq)]
pub enum CollectionView<'a, T> {
    Examples(&'a [T]),
    Items(&'a [T]),
    /// Live with nothing in it: render an "add your first item" prompt.
    Empty,
}

impl<'a, T> CollectionView<'a, T> {
    pub fn entries(&self) -> &'a [T] {
        match self {
            CollectionView::Examples(e) | CollectionView::Items(e) => *e,
            CollectionView::Empty => &[],
        }
    }

    pub fn is_example(&self) -> bool { matches!(self, CollectionView::Examples(_)) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciler {
    kind: CollectionKind,
    state: CollectionState,
}

impl Reconciler {
    pub fn on_load<T>(kind: CollectionKind, loaded: Option<&[T]>) -> Self {
        let state = match loaded {
            Some(items) if !items.is_empty() => CollectionState::Live,
            _ => CollectionState::Placeholder,
        };
        Reconciler { kind, state }
    }

    pub fn kind(&self) -> CollectionKind { self.kind }
    pub fn state(&self) -> CollectionState { self.state }
    pub fn is_live(&self) -> bool { self.state == CollectionState::Live }

    /// Append a user entry, going live first if needed. Returns the index of
    /// the new entry.
    pub fn add<T>(&mut self, items: &mut Vec<T>, item: T) -> usize {
        if self.state == CollectionState::Placeholder {
            items.clear();
            self.state = CollectionState::Live;
            tracing::info!(collection = ?self.kind, "collection went live");
        }
        items.push(item);
        items.len() - 1
    }

    /// Mutable access to a user entry. Examples are read-only, so this is
    /// `None` while in `Placeholder`.
    pub fn entry_mut<'a, T>(&self, items: &'a mut [T], index: usize) -> Option<&'a mut T> {
        if !self.is_live() { return None; }
        items.get_mut(index)
    }

    pub fn remove<T>(&self, items: &mut Vec<T>, index: usize) -> Option<T> {
        if !self.is_live() || index >= items.len() { return None; }
        Some(items.remove(index))
    }

    pub fn view<'a, T>(&self, items: &'a [T], examples: &'a [T]) -> CollectionView<'a, T> {
        match self.state {
            CollectionState::Placeholder => CollectionView::Examples(examples),
            CollectionState::Live if items.is_empty() => CollectionView::Empty,
            CollectionState::Live => CollectionView::Items(items),
        }
    }
}
