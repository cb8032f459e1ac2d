//! List splicing for drag-and-drop reordering.
//!
//! [`reorder`] is the whole algorithm. [`DragSession`] is the input adapter:
//! it remembers what is being dragged and turns hover/drop events into
//! `reorder` calls, so any event source (pointer, touch, HTTP) can drive it.

use thiserror::Error;

use crate::types::SearchResult;

/// Index outside the list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("index {index} out of range for list of length {len}")]
pub struct ReorderError {
    pub index: usize,
    pub len: usize,
}

/// Move the item at `from` to `to`, shifting everything in between.
///
/// Moving an item onto its own index returns the list unchanged.
///
/// # Errors
///
/// Returns `ReorderError` if either index is out of range.
pub fn reorder<T>(mut list: Vec<T>, from: usize, to: usize) -> Result<Vec<T>, ReorderError> {
    splice(&mut list, from, to)?;
    Ok(list)
}

/// In-place form of [`reorder`]. Returns whether the list changed.
fn splice<T>(list: &mut Vec<T>, from: usize, to: usize) -> Result<bool, ReorderError> {
    let len = list.len();
    if let Some(index) = [from, to].into_iter().find(|&i| i >= len) {
        return Err(ReorderError { index, len });
    }
    if from == to {
        return Ok(false);
    }
    let item = list.remove(from);
    list.insert(to, item);
    Ok(true)
}

/// What a drag gesture carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragPayload {
    /// A product already in the working list, at its current index.
    Product { index: usize },
    /// A search result being promoted into the working list.
    SearchResult(SearchResult),
}

/// Result of dropping a drag payload onto a list slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Nothing to do.
    Noop,
    /// A product move that hovering did not already apply.
    Move { from: usize, to: usize },
    /// Append the search result through the add path. The drop index is
    /// deliberately ignored.
    Add(SearchResult),
}

/// An in-progress drag gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    payload: DragPayload,
}

impl DragSession {
    /// Start dragging the product at `index`.
    #[must_use]
    pub const fn product(index: usize) -> Self {
        Self {
            payload: DragPayload::Product { index },
        }
    }

    /// Start dragging a search result.
    #[must_use]
    pub const fn search_result(result: SearchResult) -> Self {
        Self {
            payload: DragPayload::SearchResult(result),
        }
    }

    #[must_use]
    pub const fn payload(&self) -> &DragPayload {
        &self.payload
    }

    /// Hover over slot `target` of `list`.
    ///
    /// A product drag splices the dragged item to `target` immediately and
    /// follows it there, so the list previews the final order while the
    /// gesture is still in flight. Returns whether the list changed.
    ///
    /// # Errors
    ///
    /// Returns `ReorderError` if `target` or the tracked index is out of
    /// range. The list is left untouched.
    pub fn hover<T>(&mut self, list: &mut Vec<T>, target: usize) -> Result<bool, ReorderError> {
        let DragPayload::Product { index } = &mut self.payload else {
            return Ok(false);
        };
        let changed = splice(list, *index, target)?;
        *index = target;
        Ok(changed)
    }

    /// Finish the gesture over slot `target`.
    #[must_use]
    pub fn drop_on(self, target: usize) -> DropOutcome {
        match self.payload {
            DragPayload::Product { index } if index == target => DropOutcome::Noop,
            DragPayload::Product { index } => DropOutcome::Move {
                from: index,
                to: target,
            },
            DragPayload::SearchResult(result) => DropOutcome::Add(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductId;

    #[test]
    fn test_reorder_moves_forward_and_back() {
        let list = vec!["a", "b", "c", "d"];

        assert_eq!(reorder(list.clone(), 0, 2).unwrap(), vec!["b", "c", "a", "d"]);
        assert_eq!(reorder(list, 3, 1).unwrap(), vec!["a", "d", "b", "c"]);
    }

    #[test]
    fn test_reorder_same_index_is_noop() {
        let list = vec![1, 2, 3];
        assert_eq!(reorder(list.clone(), 1, 1).unwrap(), list);
    }

    #[test]
    fn test_reorder_rejects_out_of_range() {
        let err = reorder(vec![1, 2], 0, 5).unwrap_err();
        assert_eq!(err, ReorderError { index: 5, len: 2 });
    }

    #[test]
    fn test_hover_tracks_dragged_item() {
        let mut list = vec!["a", "b", "c", "d"];
        let mut drag = DragSession::product(0);

        assert!(drag.hover(&mut list, 1).unwrap());
        assert_eq!(list, vec!["b", "a", "c", "d"]);

        assert!(drag.hover(&mut list, 3).unwrap());
        assert_eq!(list, vec!["b", "c", "d", "a"]);

        assert!(!drag.hover(&mut list, 3).unwrap());
        assert_eq!(drag.drop_on(3), DropOutcome::Noop);
    }

    #[test]
    fn test_hover_out_of_range_keeps_list() {
        let mut list = vec!["a", "b", "c"];
        let mut drag = DragSession::product(1);

        let err = drag.hover(&mut list, 3).unwrap_err();

        assert_eq!(err, ReorderError { index: 3, len: 3 });
        assert_eq!(list, vec!["a", "b", "c"]);
        assert_eq!(drag.drop_on(1), DropOutcome::Noop);
    }

    #[test]
    fn test_drop_without_hover_moves() {
        let drag = DragSession::product(2);
        assert_eq!(drag.drop_on(0), DropOutcome::Move { from: 2, to: 0 });
    }

    #[test]
    fn test_search_result_drop_appends() {
        let result = SearchResult {
            id: ProductId::new("42"),
            name: "Scarf".to_string(),
            image: None,
            top_selling_items: None,
            top_selling_position: None,
            latest_item: None,
            latest_item_position: None,
        };
        let mut list = vec!["a", "b"];
        let mut drag = DragSession::search_result(result.clone());

        assert!(!drag.hover(&mut list, 0).unwrap());
        assert_eq!(list, vec!["a", "b"]);
        assert_eq!(drag.drop_on(0), DropOutcome::Add(result));
    }
}
