//! Newtype indices and label spaces for dense table addressing.

use std::{collections::HashMap, fmt, hash::Hash};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Dense row index of a state in a [`Space`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(usize);

impl StateId {
    pub const fn new(index: usize) -> Self {
        StateId(index)
    }

    /// Get the inner value.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Dense column index of an action in a [`Space`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(usize);

impl ActionId {
    pub const fn new(index: usize) -> Self {
        ActionId(index)
    }

    /// Get the inner value.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

/// Ordered set of labels with a bidirectional label <-> index mapping.
///
/// The order is fixed at construction and defines the row (for states) or
/// column (for actions) layout of every table built over the space, including
/// the persisted form.
#[derive(Debug, Clone)]
pub struct Space<T> {
    labels: Vec<T>,
    index: HashMap<T, usize>,
}

impl<T> Space<T>
where
    T: Clone + Eq + Hash + fmt::Debug,
{
    /// Build a space from labels in their significant order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateLabel`] if a label occurs twice, and
    /// [`Error::InvalidConfiguration`] if the space is empty.
    pub fn new(labels: Vec<T>) -> Result<Self> {
        if labels.is_empty() {
            return Err(Error::InvalidConfiguration {
                message: "label space must not be empty".to_string(),
            });
        }
        let mut index = HashMap::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            if index.insert(label.clone(), i).is_some() {
                return Err(Error::DuplicateLabel {
                    label: format!("{label:?}"),
                });
            }
        }
        Ok(Self { labels, index })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[T] {
        &self.labels
    }

    /// Position of `label`, if it belongs to the space.
    pub fn position(&self, label: &T) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn label(&self, position: usize) -> Option<&T> {
        self.labels.get(position)
    }

    /// Resolve a possibly negative position (`-1` is the last label).
    pub fn resolve_signed(&self, position: isize) -> Option<usize> {
        let len = self.labels.len() as isize;
        let resolved = if position < 0 { len + position } else { position };
        (0..len).contains(&resolved).then_some(resolved as usize)
    }

    pub fn state_id(&self, label: &T) -> Result<StateId> {
        self.position(label)
            .map(StateId)
            .ok_or_else(|| Error::UnknownState {
                state: format!("{label:?}"),
            })
    }

    pub fn action_id(&self, label: &T) -> Result<ActionId> {
        self.position(label)
            .map(ActionId)
            .ok_or_else(|| Error::UnknownAction {
                action: format!("{label:?}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_preserves_order() {
        let space = Space::new(vec!['a', 'b', 'c']).unwrap();
        assert_eq!(space.position(&'c'), Some(2));
        assert_eq!(space.label(1), Some(&'b'));
        assert_eq!(space.len(), 3);
    }

    #[test]
    fn test_space_rejects_duplicates() {
        let result = Space::new(vec![1, 2, 1]);
        assert!(matches!(result, Err(Error::DuplicateLabel { .. })));
    }

    #[test]
    fn test_space_rejects_empty() {
        let result = Space::<u8>::new(Vec::new());
        assert!(matches!(result, Err(Error::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_resolve_signed_counts_from_end() {
        let space = Space::new(vec![10, 20, 30]).unwrap();
        assert_eq!(space.resolve_signed(-1), Some(2));
        assert_eq!(space.resolve_signed(0), Some(0));
        assert_eq!(space.resolve_signed(3), None);
        assert_eq!(space.resolve_signed(-4), None);
    }

    #[test]
    fn test_unknown_labels_map_to_errors() {
        let space = Space::new(vec!["left", "right"]).unwrap();
        assert_eq!(space.action_id(&"right").unwrap(), ActionId::new(1));
        assert!(matches!(
            space.state_id(&"up"),
            Err(Error::UnknownState { .. })
        ));
    }
}
