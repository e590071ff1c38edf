//! Editor selection state
//!
//! ```text
//! None (-1) --select i < len--> Tab(i)
//!    |                            |
//!    +---select len---> NewTab ---+--attach card--> Tab(len)
//!
//! remove tab --> None
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditSelection {
    /// Nothing selected for editing
    #[default]
    None,
    /// Editing an existing tab
    Tab(usize),
    /// Composing a tab that is not in the list yet
    NewTab,
}

impl EditSelection {
    /// Interpret a raw toolbar index against a list of `len` tabs.
    ///
    /// `-1` is no selection and `len` is the new-tab slot; anything else
    /// outside `0..len` is rejected.
    pub fn from_index(index: i64, len: usize) -> Option<Self> {
        match usize::try_from(index) {
            Ok(i) if i < len => Some(EditSelection::Tab(i)),
            Ok(i) if i == len => Some(EditSelection::NewTab),
            Ok(_) => None,
            Err(_) if index == -1 => Some(EditSelection::None),
            Err(_) => None,
        }
    }

    /// Raw index, with `len` standing for the new-tab slot
    pub fn index(&self, len: usize) -> i64 {
        match self {
            EditSelection::None => -1,
            EditSelection::Tab(i) => *i as i64,
            EditSelection::NewTab => len as i64,
        }
    }

    /// Re-anchor after the list changed under the editor
    pub fn clamp(self, len: usize) -> Self {
        match self {
            EditSelection::Tab(i) if i >= len => EditSelection::None,
            other => other,
        }
    }

    pub fn is_new_tab(&self) -> bool {
        matches!(self, EditSelection::NewTab)
    }
}
