//! Display sink trait
//!
//! Defines the interface between the watch-face core and the renderer.

/// Number of distinct text fields
pub const FIELD_COUNT: usize = 6;

/// A text field on the watch face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FieldId {
    /// `MM/DD`, upper left
    Date,
    /// `H:MM` or `HH:MM`, large, centered
    Time,
    /// Watch battery indicator, upper right
    LocalBattery,
    /// Phone battery indicator
    RemoteBattery,
    /// Event or calendar text
    Primary,
    /// Event location
    Secondary,
}

impl FieldId {
    /// All fields, in index order
    pub const ALL: [FieldId; FIELD_COUNT] = [
        FieldId::Date,
        FieldId::Time,
        FieldId::LocalBattery,
        FieldId::RemoteBattery,
        FieldId::Primary,
        FieldId::Secondary,
    ];

    /// Stable index of this field (0..FIELD_COUNT)
    pub const fn index(self) -> usize {
        match self {
            FieldId::Date => 0,
            FieldId::Time => 1,
            FieldId::LocalBattery => 2,
            FieldId::RemoteBattery => 3,
            FieldId::Primary => 4,
            FieldId::Secondary => 5,
        }
    }
}

/// Display sink errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// The layout has no such field
    UnknownField,
    /// Renderer not ready to accept text
    NotReady,
}

/// Display sink trait
///
/// Implementations take a copy of `text`; the caller's buffer is not
/// borrowed past the call. Text longer than the field can show is
/// truncated by the implementation.
pub trait DisplaySink {
    /// Replace the text of a field
    fn set_field_text(&mut self, field: FieldId, text: &str) -> Result<(), DisplayError>;
}

impl<T: DisplaySink + ?Sized> DisplaySink for &mut T {
    fn set_field_text(&mut self, field: FieldId, text: &str) -> Result<(), DisplayError> {
        (**self).set_field_text(field, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all() {
        for (i, field) in FieldId::ALL.iter().enumerate() {
            assert_eq!(field.index(), i);
        }
    }
}
