//! Field text model
//!
//! Owned copy of everything the watch face currently shows.

use heapless::String;

use crate::sink::{DisplayError, DisplaySink, FieldId, FIELD_COUNT};

/// Maximum bytes kept per field
pub const MAX_FIELD_LEN: usize = 256;

/// Display state owned by the application context
///
/// Replaces per-field global text handles: every field's text lives
/// here, along with how many times it was written and whether anything
/// changed since the renderer last looked.
#[derive(Clone)]
pub struct DisplayModel {
    /// Current text per field
    texts: [String<MAX_FIELD_LEN>; FIELD_COUNT],
    /// Fields present in the layout
    enabled: [bool; FIELD_COUNT],
    /// Number of writes per field
    writes: [u32; FIELD_COUNT],
    /// Whether the renderer needs to redraw
    dirty: bool,
}

impl Default for DisplayModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayModel {
    /// Create a model with every field enabled
    pub fn new() -> Self {
        Self::with_fields(&FieldId::ALL)
    }

    /// Create a model for a layout showing only `fields`
    pub fn with_fields(fields: &[FieldId]) -> Self {
        let mut enabled = [false; FIELD_COUNT];
        for field in fields {
            enabled[field.index()] = true;
        }
        Self {
            texts: core::array::from_fn(|_| String::new()),
            enabled,
            writes: [0; FIELD_COUNT],
            dirty: false,
        }
    }

    /// Check if the layout shows a field
    pub fn has_field(&self, field: FieldId) -> bool {
        self.enabled[field.index()]
    }

    /// Get the text of a field
    pub fn text(&self, field: FieldId) -> Option<&str> {
        if self.has_field(field) {
            Some(self.texts[field.index()].as_str())
        } else {
            None
        }
    }

    /// Number of times a field was written
    pub fn write_count(&self, field: FieldId) -> u32 {
        self.writes[field.index()]
    }

    /// Number of writes across all fields
    pub fn total_writes(&self) -> u32 {
        self.writes.iter().sum()
    }

    /// Check if the model changed since the last `mark_clean`
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the model as clean (after rendering)
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Iterate over enabled fields and their text
    pub fn fields(&self) -> impl Iterator<Item = (FieldId, &str)> {
        FieldId::ALL
            .into_iter()
            .filter(|field| self.has_field(*field))
            .map(|field| (field, self.texts[field.index()].as_str()))
    }
}

/// Longest prefix of `text` that fits `max` bytes without splitting a character
fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

impl DisplaySink for DisplayModel {
    fn set_field_text(&mut self, field: FieldId, text: &str) -> Result<(), DisplayError> {
        if !self.has_field(field) {
            return Err(DisplayError::UnknownField);
        }

        let slot = &mut self.texts[field.index()];
        slot.clear();
        // Cannot fail, truncate() keeps the text within capacity
        let _ = slot.push_str(truncate(text, MAX_FIELD_LEN));

        self.writes[field.index()] = self.writes[field.index()].saturating_add(1);
        self.dirty = true;
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DisplayModel {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "DisplayModel[");
        for (i, (field, text)) in self.fields().enumerate() {
            if i > 0 {
                defmt::write!(f, ", ");
            }
            defmt::write!(f, "{}={}", field, text);
        }
        defmt::write!(f, "]");
    }
}
