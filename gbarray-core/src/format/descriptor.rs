//! Per-call execution options

/// Execution options for one engine call
///
/// Built fresh for every call; the engine never retains it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Descriptor {
    /// Clear output positions the mask does not select
    pub replace_output: bool,
    /// Select by mask pattern only, ignoring mask values
    pub structural_mask: bool,
    /// Use the complement of the mask
    pub complement_mask: bool,
    /// Read the first input transposed
    pub transpose_input0: bool,
}

impl Descriptor {
    /// Descriptor with every flag off
    pub const fn new() -> Self {
        Self {
            replace_output: false,
            structural_mask: false,
            complement_mask: false,
            transpose_input0: false,
        }
    }

    /// Set replace semantics
    pub const fn with_replace(mut self, replace: bool) -> Self {
        self.replace_output = replace;
        self
    }

    /// Set structural masking
    pub const fn with_structural_mask(mut self, structural: bool) -> Self {
        self.structural_mask = structural;
        self
    }

    /// Set mask complement
    pub const fn with_complement_mask(mut self, complement: bool) -> Self {
        self.complement_mask = complement;
        self
    }

    /// Set transpose-on-read of the first input
    pub const fn with_transpose_input0(mut self, transpose: bool) -> Self {
        self.transpose_input0 = transpose;
        self
    }

    /// Resolve a mask entry to "may write" under this descriptor
    ///
    /// `entry` is `None` when the mask has no stored value at the position,
    /// otherwise the truthiness of the stored value. A missing mask selects
    /// everything.
    pub const fn mask_allows(&self, entry: Option<bool>, has_mask: bool) -> bool {
        let selected = if !has_mask {
            true
        } else {
            match entry {
                None => false,
                Some(truthy) => self.structural_mask || truthy,
            }
        };
        selected != (has_mask && self.complement_mask)
    }
}
