//! Debug string options

/// Controls how much detail metadata debug strings include
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebugStringOptions {
    /// Render only the header line
    pub single_line: bool,

    /// Append the annotations block
    pub include_annotations: bool,
}

impl DebugStringOptions {
    /// Header plus nested members
    pub const SHORT_DEFAULT: Self = Self {
        single_line: false,
        include_annotations: false,
    };

    /// Header only
    pub const SINGLE_LINE_DEFAULT: Self = Self {
        single_line: true,
        include_annotations: false,
    };

    /// Everything, including annotations
    pub const LONG_DEFAULT: Self = Self {
        single_line: false,
        include_annotations: true,
    };

    /// Toggle annotations
    #[inline]
    #[must_use]
    pub const fn with_annotations(mut self, include: bool) -> Self {
        self.include_annotations = include;
        self
    }
}
