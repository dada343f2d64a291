//! Tuning options for the heuristic extraction engine.
//!
//! `ExtractOptions` carries every threshold the noise filter, content locator,
//! structured extractor and normalizer consult. The defaults are the values
//! the engine is calibrated against; tests override individual fields.

/// Thresholds for content identification and extraction.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use story_extractor::ExtractOptions;
///
/// let options = ExtractOptions {
///     min_content_length: 300,
///     ..ExtractOptions::default()
/// };
/// assert_eq!(options.min_paragraphs, 2);
/// ```
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Minimum visible text length (characters) a located region must exceed.
    ///
    /// Default: `500`
    pub min_content_length: usize,

    /// Minimum paragraph elements a selector candidate must contain.
    ///
    /// Default: `2`
    pub min_paragraphs: usize,

    /// Minimum direct paragraph children for the density scan.
    ///
    /// Default: `3`
    pub density_min_paragraphs: usize,

    /// Score floor a density-scan winner must exceed.
    ///
    /// Score is `100 * paragraphs + paragraph text length`.
    ///
    /// Default: `500`
    pub density_min_score: usize,

    /// Leaf text shorter than this is checked against the noise phrases.
    ///
    /// Default: `50`
    pub noise_text_max_len: usize,

    /// Anchor text shorter than this is checked for navigational phrasing.
    ///
    /// Default: `30`
    pub nav_link_max_len: usize,

    /// A block quote must exceed this many characters to be kept.
    ///
    /// Default: `30`
    pub min_quote_len: usize,

    /// Headings shorter than this are skipped.
    ///
    /// Default: `3`
    pub min_heading_len: usize,

    /// Lines without a space must exceed this length to survive line filtering.
    ///
    /// Default: `25`
    pub min_line_len: usize,

    /// Reading speed used for the read-time estimate.
    ///
    /// Default: `225`
    pub words_per_minute: usize,

    /// A title prefix must exceed this length before a site suffix is cut.
    ///
    /// Default: `10`
    pub title_prefix_min_len: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            min_content_length: 500,
            min_paragraphs: 2,
            density_min_paragraphs: 3,
            density_min_score: 500,
            noise_text_max_len: 50,
            nav_link_max_len: 30,
            min_quote_len: 30,
            min_heading_len: 3,
            min_line_len: 25,
            words_per_minute: 225,
            title_prefix_min_len: 10,
        }
    }
}
