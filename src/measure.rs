use serde::Deserialize;
use unicode_width::UnicodeWidthStr;

/// Table node box sizes. Width is fixed, height grows with the column count.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeMetrics {
    pub width: f64,
    pub header_height: f64,
    pub row_height: f64,
    pub padding: f64,
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self {
            width: 260.0,
            header_height: 45.0,
            row_height: 36.0,
            padding: 20.0,
        }
    }
}

impl NodeMetrics {
    pub fn height(&self, column_count: usize) -> f64 {
        self.header_height + column_count as f64 * self.row_height + self.padding
    }

    pub fn node_size(&self, column_count: usize) -> (f64, f64) {
        (self.width, self.height(column_count))
    }
}

/// Metrics for edge label boxes.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextMetrics {
    pub char_width: f64,
    pub line_height: f64,
    pub padding_x: f64,
    pub padding_y: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            line_height: 16.0,
            padding_x: 6.0,
            padding_y: 3.0,
        }
    }
}

impl TextMetrics {
    pub fn text_width(&self, text: &str) -> f64 {
        let width = UnicodeWidthStr::width(text);
        width as f64 * self.char_width
    }

    pub fn label_size(&self, text: &str) -> (f64, f64) {
        (
            self.text_width(text) + self.padding_x * 2.0,
            self.line_height + self.padding_y * 2.0,
        )
    }
}
