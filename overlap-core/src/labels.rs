/// Which input label is shown above which circle.
///
/// Fixed for the lifetime of a trial; `swapped` puts `label_2` on the left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelAssignment {
    label_1: String,
    label_2: String,
    swapped: bool,
}

impl LabelAssignment {
    pub fn new(label_1: impl Into<String>, label_2: impl Into<String>, swapped: bool) -> Self {
        Self {
            label_1: label_1.into(),
            label_2: label_2.into(),
            swapped,
        }
    }

    pub fn left(&self) -> &str {
        if self.swapped { &self.label_2 } else { &self.label_1 }
    }

    pub fn right(&self) -> &str {
        if self.swapped { &self.label_1 } else { &self.label_2 }
    }

    pub fn label_1(&self) -> &str {
        &self.label_1
    }

    pub fn label_2(&self) -> &str {
        &self.label_2
    }

    pub fn swapped(&self) -> bool {
        self.swapped
    }

    /// 0/1 swap flag as stored in the result record.
    pub fn order_indicator(&self) -> u8 {
        u8::from(self.swapped)
    }
}

/// Splits `text` into lines of at most `max_words_per_line` words.
///
/// Words are whitespace separated and re-joined with single spaces. A limit
/// of zero is treated as one word per line.
pub fn wrap_words(text: &str, max_words_per_line: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(max_words_per_line.max(1))
        .map(|chunk| chunk.join(" "))
        .collect()
}
