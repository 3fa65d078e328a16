//! Commented manifest sections

/// Width of the `#` border around section headers
pub const BORDER_WIDTH: usize = 80;

/// Maximum header text per line (border width minus `# ` and slack)
const WRAP_WIDTH: usize = BORDER_WIDTH - 4;

/// A titled block of rendered manifest lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestSection {
    title: String,
    lines: Vec<String>,
}

impl ManifestSection {
    /// An empty title still produces the two border lines
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Render the header and body, or `None` when there is nothing to show
    pub fn render(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let mut out = vec![comment_block(&self.title), String::new()];
        out.extend(self.lines.iter().cloned());
        Some(out.join("\n"))
    }
}

fn comment_block(title: &str) -> String {
    let border = "#".repeat(BORDER_WIDTH);
    let mut block = vec![border.clone()];
    block.extend(wrap(title, WRAP_WIDTH).into_iter().map(|l| format!("# {}", l)));
    block.push(border);
    block.join("\n")
}

/// Greedy word wrap; words longer than `width` are split
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(word.drain(..width).collect());
        }
        let word: String = word.into_iter().collect();
        if word.is_empty() {
            continue;
        }

        if current.is_empty() {
            current = word;
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(&word);
        } else {
            lines.push(std::mem::replace(&mut current, word));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
