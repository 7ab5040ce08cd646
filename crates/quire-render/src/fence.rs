//! Line-level code fence tracking.
//!
//! The line scanners (heading extraction, container rewriting) work on raw
//! text rather than parser events, so they need to know when a line sits
//! inside a fenced code block.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenFence {
    marker: char,
    length: usize,
}

/// Tracks whether successive lines are inside a fenced code block.
#[derive(Debug, Clone, Copy, Default)]
pub struct FenceTracker {
    open: Option<OpenFence>,
}

impl FenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next line.
    ///
    /// Returns `true` when the line is part of a fence: the opening line,
    /// its contents, or the closing line.
    pub fn observe(&mut self, line: &str) -> bool {
        let Some(after_indent) = strip_fence_indent(line) else {
            return self.open.is_some();
        };

        match self.open {
            None => {
                if let Some(fence) = fence_marker(after_indent) {
                    // Backtick fences may not carry backticks in their info string.
                    let info = &after_indent[fence.length..];
                    if fence.marker == '`' && info.contains('`') {
                        return false;
                    }
                    self.open = Some(fence);
                    return true;
                }
                false
            }
            Some(open) => {
                if let Some(fence) = fence_marker(after_indent) {
                    let rest = &after_indent[fence.length..];
                    if fence.marker == open.marker
                        && fence.length >= open.length
                        && rest.trim().is_empty()
                    {
                        self.open = None;
                    }
                }
                true
            }
        }
    }
}

/// Strip up to three spaces of indentation; four or more is an indented
/// code block, never a fence.
fn strip_fence_indent(line: &str) -> Option<&str> {
    let spaces = line.bytes().take_while(|b| *b == b' ').count();
    if spaces > 3 || line[spaces..].starts_with('\t') {
        return None;
    }
    Some(&line[spaces..])
}

fn fence_marker(text: &str) -> Option<OpenFence> {
    let marker = text.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let length = text.chars().take_while(|c| *c == marker).count();
    (length >= 3).then_some(OpenFence { marker, length })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fenced_lines(input: &str) -> Vec<bool> {
        let mut tracker = FenceTracker::new();
        input.lines().map(|line| tracker.observe(line)).collect()
    }

    #[test]
    fn tracks_backtick_fence() {
        assert_eq!(
            fenced_lines("a\n```bash\n# comment\n```\nb"),
            vec![false, true, true, true, false]
        );
    }

    #[test]
    fn closer_must_match_marker_and_length() {
        assert_eq!(
            fenced_lines("````\n```\n~~~~\n````\nafter"),
            vec![true, true, true, true, false]
        );
    }

    #[test]
    fn closer_cannot_have_info_string() {
        let mut tracker = FenceTracker::new();
        tracker.observe("```");
        tracker.observe("```rust");
        assert!(tracker.observe("still code"));
    }

    #[test]
    fn indented_four_spaces_is_not_a_fence() {
        assert_eq!(fenced_lines("    ```\ntext"), vec![false, false]);
    }

    #[test]
    fn backticks_in_info_string_do_not_open() {
        assert_eq!(fenced_lines("``` a`b\ntext"), vec![false, false]);
    }

    #[test]
    fn unclosed_fence_runs_to_end() {
        assert_eq!(fenced_lines("~~~\none\ntwo"), vec![true, true, true]);
    }
}
