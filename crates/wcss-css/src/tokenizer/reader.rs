//! Character reader with one character of pushback.

/// Reads characters from a decoded stylesheet.
///
/// [`CharReader::unread`] steps back over the last character returned by
/// [`CharReader::read`]. Only one step is remembered.
#[derive(Debug, Clone)]
pub struct CharReader {
    input: Vec<char>,
    position: usize,
    can_unread: bool,
}

impl CharReader {
    /// Create a reader over `input`.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            can_unread: false,
        }
    }

    /// The next character, `None` at end of input.
    pub fn read(&mut self) -> Option<char> {
        let c = self.input.get(self.position).copied();
        self.can_unread = c.is_some();
        if c.is_some() {
            self.position += 1;
        }
        c
    }

    /// Push the last read character back.
    pub const fn unread(&mut self) {
        if self.can_unread {
            self.position -= 1;
            self.can_unread = false;
        }
    }

    /// True once every character has been read.
    pub fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unread_is_single_step() {
        let mut reader = CharReader::new("ab");
        assert_eq!(reader.read(), Some('a'));
        assert_eq!(reader.read(), Some('b'));
        reader.unread();
        reader.unread();
        assert_eq!(reader.read(), Some('b'));
        assert_eq!(reader.read(), None);
        reader.unread();
        assert_eq!(reader.read(), None);
        assert!(reader.is_at_end());
    }
}
