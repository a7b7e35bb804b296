//! Secret codes typed anywhere on the page

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecretCode {
    /// Unlock every achievement
    GodMode,
    /// Wipe all stored progress
    Reset,
    /// Matrix rain overlay
    Matrix,
    /// Confetti burst
    Party,
}

impl SecretCode {
    pub const ALL: [SecretCode; 4] = [
        SecretCode::GodMode,
        SecretCode::Reset,
        SecretCode::Matrix,
        SecretCode::Party,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SecretCode::GodMode => "godmode",
            SecretCode::Reset => "reset",
            SecretCode::Matrix => "matrix",
            SecretCode::Party => "party",
        }
    }
}

impl fmt::Display for SecretCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown secret code `{0}`")]
pub struct UnknownSecretCode(pub String);

impl FromStr for SecretCode {
    type Err = UnknownSecretCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        SecretCode::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| UnknownSecretCode(s.to_string()))
    }
}

/// Rolling buffer of recent keystrokes
#[derive(Debug, Clone)]
pub struct SecretBuffer {
    chars: VecDeque<char>,
    capacity: usize,
}

impl Default for SecretBuffer {
    fn default() -> Self {
        let capacity = SecretCode::ALL
            .iter()
            .map(|c| c.as_str().len())
            .max()
            .unwrap_or(0);
        Self {
            chars: VecDeque::with_capacity(capacity),
            capacity,
        }
    }
}

impl SecretBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one key. Non-letters are ignored. Returns the code completed by
    /// this key, if any, and clears the buffer when one matches.
    pub fn push(&mut self, key: char) -> Option<SecretCode> {
        if !key.is_ascii_alphabetic() {
            return None;
        }
        if self.chars.len() == self.capacity {
            self.chars.pop_front();
        }
        self.chars.push_back(key.to_ascii_lowercase());

        let typed: String = self.chars.iter().collect();
        let code = SecretCode::ALL
            .into_iter()
            .find(|c| typed.ends_with(c.as_str()))?;
        self.chars.clear();
        Some(code)
    }

    pub fn clear(&mut self) {
        self.chars.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(buffer: &mut SecretBuffer, text: &str) -> Vec<SecretCode> {
        text.chars().filter_map(|c| buffer.push(c)).collect()
    }

    #[test]
    fn test_parse_codes() {
        assert_eq!("godmode".parse::<SecretCode>(), Ok(SecretCode::GodMode));
        assert_eq!(" RESET ".parse::<SecretCode>(), Ok(SecretCode::Reset));
        assert_eq!(
            "sudo".parse::<SecretCode>(),
            Err(UnknownSecretCode("sudo".to_string()))
        );
    }

    #[test]
    fn test_buffer_detects_code_in_stream() {
        let mut buffer = SecretBuffer::new();
        assert_eq!(type_str(&mut buffer, "xxgodMode"), vec![SecretCode::GodMode]);
        assert_eq!(type_str(&mut buffer, "mat-rix"), vec![SecretCode::Matrix]);
        assert_eq!(type_str(&mut buffer, "hello world"), vec![]);
    }

    #[test]
    fn test_buffer_clears_after_match() {
        let mut buffer = SecretBuffer::new();
        assert_eq!(type_str(&mut buffer, "party"), vec![SecretCode::Party]);
        // "arty" alone must not re-trigger
        assert_eq!(type_str(&mut buffer, "y"), vec![]);
    }
}
