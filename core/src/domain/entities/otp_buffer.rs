//! In-progress code input for an OTP session.

use serde::{Deserialize, Serialize};

use crate::errors::OtpError;

/// Length of the verification code
pub const CODE_LENGTH: usize = 6;

/// Digits typed or pasted so far, one optional slot per code position.
///
/// The buffer has no idea where its input came from; keyboard entry and
/// clipboard/SMS autofill end up in the same slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpBuffer {
    slots: Vec<Option<char>>,
}

impl OtpBuffer {
    /// Creates an empty buffer for a code of `code_length` digits
    pub fn new(code_length: usize) -> Self {
        Self {
            slots: vec![None; code_length],
        }
    }

    /// Number of positions in the code
    pub fn code_length(&self) -> usize {
        self.slots.len()
    }

    /// Writes `digit` at `index`, overwriting whatever was there
    ///
    /// # Arguments
    ///
    /// * `index` - Zero-based position, must be below the code length
    /// * `digit` - A single ASCII numeral
    ///
    /// # Returns
    ///
    /// `Err(OtpError)` with a format error if either argument is invalid; the
    /// buffer is left untouched in that case
    pub fn set_digit(&mut self, index: usize, digit: char) -> Result<(), OtpError> {
        self.check_index(index)?;
        if !digit.is_ascii_digit() {
            return Err(OtpError::InvalidDigit { digit });
        }
        self.slots[index] = Some(digit);
        Ok(())
    }

    /// Empties the position at `index`
    pub fn clear_digit(&mut self, index: usize) -> Result<(), OtpError> {
        self.check_index(index)?;
        self.slots[index] = None;
        Ok(())
    }

    /// Fills the buffer from pasted or autofilled text
    ///
    /// Looks for the first run of at least `code_length` contiguous ASCII
    /// digits and copies its first `code_length` digits in, replacing any
    /// previous content. Text without such a run leaves the buffer unchanged.
    ///
    /// # Returns
    ///
    /// `true` if the buffer was populated
    pub fn ingest_paste(&mut self, raw_text: &str) -> bool {
        match find_code_run(raw_text, self.code_length()) {
            Some(digits) => {
                for (slot, digit) in self.slots.iter_mut().zip(digits) {
                    *slot = Some(digit);
                }
                true
            }
            None => false,
        }
    }

    /// True iff every position is filled
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Number of filled positions
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// The assembled code, once every position is filled
    pub fn code(&self) -> Option<String> {
        self.slots.iter().copied().collect()
    }

    /// Slot contents in order
    pub fn digits(&self) -> &[Option<char>] {
        &self.slots
    }

    /// Resets every position to empty
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    fn check_index(&self, index: usize) -> Result<(), OtpError> {
        if index >= self.code_length() {
            return Err(OtpError::IndexOutOfRange {
                index,
                code_length: self.code_length(),
            });
        }
        Ok(())
    }
}

impl Default for OtpBuffer {
    fn default() -> Self {
        Self::new(CODE_LENGTH)
    }
}

fn find_code_run(raw_text: &str, code_length: usize) -> Option<Vec<char>> {
    if code_length == 0 {
        return None;
    }
    let mut run = Vec::with_capacity(code_length);
    for c in raw_text.chars() {
        if c.is_ascii_digit() {
            run.push(c);
            if run.len() == code_length {
                return Some(run);
            }
        } else {
            run.clear();
        }
    }
    None
}
