use std::fmt;
use std::str::FromStr;

use crate::errors::Error;

/// Flags that modify how a pattern is matched.
///
/// Flags are usually created from a string like `"gim"`, where each
/// character enables one flag:
///
/// | Flag | Field         | Meaning                                       |
/// |------|---------------|-----------------------------------------------|
/// | `g`  | `global`      | Find every match, not only the first one.     |
/// | `i`  | `ignore_case` | Case-insensitive matching.                    |
/// | `m`  | `multiline`   | `^` and `$` match at line terminators.        |
/// | `s`  | `dot_all`     | `.` matches line terminators.                 |
/// | `u`  | `unicode`     | Unicode mode. Rejected when compiling.        |
/// | `y`  | `sticky`      | Match only at the position where it started.  |
///
/// ```
/// # use regex_stream::Flags;
/// let flags: Flags = "gi".parse().unwrap();
/// assert!(flags.global && flags.ignore_case);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Flags {
    pub global: bool,
    pub ignore_case: bool,
    pub multiline: bool,
    pub dot_all: bool,
    pub unicode: bool,
    pub sticky: bool,
}

impl Flags {
    /// Enables or disables the `g` flag.
    pub fn global(mut self, yes: bool) -> Self {
        self.global = yes;
        self
    }

    /// Enables or disables the `i` flag.
    pub fn ignore_case(mut self, yes: bool) -> Self {
        self.ignore_case = yes;
        self
    }

    /// Enables or disables the `m` flag.
    pub fn multiline(mut self, yes: bool) -> Self {
        self.multiline = yes;
        self
    }

    /// Enables or disables the `s` flag.
    pub fn dot_all(mut self, yes: bool) -> Self {
        self.dot_all = yes;
        self
    }

    /// Enables or disables the `y` flag.
    pub fn sticky(mut self, yes: bool) -> Self {
        self.sticky = yes;
        self
    }

    fn flag_mut(&mut self, c: char) -> Option<&mut bool> {
        match c {
            'g' => Some(&mut self.global),
            'i' => Some(&mut self.ignore_case),
            'm' => Some(&mut self.multiline),
            's' => Some(&mut self.dot_all),
            'u' => Some(&mut self.unicode),
            'y' => Some(&mut self.sticky),
            _ => None,
        }
    }
}

impl FromStr for Flags {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = Flags::default();
        for c in s.chars() {
            let flag = flags.flag_mut(c).ok_or(Error::InvalidFlag(c))?;
            if *flag {
                return Err(Error::DuplicateFlag(c));
            }
            *flag = true;
        }
        Ok(flags)
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (c, enabled) in [
            ('g', self.global),
            ('i', self.ignore_case),
            ('m', self.multiline),
            ('s', self.dot_all),
            ('u', self.unicode),
            ('y', self.sticky),
        ] {
            if enabled {
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}
