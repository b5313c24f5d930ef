//! Shared test helpers.

use core::cell::RefCell;
use core::fmt;
use std::string::String;
use std::vec::Vec;

use crate::hw::Console;

/// Console that records every line for assertions.
pub struct Capture<'a>(pub &'a RefCell<Vec<String>>);

impl Console for Capture<'_> {
    fn line(&mut self, args: fmt::Arguments) {
        self.0.borrow_mut().push(format!("{args}"));
    }
}
