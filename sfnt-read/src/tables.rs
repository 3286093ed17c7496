//! The tables this crate reads: `name`, `head` and `OS/2`.
//!
//! Each reader takes the table's directory record and bounds checks the
//! table against the file before touching its contents.

pub mod head;
pub mod name;
pub mod os2;
