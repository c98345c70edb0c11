//! Column domains and their byte encodings.

mod domain;

pub use domain::{decode_integer, encode_integer, trim_padding, Domain, INTEGER_WIDTH};
