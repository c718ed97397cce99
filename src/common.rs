pub mod dates;
pub mod error;
pub mod extract;
pub mod validation;
pub(crate) mod db_utils;
