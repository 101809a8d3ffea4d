//! Condition Module
//!
//! Filter conditions shared by the condition editor and the query builder.
//!
//! # Variants
//!
//! ## Parent conditions
//! A field on the primary object compared with a value:
//! ```text
//! Name = 'Acme'
//! AnnualRevenue > 1000000
//! Industry IN ('Technology', 'Retail')
//! ```
//!
//! ## Child conditions
//! A field on a child relationship, always compared with `=`. These are
//! collected per relationship and end up inside the relationship's subquery:
//! ```text
//! (SELECT Email FROM Contacts WHERE Email = 'x@y.com')
//! ```
//!
//! ## Operator catalog
//! Operators carry a tag list of the field data types they apply to; the
//! condition line only offers operators whose tags contain the field's type.

mod operator;
mod types;

pub use operator::{filter_operators, Operator, OperatorOption};
pub use types::{quote, ChildTarget, Condition, ConditionTarget};
