//! scalc is a tiny calculator language with lexically scoped variables.
//!
//! ```
//! use scalc::{run, Printed};
//!
//! let output = run("x = 1 + 2 * 10; y = (1+2) * 10; print(x); print(y);").unwrap();
//! assert_eq!(output, vec![Printed::Int(21.into()), Printed::Int(30.into())]);
//! ```

pub mod lang;

pub use lang::error::Error;
pub use lang::runtime::{run, Runtime};
pub use lang::value::Printed;
