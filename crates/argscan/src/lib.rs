//! Register typed destinations for command-line options, then scan argv in place.
//!
//! ```
//! use argscan::OptionParser;
//!
//! let mut verbose = false;
//! let mut output = String::new();
//! let mut tags: Vec<String> = Vec::new();
//! let mut args: Vec<String> = ["prog", "-v", "in.txt", "--output", "out.txt", "-tdraft"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//!
//! let mut parser = OptionParser::new();
//! parser
//!     .set_banner("Usage: prog [OPTIONS] FILE")
//!     .register("v,verbose", &mut verbose, "Verbose output")
//!     .register("o,output", &mut output, "Output file")
//!     .register("t,tag", &mut tags, "Add a tag (repeatable)");
//! parser.parse(&mut args)?;
//! drop(parser);
//!
//! assert!(verbose);
//! assert_eq!(output, "out.txt");
//! assert_eq!(tags, vec!["draft"]);
//! assert_eq!(args, vec!["prog", "in.txt"]);
//! # Ok::<(), argscan::ParseError>(())
//! ```
//!
//! Recognized options are removed from the vector; positional arguments
//! stay behind in their original order. `-h`/`--help` is added
//! automatically unless the caller registers those names.

mod cursor;
mod error;
pub mod help;
mod parser;
mod value;

pub use error::{ParseError, ParseResult};
pub use help::{DEFAULT_MAX_COLUMN_WIDTH, HelpConfig, HelpEntry};
pub use parser::OptionParser;
pub use value::{Accumulate, Convert, Slot, Value};
