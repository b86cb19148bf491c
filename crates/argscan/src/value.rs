//! Typed destinations for option values.
//!
//! A destination's type decides how an option consumes the argument stream.
//! [`Value::slot`] maps it onto one of a small, closed set of kinds:
//!
//! - `bool` is a [`Slot::Flag`]: it takes no value and is set to `true`
//! - `String` is a [`Slot::Text`]: it takes the rest of the current token or the next token
//! - numbers, `char` and `PathBuf` are [`Slot::Convert`]: text, then `FromStr`
//! - `Vec<T>` is a [`Slot::List`]: each occurrence appends one `T` and fills it
//!
//! `Option<T>` borrows the kind of `T` and is set to `Some` on first use.

use std::path::PathBuf;

/// How an option writes into its destination.
pub enum Slot<'s> {
    Flag(&'s mut bool),
    Text(&'s mut String),
    Convert(&'s mut dyn Convert),
    List(&'s mut dyn Accumulate),
}

/// A type that can be registered as an option destination.
pub trait Value {
    fn slot(&mut self) -> Slot<'_>;
}

/// A destination filled by parsing a single text value.
pub trait Convert {
    /// Replace the current value with `raw` parsed, or describe why it failed.
    fn convert(&mut self, raw: &str) -> Result<(), String>;
}

/// A growable destination: every occurrence of the option adds one element.
pub trait Accumulate {
    /// Append a default element and return its slot.
    fn push_slot(&mut self) -> Slot<'_>;
}

impl Value for bool {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Flag(self)
    }
}

impl Value for String {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Text(self)
    }
}

impl<T: Value + Default> Value for Vec<T> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::List(self)
    }
}

impl<T: Value + Default> Accumulate for Vec<T> {
    fn push_slot(&mut self) -> Slot<'_> {
        let at = self.len();
        self.push(T::default());
        self[at].slot()
    }
}

impl<T: Value + Default> Value for Option<T> {
    fn slot(&mut self) -> Slot<'_> {
        self.get_or_insert_with(T::default).slot()
    }
}

macro_rules! convert_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Value for $ty {
                fn slot(&mut self) -> Slot<'_> {
                    Slot::Convert(self)
                }
            }

            impl Convert for $ty {
                fn convert(&mut self, raw: &str) -> Result<(), String> {
                    *self = raw.parse::<$ty>().map_err(|e| e.to_string())?;
                    Ok(())
                }
            }
        )*
    };
}

convert_value!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char, PathBuf,
);
