//! Common small functions used throughout the crate
//!
//! These are left public for the convenience of the user. For example
//! generating evenly spaced grids or using prettier formatting for scientific
//! numbers.

use std::fmt::LowerExp;

// external crates
use itertools::Itertools;

// Alias for the format! macro out of laziness
pub use std::format as f;

/// Extends primitives with more specific formatting options
pub trait NumberFmt {
    /// Better scientific number formatting
    ///
    /// The default is not very consistent for scientific in particular, so this
    /// allows easy definition.
    ///
    /// Works for anything that can be represented as scientific using the
    /// LowerExp trait.
    ///
    /// ```rust
    /// # use meshtally::utils::NumberFmt;
    /// let number = -1.0;
    /// assert_eq!(number.sci(5, 2), "-1.00000e+00".to_string());
    /// assert_eq!((1.0).sci(5, 2), "1.00000e+00".to_string());
    /// ```
    fn sci(&self, precision: usize, exp_pad: usize) -> String;
}

impl<T: LowerExp> NumberFmt for T {
    fn sci(&self, precision: usize, exp_pad: usize) -> String {
        let num = f!("{:.precision$e}", &self, precision = precision);
        // LowerExp always writes an 'e', fall back to the raw string regardless
        let Some(split) = num.find('e') else {
            return num;
        };
        let (mantissa, exp) = num.split_at(split);
        // Make sure the exponent is signed
        let (sign, exp) = match exp.strip_prefix("e-") {
            Some(exp) => ('-', exp),
            None => ('+', &exp[1..]),
        };
        // Pad the exponent with zeros if needed and put it back on the number
        f!("{mantissa}e{sign}{exp:0>pad$}", pad = exp_pad)
    }
}

/// Shortest text that parses back to exactly the same `f64`
///
/// Used for every float written to a tally document so that files re-export
/// byte for byte.
///
/// ```rust
/// # use meshtally::utils::fmt_float;
/// assert_eq!(fmt_float(-10.0), "-10");
/// assert_eq!(fmt_float(0.025), "0.025");
/// assert_eq!(fmt_float(0.025).parse::<f64>().unwrap(), 0.025);
/// ```
pub fn fmt_float(value: f64) -> String {
    f!("{value}")
}

/// Space separated list of floats using [fmt_float]
///
/// ```rust
/// # use meshtally::utils::join_floats;
/// assert_eq!(join_floats(&[0.0, 0.5, 1.0]), "0 0.5 1");
/// ```
pub fn join_floats(values: &[f64]) -> String {
    values.iter().map(|v| fmt_float(*v)).join(" ")
}

/// Check that every value is finite and larger than the one before it
///
/// ```rust
/// # use meshtally::utils::is_strictly_increasing;
/// assert!(is_strictly_increasing(&[0.0, 1.0, 2.5]));
/// assert!(!is_strictly_increasing(&[0.0, 1.0, 1.0]));
/// assert!(!is_strictly_increasing(&[0.0, f64::NAN]));
/// ```
pub fn is_strictly_increasing(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite()) && values.windows(2).all(|w| w[0] < w[1])
}

/// Evenly spaced values over a closed interval
///
/// Endpoints are included and exact, which matters for grid boundaries that
/// are compared against 0 and 2pi.
///
/// ```rust
/// # use meshtally::utils::linspace;
/// assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
/// assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
/// ```
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut values: Vec<f64> = (0..num).map(|i| start + step * i as f64).collect();
            values[num - 1] = stop;
            values
        }
    }
}
