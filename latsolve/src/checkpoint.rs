//! The checkpoint text format.
//!
//! A checkpoint is a single text file holding everything a run needs to
//! continue: the options header, the elapsed timer, the state tuple of the
//! engine, and the full lattice with its column properties. Reading one back
//! validates that the stored precision matches the integer type of the
//! resuming process, a run must not silently continue with a narrower type.

use std::io::Write;

use itertools::Itertools;

use crate::controller::CheckpointView;
use crate::error::{Error, Result};
use crate::lattice::Lattice;
use crate::matrix::VectorArray;
use crate::options::{Options, Variant};
use crate::rings::{Int, Precision};
use crate::system::VariableProperty;

/// Everything needed to reconstruct an equivalent engine.
pub struct ResumeState<I> {
    pub current_variable: usize,
    pub sum_norm: I,
    pub first_norm: I,
    pub symmetric: bool,
    pub lattice: Lattice<I>,
}

/// A parsed checkpoint file.
pub struct Checkpoint<I> {
    pub options: Options,
    pub elapsed: u64,
    pub state: ResumeState<I>,
}

fn bound_token<I: Int>(bound: &Option<I>) -> String {
    match bound {
        Some(value) => value.to_string(),
        None => "*".to_string(),
    }
}

/// Serializes the options, the timer and the full engine state.
pub fn write_checkpoint<I: Int, W: Write>(
    writer: &mut W,
    options: &Options,
    elapsed: u64,
    view: &CheckpointView<'_, I>,
) -> Result<()> {
    writeln!(
        writer,
        "{} {} {} {} {}",
        options.verbosity,
        options.log_level,
        options.backup_interval,
        options.variant.token(),
        I::precision().token(),
    )?;
    writeln!(writer, "{elapsed}")?;
    writeln!(
        writer,
        "{} {} {} {}",
        view.current_variable,
        view.sum_norm,
        view.first_norm,
        view.symmetric as u8,
    )?;

    let lattice = view.lattice;
    writeln!(
        writer,
        "{} {}",
        lattice.vectors.num_rows(),
        lattice.num_variables()
    )?;
    for property in &lattice.properties {
        writeln!(
            writer,
            "{} {} {} {}",
            property.column,
            property.free as u8,
            bound_token(&property.lower),
            bound_token(&property.upper),
        )?;
    }
    for row in lattice.vectors.rows() {
        writeln!(writer, "{}", row.iter().join(" "))?;
    }
    Ok(())
}

/// Token cursor over the checkpoint text.
struct Tokens<'a> {
    iter: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self { iter: text.split_whitespace() }
    }

    fn next(&mut self) -> Result<&'a str> {
        self.iter
            .next()
            .ok_or_else(|| Error::Parse("unexpected end of checkpoint".into()))
    }

    fn usize(&mut self) -> Result<usize> {
        let token = self.next()?;
        token
            .parse()
            .map_err(|_| Error::Parse(format!("invalid count `{token}`")))
    }

    fn u64(&mut self) -> Result<u64> {
        let token = self.next()?;
        token
            .parse()
            .map_err(|_| Error::Parse(format!("invalid number `{token}`")))
    }

    fn u32(&mut self) -> Result<u32> {
        let token = self.next()?;
        token
            .parse()
            .map_err(|_| Error::Parse(format!("invalid number `{token}`")))
    }

    fn i32(&mut self) -> Result<i32> {
        let token = self.next()?;
        token
            .parse()
            .map_err(|_| Error::Parse(format!("invalid column id `{token}`")))
    }

    fn int<I: Int>(&mut self) -> Result<I> {
        I::parse(self.next()?)
    }

    fn flag(&mut self) -> Result<bool> {
        match self.next()? {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(Error::Parse(format!("invalid flag `{other}`"))),
        }
    }

    fn bound<I: Int>(&mut self) -> Result<Option<I>> {
        let token = self.next()?;
        if token == "*" {
            Ok(None)
        } else {
            Ok(Some(I::parse(token)?))
        }
    }
}

/// Parses a checkpoint written by [`write_checkpoint`].
pub fn read_checkpoint<I: Int>(text: &str) -> Result<Checkpoint<I>> {
    let mut tokens = Tokens::new(text);

    let verbosity = tokens.u32()?;
    let log_level = tokens.u32()?;
    let backup_interval = tokens.u64()?;
    let variant = Variant::from_token(tokens.next()?)?;
    let precision = Precision::from_token(tokens.next()?)?;
    if precision != I::precision() {
        return Err(Error::Inconsistent(format!(
            "checkpoint was written with precision {} but the run uses {}",
            precision.token(),
            I::precision().token()
        )));
    }
    let options = Options { verbosity, log_level, backup_interval, variant, precision };

    let elapsed = tokens.u64()?;

    let current_variable = tokens.usize()?;
    let sum_norm = tokens.int()?;
    let first_norm = tokens.int()?;
    let symmetric = tokens.flag()?;

    let rows = tokens.usize()?;
    let variables = tokens.usize()?;

    let mut properties = Vec::with_capacity(variables);
    for _ in 0..variables {
        let column = tokens.i32()?;
        let free = tokens.flag()?;
        let lower = tokens.bound()?;
        let upper = tokens.bound()?;
        if free && (lower.is_some() || upper.is_some()) {
            return Err(Error::Inconsistent(
                "a free column cannot carry bounds".into(),
            ));
        }
        properties.push(VariableProperty { column, free, lower, upper });
    }

    let mut vectors = VectorArray::new(variables);
    for _ in 0..rows {
        let mut row = Vec::with_capacity(variables);
        for _ in 0..variables {
            row.push(tokens.int()?);
        }
        vectors.append_row(row);
    }

    if tokens.iter.next().is_some() {
        return Err(Error::Parse("trailing data in checkpoint".into()));
    }

    Ok(Checkpoint {
        options,
        elapsed,
        state: ResumeState {
            current_variable,
            sum_norm,
            first_norm,
            symmetric,
            lattice: Lattice::new(vectors, properties),
        },
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::system::Sign;

    fn sample_lattice() -> Lattice<i64> {
        let vectors = VectorArray::from_rows(3, vec![vec![1, -2, 0], vec![0, 3, -1]]);
        let properties = vec![
            VariableProperty::from_sign(0, Sign::NonNegative),
            VariableProperty::from_sign(1, Sign::TwoSided),
            VariableProperty::bounded(2, Some(-4), Some(4)),
        ];
        Lattice::new(vectors, properties)
    }

    #[test]
    fn round_trip() {
        let lattice = sample_lattice();
        let options = Options {
            verbosity: 2,
            log_level: 1,
            backup_interval: 60,
            variant: Variant::Hilbert,
            precision: Precision::Int64,
        };
        let view = CheckpointView {
            current_variable: 1,
            sum_norm: &5i64,
            first_norm: &2i64,
            symmetric: true,
            lattice: &lattice,
        };

        let mut buffer = Vec::new();
        write_checkpoint(&mut buffer, &options, 1234, &view).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let checkpoint: Checkpoint<i64> = read_checkpoint(&text).unwrap();

        assert_eq!(checkpoint.options, options);
        assert_eq!(checkpoint.elapsed, 1234);
        assert_eq!(checkpoint.state.current_variable, 1);
        assert_eq!(checkpoint.state.sum_norm, 5);
        assert_eq!(checkpoint.state.first_norm, 2);
        assert!(checkpoint.state.symmetric);
        assert_eq!(checkpoint.state.lattice.properties, lattice.properties);
        assert_eq!(checkpoint.state.lattice.vectors, lattice.vectors);
    }

    #[test]
    fn precision_mismatch_is_rejected() {
        let lattice = sample_lattice();
        let options = Options::default();
        let view = CheckpointView {
            current_variable: 0,
            sum_norm: &0i64,
            first_norm: &0i64,
            symmetric: true,
            lattice: &lattice,
        };
        let mut buffer = Vec::new();
        write_checkpoint(&mut buffer, &options, 0, &view).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        // the checkpoint records 64 bit precision
        assert!(matches!(
            read_checkpoint::<i32>(&text),
            Err(Error::Inconsistent(_))
        ));
    }

    #[test]
    fn truncated_checkpoint_is_rejected() {
        assert!(matches!(
            read_checkpoint::<i64>("1 1 0 hilbert 64\n12\n0 0"),
            Err(Error::Parse(_))
        ));
    }
}
