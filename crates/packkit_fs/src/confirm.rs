//! Operator confirmation of a planned mirror, kept apart from the tree walk.

use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

use crate::spec::SpecMirrorPlan;

/// Classified operator answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumConfirmAnswer {
    Yes,
    No,
    /// Anything else; the prompt repeats.
    Invalid,
}

/// Classify one input line. Surrounding whitespace and case are ignored.
pub fn parse_confirm_answer(line: &str) -> EnumConfirmAnswer {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => EnumConfirmAnswer::Yes,
        "n" | "no" => EnumConfirmAnswer::No,
        _ => EnumConfirmAnswer::Invalid,
    }
}

/// Render source, destination and the ordered mask list.
pub fn format_plan(spec_plan: &SpecMirrorPlan) -> String {
    let mut txt = String::new();
    let _ = writeln!(txt, "source:      {}", spec_plan.path_dir_src.display());
    let _ = writeln!(txt, "destination: {}", spec_plan.path_dir_dst.display());
    let _ = writeln!(txt, "masks:");
    for (n_idx, spec_mask) in spec_plan.masks.iter().enumerate() {
        let _ = writeln!(txt, "  {}. {spec_mask}", n_idx + 1);
    }
    txt
}

/// Decides whether a planned mirror may proceed.
pub trait PlanConfirmer {
    /// `Ok(false)` aborts the whole mirror before any mutation.
    ///
    /// # Errors
    /// Returns the underlying I/O error when the answer cannot be read.
    fn confirm(&mut self, spec_plan: &SpecMirrorPlan) -> io::Result<bool>;
}

/// Non-interactive confirmer that accepts every plan.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysConfirm;

impl PlanConfirmer for AlwaysConfirm {
    fn confirm(&mut self, _spec_plan: &SpecMirrorPlan) -> io::Result<bool> {
        Ok(true)
    }
}

/// Line-oriented prompt over any reader/writer pair.
///
/// End of input is treated as a refusal.
#[derive(Debug)]
pub struct StdioConfirmer<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> StdioConfirmer<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    #[cfg(test)]
    fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R: BufRead, W: Write> PlanConfirmer for StdioConfirmer<R, W> {
    fn confirm(&mut self, spec_plan: &SpecMirrorPlan) -> io::Result<bool> {
        write!(self.writer, "{}", format_plan(spec_plan))?;
        loop {
            write!(self.writer, "Proceed with copy? [y/n] ")?;
            self.writer.flush()?;

            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                writeln!(self.writer)?;
                return Ok(false);
            }
            match parse_confirm_answer(&line) {
                EnumConfirmAnswer::Yes => return Ok(true),
                EnumConfirmAnswer::No => return Ok(false),
                EnumConfirmAnswer::Invalid => {
                    writeln!(self.writer, "Please answer 'y' or 'n'.")?;
                }
            }
        }
    }
}
