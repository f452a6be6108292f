use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

use crate::player_id::PlayerCandidate;

/// Picks one candidate out of an ambiguous resolution.
/// Returns the candidate's roster index, or `None` when cancelled.
pub trait CandidateSelector {
    fn select(&mut self, candidates: &[PlayerCandidate]) -> io::Result<Option<usize>>;
}

/// Interactive numbered menu. Re-prompts until a valid ordinal or an empty line.
pub struct ConsoleSelector<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleSelector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl ConsoleSelector<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> CandidateSelector for ConsoleSelector<R, W> {
    fn select(&mut self, candidates: &[PlayerCandidate]) -> io::Result<Option<usize>> {
        if candidates.is_empty() {
            return Ok(None);
        }

        writeln!(
            self.output,
            "\nMultiple players match your query. Please choose one:"
        )?;
        for (k, c) in candidates.iter().enumerate() {
            writeln!(self.output, "{}", candidate_line(k + 1, c))?;
        }

        loop {
            write!(self.output, "Enter number (or press Enter to cancel): ")?;
            self.output.flush()?;

            let mut line = String::new();
            // EOF cancels.
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let choice = line.trim();
            if choice.is_empty() {
                return Ok(None);
            }
            if let Some(c) = parse_ordinal(choice, candidates.len()).map(|n| &candidates[n - 1]) {
                return Ok(Some(c.idx));
            }
            writeln!(self.output, "Invalid choice. Try again.")?;
        }
    }
}

/// Non-interactive: always the first candidate in dataset order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PickFirst;

impl CandidateSelector for PickFirst {
    fn select(&mut self, candidates: &[PlayerCandidate]) -> io::Result<Option<usize>> {
        Ok(candidates.first().map(|c| c.idx))
    }
}

/// Non-interactive: never picks.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysCancel;

impl CandidateSelector for AlwaysCancel {
    fn select(&mut self, _candidates: &[PlayerCandidate]) -> io::Result<Option<usize>> {
        Ok(None)
    }
}

pub fn candidate_line(ordinal: usize, c: &PlayerCandidate) -> String {
    let age = c.age.map(|a| format!(", Age={a}")).unwrap_or_default();
    format!(
        "{ordinal}) {} | {} | {} | {}{age}",
        c.player, c.squad, c.comp, c.pos
    )
}

fn parse_ordinal(raw: &str, len: usize) -> Option<usize> {
    if !raw.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    raw.parse::<usize>().ok().filter(|n| (1..=len).contains(n))
}
