//! Shared helper functions for CLI commands.

use std::io::{self, BufRead, Write};

use indicatif::ProgressStyle;

/// Warning shown before the destination tables are cleared.
pub const DESTRUCTION_WARNING: &str = "\nAtenção! \n\
Esse script irá apagar todos os dados das tabelas valor_lawsuits, valor_lawsuit_folders \
e todos os attachments vinculados à essas tabelas. \n\
Deseja continuar? [s/N] ";

/// Ask the operator to confirm the purge. Only the exact answer `s` proceeds.
pub fn confirm_destruction<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<bool> {
    write!(output, "{}", DESTRUCTION_WARNING)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim_end_matches(['\n', '\r']);

    Ok(answer == "s")
}

/// Style for the single-line migration progress bar.
pub fn migration_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░")
}

/// Truncate a string for display, appending `...` when cut.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(input: &str) -> bool {
        let mut output = Vec::new();
        confirm_destruction(&mut input.as_bytes(), &mut output).unwrap()
    }

    #[test]
    fn test_only_exact_s_confirms() {
        assert!(answer("s\n"));
        assert!(answer("s\r\n"));
        assert!(answer("s"));

        assert!(!answer("S\n"));
        assert!(!answer("sim\n"));
        assert!(!answer(" s\n"));
        assert!(!answer("y\n"));
        assert!(!answer("\n"));
        assert!(!answer(""));
    }

    #[test]
    fn test_prompt_names_the_tables() {
        let mut output = Vec::new();
        confirm_destruction(&mut "n\n".as_bytes(), &mut output).unwrap();
        let prompt = String::from_utf8(output).unwrap();

        assert!(prompt.contains("valor_lawsuits"));
        assert!(prompt.contains("valor_lawsuit_folders"));
        assert!(prompt.contains("attachments"));
        assert!(prompt.ends_with("[s/N] "));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Processo número 123", 10), "Process...");
    }
}
