//! Interactive prompts for category and paper count.
//!
//! Generic over the reader and writer so the binary can hand in stdin/stdout
//! and tests can hand in byte buffers.

use crate::config::DEFAULT_MAX_RESULTS;
use crate::error::Result;
use std::io::{BufRead, Write};

/// Categories shown in the banner
pub const POPULAR_CATEGORIES: &[(&str, &str)] = &[
    ("cs.CL", "Computation and Language"),
    ("cs.AI", "Artificial Intelligence"),
    ("cs.CV", "Computer Vision"),
    ("cs.LG", "Machine Learning"),
    ("math.PR", "Probability"),
    ("physics", "All physics"),
];

const RULE_WIDTH: usize = 80;

/// How a count answer was understood
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountAnswer {
    /// Blank line
    Default,
    Value(usize),
    /// An integer below 1
    NotPositive,
    /// Not an integer at all
    Invalid,
}

/// Classify one line typed at the count prompt.
pub fn parse_count(input: &str) -> CountAnswer {
    let input = input.trim();
    if input.is_empty() {
        return CountAnswer::Default;
    }
    match input.parse::<i64>() {
        Ok(n) if n < 1 => CountAnswer::NotPositive,
        Ok(n) => usize::try_from(n)
            .map(CountAnswer::Value)
            .unwrap_or(CountAnswer::Invalid),
        Err(_) => CountAnswer::Invalid,
    }
}

/// Line-oriented prompter
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Title and popular categories
    pub fn banner(&mut self) -> Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(self.output, "\n{}", rule)?;
        writeln!(self.output, "arXiv Paper Abstract Scraper")?;
        writeln!(self.output, "{}", rule)?;
        writeln!(self.output, "\nThis tool scrapes arXiv papers and saves them to a JSON file.")?;
        writeln!(self.output, "You can specify an arXiv category and number of papers to fetch.")?;
        writeln!(self.output, "\nPopular categories:")?;
        for (code, name) in POPULAR_CATEGORIES {
            writeln!(self.output, "  - {} ({})", code, name)?;
        }
        writeln!(self.output, "{}", rule)?;
        Ok(())
    }

    /// Ask until a non-blank category is given.
    ///
    /// `None` when the user typed `q` or input ended.
    pub fn ask_category(&mut self) -> Result<Option<String>> {
        loop {
            let Some(line) = self.read_line("\nEnter arXiv category (e.g., cs.CL) or 'q' to quit: ")?
            else {
                return Ok(None);
            };
            let category = line.trim();
            if category.eq_ignore_ascii_case("q") {
                return Ok(None);
            }
            if !category.is_empty() {
                return Ok(Some(category.to_string()));
            }
            writeln!(self.output, "Please enter a valid category.")?;
        }
    }

    /// Ask for the number of papers.
    ///
    /// Blank or non-numeric answers fall back to the default; numbers below 1
    /// are asked again. `None` when input ended.
    pub fn ask_count(&mut self) -> Result<Option<usize>> {
        let prompt = format!(
            "Enter number of papers to fetch (default: {}): ",
            DEFAULT_MAX_RESULTS
        );
        loop {
            let Some(line) = self.read_line(&prompt)? else {
                return Ok(None);
            };
            match parse_count(&line) {
                CountAnswer::Default => return Ok(Some(DEFAULT_MAX_RESULTS)),
                CountAnswer::Value(n) => return Ok(Some(n)),
                CountAnswer::Invalid => {
                    writeln!(
                        self.output,
                        "'{}' is not a number, using the default of {}.",
                        line.trim(),
                        DEFAULT_MAX_RESULTS
                    )?;
                    return Ok(Some(DEFAULT_MAX_RESULTS));
                }
                CountAnswer::NotPositive => {
                    writeln!(self.output, "Please enter a number greater than 0.")?;
                }
            }
        }
    }

    /// Full interactive request: banner, category, then count.
    ///
    /// A `count` given up front skips the count prompt. `None` when the user
    /// quit or input ended.
    pub fn ask_request(&mut self, count: Option<usize>) -> Result<Option<(String, usize)>> {
        self.banner()?;
        let Some(category) = self.ask_category()? else {
            return Ok(None);
        };
        let count = match count {
            Some(count) => count,
            None => match self.ask_count()? {
                Some(count) => count,
                None => return Ok(None),
            },
        };
        Ok(Some((category, count)))
    }

    /// Yes/no question; anything but `y` is no.
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.read_line(&format!("{} (y/n): ", question))?;
        Ok(answer.is_some_and(|a| a.trim().eq_ignore_ascii_case("y")))
    }

    /// Print to the prompt's output
    pub fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}
