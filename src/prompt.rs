use crate::error::ScrapeError;
use crate::filter::{Selection, parse_extension_list, validate_max_count};
use crate::pipeline::SelectionPolicy;
use crate::sitemap::resolve_sitemap_url;
use std::io::{self, BufRead, Write};

/// Asks the operator questions on a line-oriented terminal
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompter bound to the process's stdin and stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `question` and read one trimmed line of answer
    fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            ));
        }
        Ok(line.trim().to_string())
    }

    fn say(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }

    /// Ask for the site or sitemap URL until a usable one is given
    pub fn site_target(&mut self) -> io::Result<String> {
        loop {
            let answer = self.ask(
                "Enter the website URL (e.g., https://example.com or https://example.com/sitemap.xml): ",
            )?;
            match resolve_sitemap_url(&answer) {
                Ok(_) => return Ok(answer),
                Err(e) => self.say(&format!("{}", e))?,
            }
        }
    }

    /// Ask how many pages to scrape, re-asking until the answer is in `1..=total`
    pub fn page_count(&mut self, total: usize) -> io::Result<usize> {
        loop {
            let answer = self.ask(&format!(
                "How many pages would you like to scrape? (Max: {}): ",
                total
            ))?;

            match answer.parse::<i64>() {
                Ok(n) if n >= 1 && validate_max_count(n as usize, total).is_ok() => {
                    return Ok(n as usize);
                }
                Ok(_) => self.say("Please enter a valid number within the range.")?,
                Err(_) => self.say("Invalid input. Please enter a numerical value.")?,
            }
        }
    }

    /// Ask whether to skip some file extensions, and which ones
    pub fn excluded_extensions(&mut self) -> io::Result<Vec<String>> {
        let choice = self
            .ask("Do you want to skip URLs with specific extensions? (e.g., .pdf, .jpg) [y/n]: ")?
            .to_lowercase();
        if choice != "y" && choice != "yes" {
            return Ok(Vec::new());
        }

        let answer =
            self.ask("Enter the extensions to skip (comma-separated, e.g., pdf,jpg,png): ")?;
        Ok(parse_extension_list(&answer))
    }
}

/// Selection policy that fills in missing choices by prompting.
///
/// Values preset from flags or config are used when valid; an out-of-range
/// preset count is reported and asked again.
pub struct InteractiveSelection<R, W> {
    prompter: Prompter<R, W>,
    preset: Selection,
    ask_extensions: bool,
}

impl<R: BufRead, W: Write> InteractiveSelection<R, W> {
    pub fn new(prompter: Prompter<R, W>, preset: Selection) -> Self {
        let ask_extensions = preset.excluded_extensions.is_empty();
        Self {
            prompter,
            preset,
            ask_extensions,
        }
    }

    /// Do not ask about extensions even when none were preset
    pub fn without_extension_prompt(mut self) -> Self {
        self.ask_extensions = false;
        self
    }
}

impl<R: BufRead, W: Write> SelectionPolicy for InteractiveSelection<R, W> {
    fn choose(&mut self, total: usize) -> Result<Selection, ScrapeError> {
        self.prompter
            .say(&format!("\nTotal pages available: {}", total))?;

        let max_count = match self.preset.max_count {
            Some(requested) => match validate_max_count(requested, total) {
                Ok(count) => count,
                Err(e) => {
                    self.prompter.say(&e.to_string())?;
                    self.prompter.page_count(total)?
                }
            },
            None => self.prompter.page_count(total)?,
        };

        let excluded_extensions = if self.ask_extensions {
            self.prompter.excluded_extensions()?
        } else {
            self.preset.excluded_extensions.clone()
        };

        Ok(Selection {
            max_count: Some(max_count),
            excluded_extensions,
        })
    }
}
