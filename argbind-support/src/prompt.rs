use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};

use crate::prompt_error;

/// Interactive questions a command can ask to collect missing configuration.
pub trait Prompt {
    /// Free text. An empty answer yields `default`. Answers containing any
    /// `blacklist` token are rejected and the question is asked again.
    fn ask_text(&self, message: &str, default: &str, blacklist: &[&str]) -> Result<String>;

    /// One entry of `choices`, picked by its 1-based number or its exact text.
    fn ask_choice(&self, message: &str, choices: &[&str]) -> Result<String>;

    fn ask_confirm(&self, message: &str, default: bool) -> Result<bool>;
}

/// Line-oriented prompt over any reader/writer pair.
pub struct TerminalPrompt<R, W> {
    input: Mutex<R>,
    output: Mutex<W>,
}

impl TerminalPrompt<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: Mutex::new(input),
            output: Mutex::new(output),
        }
    }

    pub fn into_output(self) -> Result<W> {
        self.output
            .into_inner()
            .map_err(|_| anyhow!(prompt_error("into_output", "output lock poisoned")))
    }

    fn say(&self, text: &str) -> Result<()> {
        let mut output = self
            .output
            .lock()
            .map_err(|_| anyhow!(prompt_error("say", "output lock poisoned")))?;
        output
            .write_all(text.as_bytes())
            .and_then(|_| output.flush())
            .with_context(|| prompt_error("say", "cannot write to terminal"))
    }

    /// Reads one line without its terminator; `None` at end of input.
    fn read_line(&self) -> Result<Option<String>> {
        let mut input = self
            .input
            .lock()
            .map_err(|_| anyhow!(prompt_error("read_line", "input lock poisoned")))?;
        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .with_context(|| prompt_error("read_line", "cannot read from terminal"))?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }
}

impl<R: BufRead, W: Write> Prompt for TerminalPrompt<R, W> {
    fn ask_text(&self, message: &str, default: &str, blacklist: &[&str]) -> Result<String> {
        loop {
            if default.is_empty() {
                self.say(&format!("? {message} "))?;
            } else {
                self.say(&format!("? {message} ({default}) "))?;
            }
            let Some(answer) = self.read_line()? else {
                return Ok(default.to_string());
            };
            if answer.is_empty() {
                return Ok(default.to_string());
            }
            match blacklist.iter().find(|token| answer.contains(**token)) {
                Some(token) => self.say(&format!("Invalid token \"{token}\"!\n"))?,
                None => return Ok(answer),
            }
        }
    }

    fn ask_choice(&self, message: &str, choices: &[&str]) -> Result<String> {
        if choices.is_empty() {
            return Err(anyhow!(prompt_error("ask_choice", "no choices offered")));
        }
        loop {
            self.say(&format!("? {message}\n"))?;
            for (index, choice) in choices.iter().enumerate() {
                self.say(&format!("  {}) {choice}\n", index + 1))?;
            }
            self.say("> ")?;
            let Some(answer) = self.read_line()? else {
                return Err(anyhow!(prompt_error("ask_choice", "input closed")));
            };
            let answer = answer.trim();
            if let Ok(number) = answer.parse::<usize>() {
                if let Some(choice) = number.checked_sub(1).and_then(|i| choices.get(i)) {
                    return Ok(choice.to_string());
                }
            }
            if let Some(choice) = choices.iter().find(|choice| **choice == answer) {
                return Ok(choice.to_string());
            }
            self.say(&format!("Invalid choice \"{answer}\"!\n"))?;
        }
    }

    fn ask_confirm(&self, message: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            self.say(&format!("? {message} ({hint}) "))?;
            let Some(answer) = self.read_line()? else {
                return Ok(default);
            };
            match answer.trim().to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.say("Please answer yes or no.\n")?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn scripted(input: &str) -> TerminalPrompt<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalPrompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn text_rejects_blacklisted_tokens_and_asks_again() -> Result<()> {
        let prompt = scripted("a b\nab\n");
        assert_eq!(prompt.ask_text("Name", "", &[" "])?, "ab");
        let transcript = String::from_utf8(prompt.into_output()?)?;
        assert!(transcript.contains("Invalid token \" \"!"));
        Ok(())
    }

    #[test]
    fn text_falls_back_to_default_on_empty_answer_or_eof() -> Result<()> {
        assert_eq!(scripted("\n").ask_text("Editor", "vim", &[])?, "vim");
        assert_eq!(scripted("").ask_text("Editor", "vim", &[])?, "vim");
        Ok(())
    }

    #[test]
    fn choice_accepts_numbers_and_names() -> Result<()> {
        let choices = ["red", "green", "blue"];
        assert_eq!(scripted("2\n").ask_choice("Color", &choices)?, "green");
        assert_eq!(scripted("9\nblue\n").ask_choice("Color", &choices)?, "blue");
        assert!(scripted("").ask_choice("Color", &choices).is_err());
        Ok(())
    }

    #[test]
    fn confirm_understands_yes_no_and_default() -> Result<()> {
        assert!(scripted("y\n").ask_confirm("Continue", false)?);
        assert!(!scripted("maybe\nno\n").ask_confirm("Continue", true)?);
        assert!(scripted("\n").ask_confirm("Continue", true)?);
        Ok(())
    }
}
