// File: src/repl.rs
//
// Interactive REPL for the formula language.
// Each input line is appended to the session source and the whole session
// is recompiled and re-run over the loaded bars — the engine has no
// incremental mode, and sessions are small enough that a full recompute is
// instant. Only the bindings added by the newest line are printed.
//
// Special commands: :help, :vars, :bars, :clear, :quit

use crate::engine::FormulaEngine;
use crate::market::Bar;
use crate::result::FormulaResult;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::collections::HashSet;
use std::error::Error;

pub struct Repl {
    engine: FormulaEngine,
    bars: Vec<Bar>,
    editor: DefaultEditor,
    /// Accepted source lines; rejected lines are not kept
    session: Vec<String>,
}

impl Repl {
    pub fn new(bars: Vec<Bar>) -> Result<Self, Box<dyn Error>> {
        let editor = DefaultEditor::new()?;
        Ok(Repl {
            engine: FormulaEngine::new(),
            bars,
            editor,
            session: Vec::new(),
        })
    }

    fn show_banner(&self) {
        println!("{}", "formula REPL - interactive indicator shell".bright_cyan());
        println!(
            "  {} bars loaded. Try {} or {} for commands.",
            self.bars.len().to_string().bright_yellow(),
            "MA5 := MA(CLOSE, 5)".bright_green(),
            ":help".bright_yellow()
        );
        println!();
    }

    /// Starts the read-eval-print loop; returns on :quit or EOF.
    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        self.show_banner();

        loop {
            match self.editor.readline("formula> ") {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(input);

                    if let Some(command) = input.strip_prefix(':') {
                        if !self.handle_command(command) {
                            break;
                        }
                        continue;
                    }

                    self.eval_line(input);
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(Box::new(e)),
            }
        }

        Ok(())
    }

    /// Returns false when the session should end.
    fn handle_command(&mut self, command: &str) -> bool {
        match command {
            "quit" | "q" | "exit" => return false,
            "help" | "h" => {
                println!("  :help   show this help");
                println!("  :vars   list declared names");
                println!("  :bars   show the loaded bar range");
                println!("  :clear  forget all declarations");
                println!("  :quit   leave the REPL");
            }
            "vars" => {
                if self.session.is_empty() {
                    println!("  (nothing declared yet)");
                } else {
                    for line in &self.session {
                        println!("  {}", line);
                    }
                }
            }
            "bars" => {
                println!("  {} bars loaded", self.bars.len());
                if let (Some(first), Some(last)) = (self.bars.first(), self.bars.last()) {
                    println!("  first close {:.4}, last close {:.4}", first.close, last.close);
                }
            }
            "clear" => {
                self.session.clear();
                println!("  session cleared");
            }
            other => {
                println!("  unknown command :{} (try :help)", other);
            }
        }
        true
    }

    /// Re-runs the full session plus the new line, printing only the
    /// bindings the new line added.
    fn eval_line(&mut self, input: &str) {
        let mut source = self.session.join("\n");
        if !source.is_empty() {
            source.push('\n');
        }
        let before = self.current_names();
        source.push_str(input);

        match self.engine.run(&source, &self.bars) {
            Ok(result) => {
                self.session.push(input.to_string());
                self.print_new_bindings(&result, &before);
            }
            Err(e) => {
                eprintln!("{}", e.pretty());
            }
        }
    }

    /// Names bound by the session so far, from a re-run of the accepted
    /// lines. The session is known-good, so errors cannot happen here.
    fn current_names(&self) -> HashSet<String> {
        if self.session.is_empty() {
            return HashSet::new();
        }
        match self.engine.run(&self.session.join("\n"), &self.bars) {
            Ok(result) => {
                let mut names: HashSet<String> =
                    result.outputs.iter().map(|line| line.name.clone()).collect();
                names.extend(result.variables.keys().cloned());
                names
            }
            Err(_) => HashSet::new(),
        }
    }

    fn print_new_bindings(&self, result: &FormulaResult, before: &HashSet<String>) {
        for line in &result.outputs {
            if before.contains(&line.name) {
                continue;
            }
            let preview = tail_preview(&line.data, 5);
            println!(
                "  {} = [{}] ({} points)",
                line.name.bright_green(),
                preview,
                line.data.len()
            );
        }
        for (name, value) in &result.variables {
            if before.contains(name) {
                continue;
            }
            println!("  {} = {}", name.bright_green(), value);
        }
    }
}

/// The last `n` values, elided with ".." when the series is longer.
fn tail_preview(data: &[f64], n: usize) -> String {
    let start = data.len().saturating_sub(n);
    let mut parts: Vec<String> = data[start..]
        .iter()
        .map(|v| {
            if v.is_nan() {
                "NaN".to_string()
            } else {
                format!("{:.4}", v)
            }
        })
        .collect();
    if start > 0 {
        parts.insert(0, "..".to_string());
    }
    parts.join(", ")
}
