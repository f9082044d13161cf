//! Interactive demo: a toy REPL with completion, hints, and highlighting.
//!
//! Run with `cargo run --example shell`. Type `help` for the word list,
//! `exit` to leave. `Ctrl-R` searches history, Tab completes.

use tideline::{Color, Editor, ReadlineError};

const COMMANDS: [&str; 8] = [
    "help", "history", "exit", "print", "printf", "println", "process", "proceed",
];

fn main() {
    let mut editor = Editor::new();

    editor.set_completion_callback(Box::new(|input, context_len| {
        let word: String = {
            let chars: Vec<char> = input.chars().collect();
            chars[chars.len() - *context_len..].iter().collect()
        };
        COMMANDS
            .iter()
            .filter(|candidate| candidate.starts_with(&word))
            .map(|candidate| candidate.to_string())
            .collect()
    }));

    editor.set_hint_callback(Box::new(|input, context_len, _color| {
        let word: String = {
            let chars: Vec<char> = input.chars().collect();
            chars[chars.len() - *context_len..].iter().collect()
        };
        if word.is_empty() {
            return Vec::new();
        }
        COMMANDS
            .iter()
            .filter(|candidate| candidate.starts_with(&word))
            .map(|candidate| candidate.to_string())
            .collect()
    }));

    editor.set_highlighter_callback(Box::new(|line, colors| {
        for (i, ch) in line.chars().enumerate() {
            if ch.is_ascii_digit() {
                colors[i] = Color::BrightBlue;
            } else if "{}[]()".contains(ch) {
                colors[i] = Color::Brown;
            }
        }
    }));

    loop {
        match editor.input("tideline> ") {
            Ok(line) => {
                if line.is_empty() {
                    continue;
                }
                editor.history_add(&line);
                match line.as_str() {
                    "exit" => break,
                    "help" => println!("commands: {}", COMMANDS.join(", ")),
                    "history" => {
                        for i in 0..editor.history_size() {
                            println!("{i:4}  {}", editor.history_line(i));
                        }
                    }
                    other => println!("unknown command: {other}"),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("error: {err}");
                break;
            }
        }
    }
    println!("bye");
}
