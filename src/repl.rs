//! A minimal line-oriented REPL bound to a [`Controller`] (§6). This is an external
//! collaborator, not part of the protocol core: an embedder is free to replace or omit
//! it, driving the `Controller` some other way (a test harness, an HTTP shim, etc).

use std::io::{self, BufRead, Write};

use crate::runtime::Controller;

/// Reads lines from stdin until it closes or `quit` is entered. Recognizes `append
/// <text>`, `debug`, and `quit`; anything else prints a usage hint.
pub fn run(controller: Controller) {
    println!("raftd REPL on node {} — append <text> | debug | quit", controller.address());
    let stdin = io::stdin();

    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => return, // stdin closed
            Ok(_) => {}
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        } else if line == "debug" {
            controller.debug();
        } else if line == "quit" {
            return;
        } else if let Some(text) = line.strip_prefix("append ") {
            controller.append(text.as_bytes().to_vec());
        } else {
            println!("commands: append <text> | debug | quit");
        }
    }
}
