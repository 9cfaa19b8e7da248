// Copyright (c) 2024 Mudit Bhargava
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.
//

// logger.rs
//
// A concise, optional mirror of the per-cycle trace to a file, separate
// from the log/env_logger filter the rest of the crate uses for
// diagnostics — RUST_LOG controls verbosity of *why* something happened,
// RunLog just records *what* happened, one line per cycle, for a user
// who wants a trace they can diff between runs without cranking the
// global log level up.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

pub struct RunLog {
    file: Option<File>,
}

impl RunLog {
    pub fn new(path: Option<&Path>) -> io::Result<Self> {
        let file = match path {
            Some(p) => Some(File::create(p)?),
            None => None,
        };
        Ok(Self { file })
    }

    pub fn cycle(&mut self, cycle: usize, message: &str) {
        self.write_line(&format!("[cycle {}] {}", cycle, message));
    }

    pub fn summary(&mut self, message: &str) {
        self.write_line(message);
    }

    fn write_line(&mut self, line: &str) {
        if let Some(file) = &mut self.file {
            // A trace mirror is a convenience, not load-bearing; a write
            // failure here shouldn't abort a simulation that's otherwise
            // completing fine.
            let _ = writeln!(file, "{}", line);
        }
    }
}
